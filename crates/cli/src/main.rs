use std::process::ExitCode;

fn main() -> ExitCode {
    cardscope_cli::run()
}
