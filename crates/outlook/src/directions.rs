use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub const DEFAULT_DIRECTIONS: &str = "You are an assistant that gives collector-focused outlooks on Pokémon cards. \
Avoid financial advice; keep to 2–4 sentences; use hedged language and include one caution.";

/// Instruction text for outlook generation and where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directions {
    pub text: String,
    pub source: Option<PathBuf>,
}

impl Default for Directions {
    fn default() -> Self {
        Self { text: DEFAULT_DIRECTIONS.to_string(), source: None }
    }
}

/// Reads the first candidate file with non-blank content, else the built-in text.
pub fn load_directions(candidates: &[PathBuf]) -> Directions {
    for path in candidates {
        if let Some(text) = read_non_empty(path) {
            info!(
                event_name = "outlook.directions.loaded",
                path = %path.display(),
                "loaded outlook directions"
            );
            return Directions { text, source: Some(path.clone()) };
        }
    }

    info!(event_name = "outlook.directions.default", "using built-in outlook directions");
    Directions::default()
}

fn read_non_empty(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(raw) => Some(raw.trim().to_string()).filter(|text| !text.is_empty()),
        Err(error) => {
            debug!(path = %path.display(), error = %error, "outlook directions candidate skipped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{load_directions, DEFAULT_DIRECTIONS};

    #[test]
    fn first_non_empty_candidate_wins() {
        let dir = TempDir::new().expect("temp dir");
        let blank = dir.path().join("blank.txt");
        let real = dir.path().join("real.txt");
        let later = dir.path().join("later.txt");
        fs::write(&blank, "   \n").expect("write blank");
        fs::write(&real, "\nSpeak like a grader.\n").expect("write real");
        fs::write(&later, "ignored").expect("write later");

        let directions = load_directions(&[dir.path().join("missing.txt"), blank, real.clone(), later]);

        assert_eq!(directions.text, "Speak like a grader.");
        assert_eq!(directions.source, Some(real));
    }

    #[test]
    fn falls_back_to_built_in_text() {
        let dir = TempDir::new().expect("temp dir");
        let directions = load_directions(&[dir.path().join("nope.txt")]);

        assert_eq!(directions.text, DEFAULT_DIRECTIONS);
        assert!(directions.source.is_none());
    }
}
