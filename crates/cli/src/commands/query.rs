use cardscope_core::{build_query, FilterSet};
use serde_json::json;

use super::CommandResult;

/// Same query string the search page sends for these filters; empty means unrestricted.
/// The normalized filters ride along under `details.filters`.
pub fn run(filters: &FilterSet) -> CommandResult {
    let filters = filters.clone().normalized();
    let details = serde_json::to_value(&filters).ok().map(|filters| json!({ "filters": filters }));
    CommandResult::success("query", build_query(&filters), details)
}
