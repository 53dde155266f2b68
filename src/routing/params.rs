//! Path parameter extraction.

use std::collections::BTreeMap;

/// Parameter name to concrete segment value.
pub type PathParams = BTreeMap<String, String>;

/// Match `pattern` (e.g. `/users/{id}`) against `path` (e.g. `/users/42`).
///
/// Both sides are trimmed of leading/trailing slashes and split on `/`.
/// A pattern segment is a placeholder only when it starts with `{` and ends
/// with `}`; its name is bound to the concrete segment at the same index.
/// Only the overlapping prefix is matched, so placeholders without a
/// counterpart are simply absent from the result.
pub fn extract_path_params(pattern: &str, path: &str) -> PathParams {
    let concrete: Vec<&str> = path.trim_matches('/').split('/').collect();

    pattern
        .trim_matches('/')
        .split('/')
        .enumerate()
        .filter_map(|(index, segment)| {
            let name = placeholder_name(segment)?;
            let value = concrete.get(index)?;
            Some((name.to_string(), (*value).to_string()))
        })
        .collect()
}

/// `{}` has no name to bind, so it matches as a literal segment.
fn placeholder_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|name| !name.is_empty())
}
