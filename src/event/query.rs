//! Query string decoding.

use super::schema::QueryParams;

/// Decode an `application/x-www-form-urlencoded` query string.
/// Repeated keys accumulate their values in order of appearance.
pub fn parse_query(query: &str) -> QueryParams {
    let mut params = QueryParams::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_keys_accumulate() {
        let params = parse_query("tag=a&full=true&tag=b");
        assert_eq!(params["tag"], vec!["a", "b"]);
        assert_eq!(params["full"], vec!["true"]);
    }

    #[test]
    fn test_percent_decoding_and_empty_values() {
        let params = parse_query("q=hello%20world&plus=a+b&flag");
        assert_eq!(params["q"], vec!["hello world"]);
        assert_eq!(params["plus"], vec!["a b"]);
        assert_eq!(params["flag"], vec![""]);
    }

    #[test]
    fn test_empty_query() {
        assert!(parse_query("").is_empty());
    }
}
