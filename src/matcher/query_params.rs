//! Query-parameter matcher.

use super::{Matcher, MatcherError};
use hyper::http::request::Parts;
use regex::Regex;
use std::collections::HashMap;
use url::form_urlencoded;

/// Matches requests carrying all configured query parameters with matching
/// values.
///
/// The map is a conjunction: every configured parameter must be present and
/// its first value must match the compiled pattern. A missing parameter
/// fails the match.
#[derive(Debug)]
pub struct QueryParamsMatcher {
    params: Vec<(String, Regex)>,
}

impl QueryParamsMatcher {
    pub fn new(params: &HashMap<String, String>) -> Result<Self, MatcherError> {
        let mut compiled = Vec::with_capacity(params.len());
        for (name, pattern) in params {
            let regex = Regex::new(pattern).map_err(|source| MatcherError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            compiled.push((name.clone(), regex));
        }

        Ok(Self { params: compiled })
    }
}

impl Matcher for QueryParamsMatcher {
    fn matches(&self, req: &Parts) -> bool {
        let query = req.uri.query().unwrap_or("");

        self.params.iter().all(|(name, regex)| {
            form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .find(|(key, _)| key == name)
                .is_some_and(|(_, value)| regex.is_match(&value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::request_parts;

    #[test]
    fn test_single_param_match() {
        let matcher = QueryParamsMatcher::new(&HashMap::from([(
            "tenant".to_string(),
            "^[a-z]+$".to_string(),
        )]))
        .unwrap();

        assert!(matcher.matches(&request_parts("GET", "http://localhost/?tenant=acme")));
        assert!(!matcher.matches(&request_parts("GET", "http://localhost/?tenant=ACME")));
    }

    #[test]
    fn test_missing_param_fails_conjunction() {
        let matcher = QueryParamsMatcher::new(&HashMap::from([
            ("tenant".to_string(), ".+".to_string()),
            ("page".to_string(), "^\\d+$".to_string()),
        ]))
        .unwrap();

        assert!(!matcher.matches(&request_parts("GET", "http://localhost/?tenant=acme")));
        assert!(matcher.matches(&request_parts(
            "GET",
            "http://localhost/?tenant=acme&page=2"
        )));
    }

    #[test]
    fn test_no_query_string_fails() {
        let matcher = QueryParamsMatcher::new(&HashMap::from([(
            "tenant".to_string(),
            ".+".to_string(),
        )]))
        .unwrap();

        assert!(!matcher.matches(&request_parts("GET", "http://localhost/")));
    }

    #[test]
    fn test_url_decoded_values_are_matched() {
        let matcher = QueryParamsMatcher::new(&HashMap::from([(
            "q".to_string(),
            "^hello world$".to_string(),
        )]))
        .unwrap();

        assert!(matcher.matches(&request_parts("GET", "http://localhost/?q=hello%20world")));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = QueryParamsMatcher::new(&HashMap::from([(
            "q".to_string(),
            "*bad".to_string(),
        )]))
        .unwrap_err();

        assert!(matches!(err, MatcherError::InvalidPattern { .. }));
    }
}
