//! Header-based matcher.

use super::{Matcher, MatcherError};
use hyper::http::request::Parts;
use regex::Regex;
use std::collections::HashMap;

/// Matches requests carrying all configured headers with matching values.
///
/// The map is a conjunction: every configured header must be present and its
/// value must match the compiled pattern. A missing header fails the match.
#[derive(Debug)]
pub struct HeadersMatcher {
    headers: Vec<(String, Regex)>,
}

impl HeadersMatcher {
    pub fn new(headers: &HashMap<String, String>) -> Result<Self, MatcherError> {
        let mut compiled = Vec::with_capacity(headers.len());
        for (name, pattern) in headers {
            let regex = Regex::new(pattern).map_err(|source| MatcherError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            compiled.push((name.clone(), regex));
        }

        Ok(Self { headers: compiled })
    }
}

impl Matcher for HeadersMatcher {
    fn matches(&self, req: &Parts) -> bool {
        self.headers.iter().all(|(name, regex)| {
            req.headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| regex.is_match(value))
        })
    }
}
