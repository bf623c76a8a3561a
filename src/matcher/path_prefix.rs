//! Path-prefix matcher.

use super::{Matcher, MatcherError};
use hyper::http::request::Parts;
use regex::Regex;

/// Matches requests whose path starts with the configured prefix.
///
/// The prefix is compiled as a start-anchored regular expression, so regex
/// syntax in the prefix is honoured.
#[derive(Debug)]
pub struct PathPrefixMatcher {
    prefix: Regex,
}

impl PathPrefixMatcher {
    pub fn new(prefix: &str) -> Result<Self, MatcherError> {
        let pattern = format!("^{prefix}");
        let prefix = Regex::new(&pattern).map_err(|source| MatcherError::InvalidPattern {
            pattern,
            source,
        })?;

        Ok(Self { prefix })
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Parts) -> bool {
        self.prefix.is_match(req.uri.path())
    }
}
