//! HTTP method matcher.

use super::Matcher;
use hyper::http::request::Parts;

/// Matches requests whose method is one of the configured set.
///
/// Membership is exact and case-sensitive; HTTP methods are upper-case on
/// the wire.
#[derive(Debug)]
pub struct MethodMatcher {
    methods: Vec<String>,
}

impl MethodMatcher {
    pub fn new(methods: Vec<String>) -> Self {
        Self { methods }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Parts) -> bool {
        self.methods.iter().any(|m| m == req.method.as_str())
    }
}
