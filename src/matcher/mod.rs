//! Request matchers.
//!
//! An application accepts a request when any one of its matchers does. The
//! headers and query-params variants are themselves conjunctions over their
//! configured keys, so "any matcher" composes with "all keys" inside one.

mod headers;
mod method;
mod path_prefix;
mod query_params;

pub use headers::HeadersMatcher;
pub use method::MethodMatcher;
pub use path_prefix::PathPrefixMatcher;
pub use query_params::QueryParamsMatcher;

use crate::config::MatcherConfig;
use hyper::http::request::Parts;
use thiserror::Error;

/// Matcher construction failure.
#[derive(Debug, Error)]
pub enum MatcherError {
    #[error("invalid match pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Predicate over an incoming request.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    fn matches(&self, req: &Parts) -> bool;
}

/// Build the matcher list for one application from its configuration.
///
/// All regular expressions are compiled here; a bad pattern fails the whole
/// application instead of surfacing at request time.
pub fn build_matchers(configs: &[MatcherConfig]) -> Result<Vec<Box<dyn Matcher>>, MatcherError> {
    configs
        .iter()
        .map(|config| match config {
            MatcherConfig::PathPrefix(prefix) => {
                PathPrefixMatcher::new(prefix).map(|m| Box::new(m) as Box<dyn Matcher>)
            }
            MatcherConfig::Methods(methods) => {
                Ok(Box::new(MethodMatcher::new(methods.clone())) as Box<dyn Matcher>)
            }
            MatcherConfig::Headers(headers) => {
                HeadersMatcher::new(headers).map(|m| Box::new(m) as Box<dyn Matcher>)
            }
            MatcherConfig::QueryParams(params) => {
                QueryParamsMatcher::new(params).map(|m| Box::new(m) as Box<dyn Matcher>)
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn request_parts(method: &str, uri: &str) -> Parts {
    let (parts, _) = hyper::Request::builder()
        .method(method)
        .uri(uri)
        .body(())
        .unwrap()
        .into_parts();
    parts
}
