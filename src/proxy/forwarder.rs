//! Builds the forwarded request for an elected upstream.
//!
//! The forwarded URL always targets plain `http` at the upstream; the
//! original scheme survives in `X-Forwarded-Proto`.

use crate::client::ProxyBody;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, HOST};
use hyper::http;
use hyper::{Request, Uri};
use std::net::SocketAddr;
use thiserror::Error;
use tracing::debug;

/// Failure while assembling the forwarded request.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid forwarded uri: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    #[error("invalid forwarded header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error(transparent)]
    Http(#[from] http::Error),
}

/// Rebuild `req` so it targets `http://<target>` with the original path and
/// raw query, the body streamed through untouched.
///
/// Headers are copied except `Cookie`, which is reassembled into one
/// canonical header. `X-Forwarded-Host`, `X-Forwarded-Proto` and
/// `X-Forwarded-For` are always set, overwriting inherited values.
pub fn forwarded_request(
    req: Request<ProxyBody>,
    target: &str,
    client_addr: SocketAddr,
) -> Result<Request<ProxyBody>, ForwardError> {
    let (parts, body) = req.into_parts();

    let scheme = parts.uri.scheme_str().unwrap_or("http").to_string();
    let host = parts
        .headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_default();

    let mut url = format!("http://{}{}", target, parts.uri.path());
    if let Some(query) = parts.uri.query() {
        url.push('?');
        url.push_str(query);
    }
    let uri: Uri = url.parse()?;

    debug!(url = %uri, method = %parts.method, "building forwarded request");

    let mut headers = HeaderMap::with_capacity(parts.headers.len() + 4);
    for (name, value) in parts.headers.iter() {
        if name == &COOKIE {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if let Some(cookies) = rebuild_cookie_header(&parts.headers) {
        headers.insert(COOKIE, HeaderValue::from_str(&cookies)?);
    }

    headers.insert(HOST, HeaderValue::from_str(target)?);
    headers.insert(
        HeaderName::from_static("x-forwarded-host"),
        HeaderValue::from_str(&host)?,
    );
    headers.insert(
        HeaderName::from_static("x-forwarded-proto"),
        HeaderValue::from_str(&scheme)?,
    );
    headers.insert(
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_str(&client_addr.to_string())?,
    );

    let mut forwarded = Request::builder()
        .method(parts.method)
        .uri(uri)
        .body(body)?;
    *forwarded.headers_mut() = headers;

    Ok(forwarded)
}

/// Collapse every incoming `Cookie` header into one canonical value.
/// Malformed pairs are dropped, the way a typed cookie API would.
fn rebuild_cookie_header(headers: &HeaderMap) -> Option<String> {
    let mut pairs: Vec<&str> = Vec::new();

    for value in headers.get_all(COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            let pair = pair.trim();
            if pair.is_empty() || !pair.contains('=') {
                continue;
            }
            pairs.push(pair);
        }
    }

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}
