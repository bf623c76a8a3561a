//! Copies the upstream response to the client.
//!
//! Status, cookies and body pass through; a short list of
//! server-identifying headers never reaches the client.

use crate::client::ProxyBody;
use hyper::header::HeaderMap;
use hyper::Response;
use tracing::debug;

/// Response headers never copied back to the client.
const SUPPRESSED_HEADERS: [&str; 4] = [
    "server",
    "x-powered-by",
    "x-aspnet-version",
    "x-aspnetmvc-version",
];

/// Strip the suppressed headers, keep everything else including every
/// `Set-Cookie`, and stream the body through.
pub fn sanitized_response(response: Response<ProxyBody>) -> Response<ProxyBody> {
    let (mut parts, body) = response.into_parts();

    let mut headers = HeaderMap::with_capacity(parts.headers.len());
    for (name, value) in parts.headers.iter() {
        if SUPPRESSED_HEADERS.contains(&name.as_str()) {
            debug!(header = %name, "suppressing upstream header");
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    parts.headers = headers;
    Response::from_parts(parts, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{empty_body, full_body};
    use bytes::Bytes;
    use http_body_util::BodyExt;

    #[test]
    fn test_server_identifying_headers_are_removed() {
        let response = Response::builder()
            .status(200)
            .header("Server", "TestServer")
            .header("X-Powered-By", "Dotnet")
            .header("X-AspNet-Version", "4.0.30319")
            .header("X-AspNetMvc-Version", "5.2")
            .header("Content-Type", "application/json")
            .header("Location", "https://new.test.com")
            .body(empty_body())
            .unwrap();

        let sanitized = sanitized_response(response);
        let headers = sanitized.headers();

        assert!(headers.get("server").is_none());
        assert!(headers.get("x-powered-by").is_none());
        assert!(headers.get("x-aspnet-version").is_none());
        assert!(headers.get("x-aspnetmvc-version").is_none());
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert_eq!(headers.get("location").unwrap(), "https://new.test.com");
    }

    #[test]
    fn test_cookies_pass_through() {
        let response = Response::builder()
            .status(200)
            .header("Set-Cookie", "cookie1=value1")
            .body(empty_body())
            .unwrap();

        let sanitized = sanitized_response(response);
        assert_eq!(
            sanitized.headers().get("set-cookie").unwrap(),
            "cookie1=value1"
        );
    }

    #[test]
    fn test_multiple_cookies_are_kept() {
        let response = Response::builder()
            .status(200)
            .header("Set-Cookie", "cookie1=value1")
            .header("Set-Cookie", "cookie2=value2; HttpOnly")
            .body(empty_body())
            .unwrap();

        let sanitized = sanitized_response(response);
        let cookies: Vec<_> = sanitized.headers().get_all("set-cookie").iter().collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0], "cookie1=value1");
        assert_eq!(cookies[1], "cookie2=value2; HttpOnly");
    }

    #[test]
    fn test_status_is_preserved() {
        let response = Response::builder()
            .status(418)
            .body(empty_body())
            .unwrap();

        assert_eq!(sanitized_response(response).status(), 418);
    }

    #[tokio::test]
    async fn test_body_streams_through() {
        let response = Response::builder()
            .status(200)
            .header("Server", "hidden")
            .body(full_body("response payload"))
            .unwrap();

        let sanitized = sanitized_response(response);
        let collected = sanitized.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(collected, Bytes::from("response payload"));
    }
}
