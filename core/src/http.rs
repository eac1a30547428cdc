//! HTTP exchange types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. The client builds an `HttpRequest`
//! and hands it to a `Transport`, which performs the network round-trip and
//! returns an `HttpResponse` with the body already read in full. Anything that
//! can execute a request (ureq, a test double, a host application) plugs in
//! behind the trait.
//!
//! All fields use owned types so values can be stored or moved across threads
//! without lifetime concerns.

use crate::error::TransportError;

/// HTTP method for a request.
///
/// YOURLS accepts every action as a `POST` with the parameters in the query
/// string, so that is the only method the client emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute and already carries the encoded query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// An HTTP response described as plain data.
///
/// The status code is never interpreted by the client; callers that care
/// about non-2xx replies inspect it here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Body as UTF-8 text, with invalid sequences replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Executes HTTP requests on behalf of the client.
///
/// Implementations must return `Ok` for every response the server produced,
/// whatever its status code, and only fail for connection-level problems or
/// when the body cannot be read. Timeouts and connection reuse are the
/// implementation's business.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Vec::new(),
        };
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn body_text_replaces_invalid_utf8() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: vec![b'o', b'k', 0xff],
        };
        assert_eq!(response.body_text(), "ok\u{fffd}");
    }
}
