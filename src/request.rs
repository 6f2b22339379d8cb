//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::header::AsHeaderName;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};

use crate::error::Error;

/// How the connection carrying a request reached this process.
///
/// Attached by the [`Server`](crate::Server) per connection. It is never
/// derived from client-supplied headers such as `X-Forwarded-Proto`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Transport {
    /// Plain-text TCP.
    #[default]
    Plain,
    /// TLS terminated by this process.
    Tls,
}

impl Transport {
    pub fn is_secure(self) -> bool {
        matches!(self, Self::Tls)
    }
}

/// An incoming HTTP request with its body fully read.
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
    transport: Transport,
}

impl Request {
    pub(crate) fn from_parts(parts: Parts, body: Bytes, transport: Transport) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            params: HashMap::new(),
            transport,
        }
    }

    /// Builds a request outside the server, e.g. to exercise a handler in a test.
    ///
    /// ```rust
    /// use visor::{Method, Request, Transport};
    ///
    /// let req = Request::builder()
    ///     .method(Method::POST)
    ///     .uri("/users")
    ///     .header("content-type", "application/json")
    ///     .body(r#"{"name":"alice"}"#)
    ///     .transport(Transport::Tls)
    ///     .build()
    ///     .unwrap();
    /// assert!(req.is_secure());
    /// ```
    pub fn builder() -> RequestBuilder {
        RequestBuilder {
            inner: http::Request::builder(),
            body: Bytes::new(),
            transport: Transport::Plain,
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn transport(&self) -> Transport { self.transport }

    /// Whether the underlying connection is encrypted by this process.
    pub fn is_secure(&self) -> bool {
        self.transport.is_secure()
    }

    /// Case-insensitive header lookup. Non-UTF-8 values read as `None`.
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}

/// Fluent builder for [`Request`]. Obtain via [`Request::builder()`].
pub struct RequestBuilder {
    inner: http::request::Builder,
    body: Bytes,
    transport: Transport,
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.inner = self.inner.method(method);
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        self.inner = self.inner.uri(uri);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.inner = self.inner.header(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Fails if the URI or a header could not be parsed.
    pub fn build(self) -> Result<Request, Error> {
        let (parts, ()) = self.inner.body(())?.into_parts();
        Ok(Request::from_parts(parts, self.body, self.transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_plain_get() {
        let req = Request::builder().uri("/").build().unwrap();
        assert_eq!(*req.method(), Method::GET);
        assert_eq!(req.transport(), Transport::Plain);
        assert!(!req.is_secure());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::builder()
            .uri("/")
            .header("X-Request-Id", "abc")
            .build()
            .unwrap();
        assert_eq!(req.header("x-request-id"), Some("abc"));
        assert_eq!(req.header("X-REQUEST-ID"), Some("abc"));
        assert_eq!(req.header("missing"), None);
    }

    #[test]
    fn path_excludes_query() {
        let req = Request::builder().uri("/search?q=rust").build().unwrap();
        assert_eq!(req.path(), "/search");
        assert_eq!(req.uri().query(), Some("q=rust"));
    }

    #[test]
    fn invalid_header_is_an_error() {
        let err = Request::builder()
            .uri("/")
            .header("bad header", "v")
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, Error::Http(_)));
    }

    #[test]
    fn params_are_empty_until_routed() {
        let mut req = Request::builder().uri("/users/42").build().unwrap();
        assert_eq!(req.param("id"), None);
        req.set_params(HashMap::from([("id".to_owned(), "42".to_owned())]));
        assert_eq!(req.param("id"), Some("42"));
    }
}
