//! Browser security headers.
//!
//! Every response passing through [`SecureHeaders`] carries:
//!
//! | Header | Value | Effect |
//! |---|---|---|
//! | `X-XSS-Protection` | `1; mode=block` | Forces the XSS filter on in legacy browsers. |
//! | `X-Frame-Options` | `deny` | The page cannot be rendered inside a frame. |
//! | `X-Content-Type-Options` | `nosniff` | The browser never guesses the content type. |
//! | `Strict-Transport-Security` | `max-age=31536000; includeSubDomains` | See below. |
//!
//! # HSTS is sticky
//!
//! Once a browser has loaded a page over a valid certificate chain with
//! `Strict-Transport-Security` set, it **refuses** plain-HTTP connections to
//! the origin and all of its subdomains for a year. Pick the policy with care:
//!
//! - [`wrap`] sends HSTS only on requests that arrived over TLS terminated by
//!   this process ([`Transport::Tls`]).
//! - [`wrap_always_secure`] sends HSTS on every response. Use it behind a
//!   TLS-terminating proxy, where visor only ever sees plain connections even
//!   though clients speak HTTPS.
//!
//! # Precedence
//!
//! The headers are defaults, not locks. If the wrapped handler sets one of
//! these names itself, its value is the one sent. The defaults are filled in
//! after the handler returns, so a handler can replace a default but cannot
//! remove one: a route that must not send a header needs a different
//! decorator, not a deletion inside the handler.
//!
//! ```rust,no_run
//! use visor::header::{HeaderValue, X_FRAME_OPTIONS};
//! use visor::middleware::secure_headers;
//! use visor::{Request, Response, Router, Server};
//!
//! async fn embeddable(_req: Request) -> Response {
//!     Response::builder()
//!         .header(X_FRAME_OPTIONS, HeaderValue::from_static("sameorigin"))
//!         .text("widget")
//! }
//!
//! # async fn run() -> Result<(), visor::Error> {
//! let app = Router::new().get("/widget", embeddable);
//! Server::bind("0.0.0.0:3000")
//!     .serve(secure_headers::wrap_always_secure(app))
//!     .await
//! # }
//! ```

use http::HeaderMap;
use http::header::{
    HeaderName, HeaderValue, STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS,
    X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use tracing::debug;

use crate::handler::{BoxFuture, Handler};
use crate::request::{Request, Transport};

/// Sent on every response, in this order.
static ALWAYS: [(HeaderName, HeaderValue); 3] = [
    (X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block")),
    (X_FRAME_OPTIONS, HeaderValue::from_static("deny")),
    (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
];

/// Sent when the [`Policy`] says the transport is secure.
static HSTS: (HeaderName, HeaderValue) = (
    STRICT_TRANSPORT_SECURITY,
    HeaderValue::from_static("max-age=31536000; includeSubDomains"),
);

/// When `Strict-Transport-Security` is sent.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Policy {
    /// Only on requests that arrived over [`Transport::Tls`].
    Standard,
    /// On every response, whatever the transport.
    AlwaysSecure,
}

impl Policy {
    pub fn sends_hsts(self, transport: Transport) -> bool {
        match self {
            Self::Standard => transport.is_secure(),
            Self::AlwaysSecure => true,
        }
    }
}

fn table(
    policy: Policy,
    transport: Transport,
) -> impl Iterator<Item = &'static (HeaderName, HeaderValue)> {
    ALWAYS.iter().chain(policy.sends_hsts(transport).then_some(&HSTS))
}

/// Sets the security headers on `headers`, replacing any value already
/// present under the same names.
///
/// Applying twice leaves exactly one value per name.
pub fn apply(policy: Policy, transport: Transport, headers: &mut HeaderMap) {
    for (name, value) in table(policy, transport) {
        headers.insert(name.clone(), value.clone());
    }
}

/// Wraps `inner` with the [`Policy::Standard`] policy.
pub fn wrap<H: Handler>(inner: H) -> SecureHeaders<H> {
    SecureHeaders::new(inner, Policy::Standard)
}

/// Wraps `inner` with the [`Policy::AlwaysSecure`] policy.
pub fn wrap_always_secure<H: Handler>(inner: H) -> SecureHeaders<H> {
    SecureHeaders::new(inner, Policy::AlwaysSecure)
}

/// A [`Handler`] that delegates to `H` and then establishes the security
/// headers the inner response did not set itself.
///
/// Holds no state besides the inner handler and the policy, so one instance
/// serves any number of concurrent requests.
pub struct SecureHeaders<H> {
    inner: H,
    policy: Policy,
}

impl<H: Handler> SecureHeaders<H> {
    pub fn new(inner: H, policy: Policy) -> Self {
        debug!(?policy, "security headers enabled");
        Self { inner, policy }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: Handler> Handler for SecureHeaders<H> {
    fn call(&self, req: Request) -> BoxFuture {
        let policy = self.policy;
        let transport = req.transport();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.await;
            let headers = response.headers_mut();
            // The inner handler's own values take precedence.
            for (name, value) in table(policy, transport) {
                headers.entry(name).or_insert_with(|| value.clone());
            }
            response
        })
    }
}
