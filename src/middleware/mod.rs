//! Middleware layer.
//!
//! Middleware wraps a [`Handler`](crate::Handler) and returns another one with
//! the same shape, so it can be registered on a route, wrapped again, or
//! handed straight to [`Server::serve`](crate::Server::serve).
//!
//! Built-in middleware:
//! - [`secure_headers`]: browser security headers with an HSTS policy keyed
//!   on the connection's transport

pub mod secure_headers;
