//! # visor
//!
//! A minimal HTTP framework for Rust services, with browser security headers
//! built in as a handler decorator.
//!
//! ## The contract
//!
//! Most deployments run behind nginx or an ingress that handles rate limiting,
//! slow clients, and body-size limits. visor does not duplicate them. What it
//! does own:
//!
//! - Radix-tree routing — O(path-length) lookup via [`matchit`]
//! - Async I/O — tokio + hyper, HTTP/1.1 and HTTP/2
//! - Graceful shutdown — SIGTERM / Ctrl-C, drains in-flight requests
//! - Security headers — [`middleware::secure_headers`], with an HSTS policy
//!   that follows the connection's [`Transport`]
//! - Optional in-process TLS — [`Server::tls`], for when there is no proxy
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use visor::middleware::secure_headers;
//! use visor::{Request, Response, Router, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .get("/users/{id}", get_user)
//!         .post("/users",     create_user);
//!
//!     // Behind a TLS-terminating proxy every request reaches us in plain
//!     // text, so send HSTS regardless.
//!     Server::bind("0.0.0.0:3000")
//!         .serve(secure_headers::wrap_always_secure(app))
//!         .await
//!         .unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .json(br#"{"id":"99"}"#.to_vec())
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;
pub mod tls;

pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, Handler};
pub use request::{Request, RequestBuilder, Transport};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;

pub use http::{HeaderMap, Method, StatusCode, header};
