//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router needs to hold handlers of *different* types in a single
//! `HashMap<Method, Tree>`. Rust collections can only hold one concrete type,
//! so every handler is stored as an `Arc<dyn Handler>` and invoked through one
//! vtable call per request.
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.get("/", hello)
//! Arc::new(hello) as BoxedHandler                  ← Handler blanket impl
//!        ↓
//! handler.call(req)  at request time               ← one vtable dispatch
//!        ↓
//! Box::pin(async { hello(req).await.into_response() })  ← BoxFuture
//! ```
//!
//! `Handler` is not sealed. Decorators such as
//! [`SecureHeaders`](crate::middleware::secure_headers::SecureHeaders) and the
//! [`Router`](crate::Router) itself implement it, so anything that accepts a
//! handler also accepts a wrapped handler or a whole router.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Send + 'static` let tokio move the future across threads safely.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A heap-allocated, type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn Handler>;

/// Something that turns one [`Request`] into one [`Response`].
///
/// Automatically satisfied for any `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// Implement it yourself to build decorators: hold the inner handler, do your
/// work, and forward `call`. A single instance serves every request
/// concurrently, hence `Send + Sync + 'static`.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    fn assert_is_handler<H: Handler>(_handler: &H) {
        // no op
    }

    #[tokio::test]
    async fn async_fn_is_handler() {
        async fn hello(_req: Request) -> &'static str {
            "hello"
        }

        assert_is_handler(&hello);
        let resp = Handler::call(&hello, Request::builder().uri("/").build().unwrap()).await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        assert_eq!(resp.body(), "hello".as_bytes());
    }

    #[tokio::test]
    async fn closure_is_handler() {
        let greeting = String::from("hi");
        let handler = move |_req: Request| {
            let greeting = greeting.clone();
            async move { (StatusCode::ACCEPTED, greeting) }
        };

        assert_is_handler(&handler);
        let resp = Handler::call(&handler, Request::builder().uri("/").build().unwrap()).await;
        assert_eq!(resp.status_code(), StatusCode::ACCEPTED);
        assert_eq!(resp.body(), "hi".as_bytes());
    }

    #[tokio::test]
    async fn boxed_handler_dispatches() {
        let boxed: BoxedHandler = Arc::new(|_req: Request| async { StatusCode::NO_CONTENT });
        let resp = boxed.call(Request::builder().uri("/").build().unwrap()).await;
        assert_eq!(resp.status_code(), StatusCode::NO_CONTENT);
        assert!(resp.body().is_empty());
    }
}
