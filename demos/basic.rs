//! Minimal visor example: JSON endpoints behind the security-header decorator.
//!
//! Run with (logs at debug level, so the decorator's policy is printed):
//!   cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42
//!   curl -i -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -i http://localhost:3000/widget
//!
//! Every response carries `x-frame-options`, `x-content-type-options` and
//! `x-xss-protection`. Plain HTTP never gets `strict-transport-security`
//! with the standard policy; swap in `wrap_always_secure` when a TLS proxy
//! sits in front.

use visor::header::{HeaderValue, LOCATION, X_FRAME_OPTIONS};
use visor::middleware::secure_headers;
use visor::{Request, Response, Router, Server, StatusCode};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let app = Router::new()
        .get("/users/{id}",    get_user)
        .post("/users",        create_user)
        .delete("/users/{id}", delete_user)
        .get("/widget",        widget);

    Server::bind("0.0.0.0:3000")
        .serve(secure_headers::wrap(app))
        .await
        .expect("server error");
}

// GET /users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

// POST /users
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }

    Response::builder()
        .status(StatusCode::CREATED)
        .header(LOCATION, HeaderValue::from_static("/users/99"))
        .json(br#"{"id":"99","name":"new_user"}"#.to_vec())
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

// GET /widget is meant to be framed by our own pages, so it relaxes the default.
async fn widget(_req: Request) -> Response {
    Response::builder()
        .header(X_FRAME_OPTIONS, HeaderValue::from_static("sameorigin"))
        .text("widget")
}
