//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()` — no new connections are made.
//! 2. Letting every in-flight connection task run to completion.
//! 3. Returning from [`Server::serve`], which lets `main` exit cleanly.
//!
//! # Transport
//!
//! Each connection is tagged with a [`Transport`] before any request on it
//! reaches a handler: [`Transport::Tls`] when [`Server::tls`] is configured,
//! [`Transport::Plain`] otherwise.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use tracing::{debug, error, info};

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::request::{Request, Transport};
use crate::response::Response;
use crate::tls;

/// The HTTP server.
pub struct Server {
    bind: Bind,
    tls: Option<TlsFiles>,
}

enum Bind {
    Addr(String),
    Listener(TcpListener),
}

struct TlsFiles {
    cert: PathBuf,
    key: PathBuf,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called. An unparsable address is reported by `serve`.
    ///
    /// ```rust,no_run
    /// use visor::Server;
    /// let server = Server::bind("0.0.0.0:3000");
    /// ```
    pub fn bind(addr: &str) -> Self {
        Self { bind: Bind::Addr(addr.to_owned()), tls: None }
    }

    /// Serves on a listener that is already bound, e.g. to port `0` in tests.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { bind: Bind::Listener(listener), tls: None }
    }

    /// Terminates TLS in-process with the given PEM certificate chain and key.
    ///
    /// The files are read when [`serve`](Server::serve) starts.
    pub fn tls(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.tls = Some(TlsFiles { cert: cert.into(), key: key.into() });
        self
    }

    /// Starts accepting connections and dispatching them through `handler`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, handler: impl Handler) -> Result<(), Error> {
        self.serve_with_shutdown(handler, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops accepting when `signal` resolves.
    pub async fn serve_with_shutdown<F>(
        self,
        handler: impl Handler,
        signal: F,
    ) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let listener = match self.bind {
            Bind::Addr(addr) => {
                let parsed: SocketAddr = addr
                    .parse()
                    .map_err(|source| Error::InvalidAddress { addr: addr.clone(), source })?;
                TcpListener::bind(parsed).await?
            }
            Bind::Listener(listener) => listener,
        };

        let acceptor = match &self.tls {
            Some(files) => {
                let config = tls::load_server_config(&files.cert, &files.key)?;
                Some(TlsAcceptor::from(config))
            }
            None => None,
        };

        // Shared across every connection task without copying the routing table.
        let handler: BoxedHandler = Arc::new(handler);

        info!(addr = %listener.local_addr()?, tls = acceptor.is_some(), "visor listening");

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM immediately stops
                // accepting new connections, even if more are queued.
                biased;

                () = &mut signal => {
                    info!(
                        in_flight = tasks.len(),
                        "shutdown signal received, draining connections"
                    );
                    break;
                }

                res = listener.accept() => {
                    let (stream, peer) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let handler = Arc::clone(&handler);
                    tasks.spawn(serve_connection(stream, peer, handler, acceptor.clone()));
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain: wait for every in-flight connection to finish before we return.
        while tasks.join_next().await.is_some() {}

        info!("visor stopped");
        Ok(())
    }
}

// ── Connections ───────────────────────────────────────────────────────────────

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    handler: BoxedHandler,
    acceptor: Option<TlsAcceptor>,
) {
    match acceptor {
        None => drive(TokioIo::new(stream), peer, handler, Transport::Plain).await,
        Some(acceptor) => match acceptor.accept(stream).await {
            Ok(stream) => drive(TokioIo::new(stream), peer, handler, Transport::Tls).await,
            Err(e) => debug!(%peer, "tls handshake failed: {e}"),
        },
    }
}

async fn drive<I>(io: I, peer: SocketAddr, handler: BoxedHandler, transport: Transport)
where
    I: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
{
    // Called once per request on the connection, not once per connection.
    let svc = service_fn(move |req| {
        let handler = Arc::clone(&handler);
        async move { dispatch(handler, req, transport).await }
    });

    // `auto::Builder` transparently handles both HTTP/1.1 and HTTP/2.
    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
        .serve_connection(io, svc)
        .await
    {
        error!(%peer, "connection error: {e}");
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Core hot path: reads the body, then lets the handler produce the response.
///
/// The error type is [`Infallible`]. Failures become responses, so hyper
/// never sees an error.
///
/// A body that cannot be read is answered with `400 Bad Request` before the
/// handler runs, so that response carries no headers from decorators such as
/// [`secure_headers`](crate::middleware::secure_headers).
async fn dispatch(
    handler: BoxedHandler,
    req: hyper::Request<Incoming>,
    transport: Transport,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            debug!("failed to read request body: {e}");
            return Ok(Response::status(StatusCode::BAD_REQUEST).into_http());
        }
    };

    let response = handler.call(Request::from_parts(parts, body, transport)).await;
    Ok(response.into_http())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** (sent by `kubectl` and the
/// Kubernetes control plane) and **SIGINT** (Ctrl-C, for local dev).
/// On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ok(_req: Request) -> &'static str {
        "ok"
    }

    #[tokio::test]
    async fn invalid_address_is_reported() {
        let Err(err) = Server::bind("not an address").serve_with_shutdown(ok, async {}).await else {
            panic!("expected an error");
        };
        assert!(matches!(err, Error::InvalidAddress { ref addr, .. } if addr == "not an address"));
    }

    #[tokio::test]
    async fn missing_tls_files_fail_before_accepting() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let Err(err) = Server::from_listener(listener)
            .tls("/nonexistent/visor/cert.pem", "/nonexistent/visor/key.pem")
            .serve_with_shutdown(ok, std::future::pending())
            .await
        else {
            panic!("expected an error");
        };
        assert!(matches!(err, Error::ReadPem { .. }));
    }

    #[tokio::test]
    async fn returns_once_signalled() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Server::from_listener(listener)
            .serve_with_shutdown(ok, async {})
            .await
            .unwrap();
    }
}
