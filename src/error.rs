//! Unified error type.

use std::io;
use std::net::AddrParseError;
use std::path::PathBuf;

use thiserror::Error;

/// The error type returned by visor's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding to a port, loading TLS material, or
/// building a request by hand.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to read `{}`: {source}", .path.display())]
    ReadPem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no certificates found in `{}`", .0.display())]
    MissingCertificate(PathBuf),

    #[error("no private key found in `{}`", .0.display())]
    MissingPrivateKey(PathBuf),

    #[error("tls: {0}")]
    Tls(#[from] tokio_rustls::rustls::Error),

    #[error("invalid request: {0}")]
    Http(#[from] http::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_names_the_file() {
        let err = Error::MissingPrivateKey(PathBuf::from("/etc/visor/key.pem"));
        assert_eq!(err.to_string(), "no private key found in `/etc/visor/key.pem`");
    }

    #[test]
    fn invalid_address_keeps_source() {
        let source = "nope".parse::<std::net::SocketAddr>().unwrap_err();
        let err = Error::InvalidAddress { addr: "nope".to_owned(), source };
        assert!(err.to_string().starts_with("invalid socket address `nope`"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
