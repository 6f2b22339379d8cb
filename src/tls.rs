//! TLS configuration and certificate loading.
//!
//! Most deployments terminate TLS at the proxy. When visor terminates it
//! instead, every request on the connection carries
//! [`Transport::Tls`](crate::Transport::Tls).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use tokio_rustls::rustls::ServerConfig;

use crate::error::Error;

/// Load a rustls server configuration from PEM certificate and key files.
///
/// The certificate file may hold a full chain, leaf first. The key file must
/// hold one PKCS#1, PKCS#8 or SEC1 private key. ALPN advertises `h2` and
/// `http/1.1`.
pub fn load_server_config(cert_path: &Path, key_path: &Path) -> Result<Arc<ServerConfig>, Error> {
    let certs = rustls_pemfile::certs(&mut open(cert_path)?)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| Error::ReadPem { path: cert_path.to_path_buf(), source })?;
    if certs.is_empty() {
        return Err(Error::MissingCertificate(cert_path.to_path_buf()));
    }

    let key = rustls_pemfile::private_key(&mut open(key_path)?)
        .map_err(|source| Error::ReadPem { path: key_path.to_path_buf(), source })?
        .ok_or_else(|| Error::MissingPrivateKey(key_path.to_path_buf()))?;

    let mut config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(Arc::new(config))
}

fn open(path: &Path) -> Result<BufReader<File>, Error> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| Error::ReadPem { path: path.to_path_buf(), source })
}
