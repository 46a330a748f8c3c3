//! TLS certificate loading.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};

use crate::{TlsError, ensure};

/// Returns true when both paths are non-empty and point at existing files.
pub fn tls_files_present(cert_path: &Path, key_path: &Path) -> bool {
    let present = |path: &Path| !path.as_os_str().is_empty() && path.is_file();
    present(cert_path) && present(key_path)
}

/// Builds a [`TlsAcceptor`] from a PEM certificate chain and a PEM private key.
pub fn load_tls_acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor, TlsError> {
    let certs = load_certs(cert_path)?;
    let key = load_private_key(key_path)?;

    let mut config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(TlsAcceptor::from(Arc::new(config)))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let mut reader = BufReader::new(File::open(path).map_err(|e| TlsError::io(path, e))?);
    let certs = rustls_pemfile::certs(&mut reader).collect::<Result<Vec<_>, _>>().map_err(|e| TlsError::io(path, e))?;

    ensure!(!certs.is_empty(), TlsError::no_certificates(path));
    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let mut reader = BufReader::new(File::open(path).map_err(|e| TlsError::io(path, e))?);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| TlsError::io(path, e))?
        .ok_or_else(|| TlsError::no_private_key(path))
}
