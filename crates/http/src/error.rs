use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tokio_rustls::rustls;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("can't bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ServeError {
    pub fn bind<S: ToString>(addr: S, source: io::Error) -> Self {
        Self::Bind { addr: addr.to_string(), source }
    }
}

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("can't read {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("no certificate found in {path:?}")]
    NoCertificates { path: PathBuf },

    #[error("no private key found in {path:?}")]
    NoPrivateKey { path: PathBuf },

    #[error("invalid tls config: {source}")]
    Rustls {
        #[from]
        source: rustls::Error,
    },
}

impl TlsError {
    pub fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn no_certificates<P: Into<PathBuf>>(path: P) -> Self {
        Self::NoCertificates { path: path.into() }
    }

    pub fn no_private_key<P: Into<PathBuf>>(path: P) -> Self {
        Self::NoPrivateKey { path: path.into() }
    }
}
