//! Server configuration.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use simplemux_http::server::DEFAULT_SHUTDOWN_TIMEOUT;
use simplemux_http::tls::tls_files_present;

/// Where and how [`Multiplexer::start`](crate::Multiplexer::start) listens.
///
/// `addr` is a `host:port` pair, a bare `:port` listens on all IPv4 interfaces.
///
/// TLS is never switched on directly: it is used when both `cert` and `key` name files that exist
/// at the time the server starts.
///
/// The config can be loaded from any serde format, `shutdown_timeout` takes a
/// `{ secs, nanos }` map there:
///
/// ```
/// use simplemux::MuxConfig;
/// use std::time::Duration;
///
/// let config = MuxConfig::new("127.0.0.1:8080")
///     .with_tls("cert.pem", "key.pem")
///     .with_shutdown_timeout(Duration::from_secs(1));
///
/// assert_eq!(config.addr(), "127.0.0.1:8080");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MuxConfig {
    addr: String,
    #[serde(default)]
    cert: Option<PathBuf>,
    #[serde(default)]
    key: Option<PathBuf>,
    #[serde(default = "default_shutdown_timeout")]
    shutdown_timeout: Duration,
}

const ALL_INTERFACES: &str = "0.0.0.0";

fn default_shutdown_timeout() -> Duration {
    DEFAULT_SHUTDOWN_TIMEOUT
}

impl MuxConfig {
    pub fn new<S: Into<String>>(addr: S) -> Self {
        Self { addr: addr.into(), cert: None, key: None, shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT }
    }

    pub fn with_tls<C: Into<PathBuf>, K: Into<PathBuf>>(mut self, cert: C, key: K) -> Self {
        self.cert = Some(cert.into());
        self.key = Some(key.into());
        self
    }

    pub fn with_shutdown_timeout(mut self, shutdown_timeout: Duration) -> Self {
        self.shutdown_timeout = shutdown_timeout;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// The address handed to the listener, `:8080` becomes `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Cow<'_, str> {
        if self.addr.starts_with(':') { Cow::Owned(format!("{ALL_INTERFACES}{}", self.addr)) } else { Cow::Borrowed(&self.addr) }
    }

    pub fn cert(&self) -> Option<&Path> {
        self.cert.as_deref()
    }

    pub fn key(&self) -> Option<&Path> {
        self.key.as_deref()
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// True when TLS paths were given, whether or not the files exist.
    pub fn tls_configured(&self) -> bool {
        self.cert.as_ref().is_some_and(|p| !p.as_os_str().is_empty())
            || self.key.as_ref().is_some_and(|p| !p.as_os_str().is_empty())
    }

    /// True only if both paths are non-empty and exist on disk right now.
    pub fn tls_enabled(&self) -> bool {
        match (self.cert(), self.key()) {
            (Some(cert), Some(key)) => tls_files_present(cert, key),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = MuxConfig::new("127.0.0.1:0");

        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert!(!config.tls_configured());
        assert!(!config.tls_enabled());
    }

    #[test]
    fn test_tls_enabled_needs_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("cert.pem");
        let key = dir.path().join("key.pem");

        let config = MuxConfig::new("127.0.0.1:0").with_tls(&cert, &key);
        assert!(config.tls_configured());
        assert!(!config.tls_enabled());

        fs::write(&cert, "cert").unwrap();
        assert!(!config.tls_enabled());

        fs::write(&key, "key").unwrap();
        assert!(config.tls_enabled());
    }

    #[test]
    fn test_empty_paths_are_not_tls() {
        let config = MuxConfig::new("127.0.0.1:0").with_tls("", "");

        assert!(!config.tls_configured());
        assert!(!config.tls_enabled());
    }

    #[test]
    fn test_port_only_binds_all_interfaces() {
        assert_eq!(MuxConfig::new(":8080").bind_addr(), "0.0.0.0:8080");
        assert_eq!(MuxConfig::new(":8080").addr(), ":8080");
        assert_eq!(MuxConfig::new("127.0.0.1:8080").bind_addr(), "127.0.0.1:8080");
        assert_eq!(MuxConfig::new("[::1]:8080").bind_addr(), "[::1]:8080");
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: MuxConfig = serde_urlencoded::from_str("addr=0.0.0.0%3A8080&cert=cert.pem").unwrap();

        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.cert(), Some(Path::new("cert.pem")));
        assert_eq!(config.key(), None);
        assert_eq!(config.shutdown_timeout(), DEFAULT_SHUTDOWN_TIMEOUT);
    }
}
