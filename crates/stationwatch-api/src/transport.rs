// HTTP client construction for router sessions.
//
// Routers keep the login session in a cookie, so every client built here
// owns a cookie store. No request deadline is set on the client: the
// caller bounds each login, logout, and fetch itself.

use std::path::{Path, PathBuf};

use reqwest::Certificate;

use crate::error::Error;

/// How the router's certificate is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Trust the CA in this PEM file in addition to the system store.
    CustomCa(PathBuf),
    /// Accept any certificate. Most home routers serve a self-signed one.
    DangerAcceptInvalid,
}

/// Settings for the HTTP client behind [`HttpDeviceClient`](crate::HttpDeviceClient).
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub user_agent: String,
}

impl TransportConfig {
    pub fn new(tls: TlsMode) -> Self {
        Self {
            tls,
            user_agent: concat!("stationwatch/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }

    /// Build a cookie-carrying `reqwest::Client`.
    pub(crate) fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(&self.user_agent);

        builder = match &self.tls {
            TlsMode::System => builder,
            TlsMode::CustomCa(path) => builder.add_root_certificate(load_ca(path)?),
            TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        };

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

fn load_ca(path: &Path) -> Result<Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("failed to read CA cert {}: {e}", path.display())))?;
    Certificate::from_pem(&pem).map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_names_the_crate() {
        let config = TransportConfig::new(TlsMode::System);
        assert!(config.user_agent.starts_with("stationwatch/"));
    }

    #[test]
    fn missing_ca_file_is_a_tls_error() {
        let config = TransportConfig::new(TlsMode::CustomCa("/nonexistent/router-ca.pem".into()));
        match config.build_client() {
            Err(Error::Tls(msg)) => assert!(msg.contains("router-ca.pem"), "got: {msg}"),
            other => panic!("expected Tls error, got {other:?}"),
        }
    }

    #[test]
    fn builds_for_every_mode_without_a_ca() {
        assert!(TransportConfig::new(TlsMode::System).build_client().is_ok());
        assert!(
            TransportConfig::new(TlsMode::DangerAcceptInvalid)
                .build_client()
                .is_ok()
        );
    }
}
