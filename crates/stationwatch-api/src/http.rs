// JSON-over-HTTP device client
//
// Cookie-session binding for routers that expose a JSON management API:
// credentials are posted to a login path, the session cookie lands in the
// client's jar, and the device listing is read from a single endpoint.
// Endpoint paths are configurable; everything vendor-specific beyond that
// belongs in its own `DeviceClient` impl.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{debug, trace};
use url::Url;

use crate::client::DeviceClient;
use crate::error::Error;
use crate::models::RawDeviceList;
use crate::transport::TransportConfig;

/// Request paths, relative to the router's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub login: String,
    pub logout: String,
    pub devices: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/api/login".into(),
            logout: "/api/logout".into(),
            devices: "/api/devices".into(),
        }
    }
}

/// HTTP client for a router's JSON management interface.
pub struct HttpDeviceClient {
    http: reqwest::Client,
    base_url: Url,
    endpoints: Endpoints,
}

impl HttpDeviceClient {
    /// Create a client from a `TransportConfig`. The session cookie lives
    /// in the client's own cookie store.
    pub fn new(
        base_url: Url,
        endpoints: Endpoints,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            endpoints,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`. It must keep
    /// cookies for the login to stick.
    pub fn with_client(http: reqwest::Client, base_url: Url, endpoints: Endpoints) -> Self {
        Self {
            http,
            base_url,
            endpoints,
        }
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    async fn post_login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.url(&self.endpoints.login)?;
        debug!("logging in at {}", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
            });
        }

        debug!("login successful");
        Ok(())
    }

    async fn post_logout(&self) -> Result<(), Error> {
        let url = self.url(&self.endpoints.logout)?;
        debug!("logging out at {}", url);

        let resp = self.http.post(url).send().await.map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("logout failed (HTTP {status})"),
            });
        }

        debug!("logout complete");
        Ok(())
    }

    async fn get_devices(&self) -> Result<Option<RawDeviceList>, Error> {
        let url = self.url(&self.endpoints.devices)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        parse_device_list(&body)
    }
}

impl DeviceClient for HttpDeviceClient {
    async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        self.post_login(username, password).await
    }

    async fn logout(&self) -> Result<(), Error> {
        self.post_logout().await
    }

    async fn fetch_devices(&self) -> Result<Option<RawDeviceList>, Error> {
        self.get_devices().await
    }
}

/// Parse a device-list body.
///
/// An empty body, `null`, or `{}` means "no data" and yields `None`.
/// Anything that is not a device-list object is a structural error.
pub fn parse_device_list(body: &str) -> Result<Option<RawDeviceList>, Error> {
    if body.trim().is_empty() {
        trace!("empty device-list body");
        return Ok(None);
    }

    let value: Value = serde_json::from_str(body).map_err(|e| Error::unparsable(&e, body))?;
    match value {
        Value::Null => Ok(None),
        Value::Object(ref map) if map.is_empty() => Ok(None),
        other => serde_json::from_value(other)
            .map(Some)
            .map_err(|e| Error::unparsable(&e, body)),
    }
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
