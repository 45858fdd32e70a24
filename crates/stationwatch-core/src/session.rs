// ── Session lifecycle ──
//
// Owns the device client and the single authenticated session held
// against the router. Every network call goes through `bounded`, so a
// hung router surfaces as `CoreError::Timeout` instead of a stuck cycle.

use std::future::Future;
use std::time::Duration;

use secrecy::SecretString;
use tracing::{debug, error, info};

use stationwatch_api::{DeviceClient, RawDeviceList};

use crate::error::CoreError;

/// One router session: credentials, client handle, authenticated flag.
///
/// State-changing methods take `&mut self`, so at most one login or
/// logout can be in flight per session.
pub struct Session<C> {
    client: C,
    username: String,
    password: SecretString,
    authenticated: bool,
    call_timeout: Duration,
}

impl<C: DeviceClient> Session<C> {
    pub fn new(
        client: C,
        username: impl Into<String>,
        password: SecretString,
        call_timeout: Duration,
    ) -> Self {
        Self {
            client,
            username: username.into(),
            password,
            authenticated: false,
            call_timeout,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Log in with the stored credentials.
    ///
    /// The session is unauthenticated for the duration of the call and
    /// only becomes authenticated once the router accepts the login. A
    /// call abandoned mid-flight therefore leaves it unauthenticated.
    pub async fn login(&mut self) -> Result<(), CoreError> {
        info!(user = %self.username, "logging in to router");
        self.authenticated = false;

        match bounded(
            self.call_timeout,
            self.client.login(&self.username, &self.password),
        )
        .await
        {
            Ok(()) => {
                self.authenticated = true;
                info!("logged in to router");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "router login failed");
                Err(e)
            }
        }
    }

    /// Log out. The session is unauthenticated afterwards whatever the
    /// outcome; a failure is returned for the caller to report.
    pub async fn logout(&mut self) -> Result<(), CoreError> {
        info!("logging out of router");
        self.authenticated = false;
        let result = bounded(self.call_timeout, self.client.logout()).await;
        if result.is_ok() {
            info!("logged out of router");
        }
        result
    }

    /// Fetch the raw device listing.
    pub async fn fetch_devices(&self) -> Result<Option<RawDeviceList>, CoreError> {
        debug!("fetching device listing");
        bounded(self.call_timeout, self.client.fetch_devices()).await
    }

    /// Forget the session after the router signalled it is gone.
    pub(crate) fn invalidate(&mut self) {
        self.authenticated = false;
    }
}

/// Run one client call under `limit`, mapping the result into `CoreError`.
async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, stationwatch_api::Error>>,
) -> Result<T, CoreError> {
    let timed_out = || CoreError::Timeout {
        timeout_secs: limit.as_secs(),
    };
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        // A client-side deadline carries no duration of its own.
        Ok(Err(e)) => match CoreError::from(e) {
            CoreError::Timeout { timeout_secs: 0 } => Err(timed_out()),
            other => Err(other),
        },
        Err(_) => Err(timed_out()),
    }
}
