// Device client boundary
//
// The poller only ever talks to a router through this trait. Vendor
// protocol details (login handshakes, token schemes, endpoint layout)
// live entirely behind it.

use std::future::Future;

use secrecy::SecretString;

use crate::error::Error;
use crate::models::RawDeviceList;

/// Login, logout, and raw device-list retrieval against one router.
///
/// Implementations own whatever session material the router hands out
/// (cookies, tokens). Errors must be classified truthfully via
/// [`Error::kind`]: report an unparsable body as
/// [`Error::Deserialization`], never as a transport error, because the
/// poller re-authenticates only on that signal.
pub trait DeviceClient: Send + Sync {
    /// Authenticate with the router.
    fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// End the current router session.
    fn logout(&self) -> impl Future<Output = Result<(), Error>> + Send;

    /// Fetch the current LAN and WLAN device listings.
    ///
    /// `Ok(None)` means the router answered but returned no data at all.
    fn fetch_devices(&self) -> impl Future<Output = Result<Option<RawDeviceList>, Error>> + Send;
}
