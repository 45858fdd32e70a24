//! Client boundary between `stationwatch-core` and a home router.
//!
//! - **[`DeviceClient`]** -- the trait the poller drives: login, logout,
//!   raw device-list retrieval.
//! - **[`Error`] / [`ErrorKind`]** -- every failure, classified at this
//!   boundary so the poller can tell an expired session (unparsable body)
//!   from a transport failure.
//! - **[`HttpDeviceClient`]** -- cookie-session JSON binding with
//!   configurable endpoint paths.

pub mod client;
pub mod error;
pub mod http;
pub mod models;
pub mod transport;

pub use client::DeviceClient;
pub use error::{Error, ErrorKind};
pub use http::{Endpoints, HttpDeviceClient};
pub use models::{RawDevice, RawDeviceList};
pub use transport::{TlsMode, TransportConfig};
