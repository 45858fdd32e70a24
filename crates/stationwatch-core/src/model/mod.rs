// ── Domain model ──

pub mod device;
pub mod filter;
pub mod mac;

pub use device::{DeviceRecord, DeviceSnapshot, Origin};
pub use filter::{MacFilter, apply_filter};
pub use mac::MacAddress;
