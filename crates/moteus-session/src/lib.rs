//! Per-device command sessions for moteus controllers.
//!
//! A [`Session`] pairs one device id with one transport: it encodes a
//! command into a frame, hands the frame to the transport and decodes the
//! reply. [`DeviceSet`] owns several independent sessions.

pub mod devices;
pub mod error;
pub mod session;

pub use devices::DeviceSet;
pub use error::{Result, SessionError};
pub use session::{Session, SessionConfig};
