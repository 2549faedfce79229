//! Frame transport contract for moteus sessions.
//!
//! A transport moves whole CAN-FD payloads between one session and one
//! device. How frames reach the bus (SocketCAN, a USB bridge, ...) is up to
//! the implementation; sessions only see [`FrameTransport`].
//!
//! [`LoopbackTransport`] keeps everything in memory and is used by tests and
//! the CLI.

pub mod error;
pub mod loopback;
pub mod traits;

pub use error::{Result, TransportError};
pub use loopback::LoopbackTransport;
pub use traits::FrameTransport;
