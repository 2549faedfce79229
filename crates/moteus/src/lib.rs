//! CAN-FD register protocol for the moteus brushless servo controller.
//!
//! # Crate Structure
//!
//! - [`protocol`] - Frame writer, write combiner, reply parser, command builders
//! - [`transport`] - Frame transport contract and an in-memory loopback
//! - [`session`] - Per-device sessions and multi-device sets (behind `session` feature)

/// Re-export protocol types.
pub mod protocol {
    pub use moteus_protocol::*;
}

/// Re-export transport types.
pub mod transport {
    pub use moteus_transport::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use moteus_session::*;
}
