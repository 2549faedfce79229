//! Multiplex register protocol codec for the moteus brushless servo.
//!
//! This is the core layer of the workspace. Controller state is mapped to
//! and from a small set of addressable registers, and every register in a
//! message may travel at one of several resolutions:
//! - 8, 16 or 32-bit fixed point, scaled per physical quantity
//! - 32-bit IEEE float, unscaled
//!
//! Consecutive registers that share a resolution are grouped under a single
//! multiplex header, so a command costs as few bytes as the chosen
//! resolutions allow. Everything here is synchronous and performs no I/O;
//! frames are handed to a transport by higher layers.

#[cfg(not(target_endian = "little"))]
compile_error!("moteus-protocol only supports little-endian targets");

pub mod combiner;
pub mod command;
pub mod error;
pub mod frame;
pub mod multiplex;
pub mod parser;
pub mod query;
pub mod register;
pub mod scaling;
pub mod writer;

pub use combiner::WriteCombiner;
pub use command::{
    emit_position_command, emit_stop_command, emit_within_command, PositionCommand,
    PositionResolution, WithinCommand, WithinResolution,
};
pub use error::{ProtocolError, Result};
pub use frame::{CanFrame, MAX_FRAME_SIZE};
pub use multiplex::Resolution;
pub use parser::{Field, MultiplexParser};
pub use query::{emit_query_command, parse_query_result, QueryCommand, QueryResult};
pub use register::{register_name, Mode, CURRENT_REGISTER_MAP_VERSION};
pub use scaling::{nanify, saturate, Fixed, Scale};
pub use writer::FrameWriter;
