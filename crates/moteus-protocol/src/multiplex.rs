//! Multiplex opcodes and field resolutions.
//!
//! Opcode byte layout:
//! ```text
//! ┌────────────┬──────────────┬─────────────────┐
//! │ bits 7..4  │ bits 3..2    │ bits 1..0       │
//! │ family     │ resolution   │ inline count    │
//! │ 0 write    │ 0 int8       │ 1-3, or 0 when  │
//! │ 1 read     │ 1 int16      │ an explicit     │
//! │ 2 reply    │ 2 int32      │ count byte      │
//! │            │ 3 float      │ follows         │
//! └────────────┴──────────────┴─────────────────┘
//! ```
//! Error, stream tunnel and nop opcodes live at fixed codes outside the
//! register families.

pub const WRITE_BASE: u8 = 0x00;
pub const WRITE_INT8: u8 = 0x00;
pub const WRITE_INT16: u8 = 0x04;
pub const WRITE_INT32: u8 = 0x08;
pub const WRITE_FLOAT: u8 = 0x0c;

pub const READ_BASE: u8 = 0x10;
pub const READ_INT8: u8 = 0x10;
pub const READ_INT16: u8 = 0x14;
pub const READ_INT32: u8 = 0x18;
pub const READ_FLOAT: u8 = 0x1c;

pub const REPLY_BASE: u8 = 0x20;
pub const REPLY_INT8: u8 = 0x20;
pub const REPLY_INT16: u8 = 0x24;
pub const REPLY_INT32: u8 = 0x28;
pub const REPLY_FLOAT: u8 = 0x2c;

pub const WRITE_ERROR: u8 = 0x30;
pub const READ_ERROR: u8 = 0x31;

/// Tunneled stream, client to server.
pub const CLIENT_TO_SERVER: u8 = 0x40;
/// Tunneled stream, server to client.
pub const SERVER_TO_CLIENT: u8 = 0x41;
/// Tunneled stream, client polling the server.
pub const CLIENT_POLL_SERVER: u8 = 0x42;

pub const NOP: u8 = 0x50;

/// Largest run length that fits in the inline count bits.
pub const MAX_INLINE_COUNT: usize = 3;

/// Largest register address a multiplex header can carry.
pub const MAX_HEADER_REGISTER: u32 = 0x7f;

/// Wire format for one field of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    Int8,
    Int16,
    Int32,
    Float,
    /// Leave the field out of the message entirely.
    Ignore,
}

impl Resolution {
    /// Bytes one value occupies on the wire.
    pub fn wire_size(self) -> usize {
        match self {
            Self::Int8 => 1,
            Self::Int16 => 2,
            Self::Int32 | Self::Float => 4,
            Self::Ignore => 0,
        }
    }

    /// Offset added to a family base opcode, or `None` for `Ignore`.
    pub fn opcode_offset(self) -> Option<u8> {
        match self {
            Self::Int8 => Some(0x00),
            Self::Int16 => Some(0x04),
            Self::Int32 => Some(0x08),
            Self::Float => Some(0x0c),
            Self::Ignore => None,
        }
    }

    /// Decode the 2-bit resolution id carried in opcode bits 3..2.
    pub fn from_id(id: u8) -> Self {
        match id & 0x03 {
            0 => Self::Int8,
            1 => Self::Int16,
            2 => Self::Int32,
            _ => Self::Float,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Float => "float",
            Self::Ignore => "ignore",
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns true if `opcode` starts a reply run.
pub fn is_reply(opcode: u8) -> bool {
    (REPLY_BASE..WRITE_ERROR).contains(&opcode)
}
