/// Errors that can occur while encoding or decoding multiplex frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// A write would grow the frame past the CAN-FD payload limit.
    #[error("frame overflow ({needed} bytes needed, capacity {capacity})")]
    Overflow { needed: usize, capacity: usize },

    /// A register address does not fit the 7-bit multiplex address field.
    #[error("register {0:#x} is outside the 7-bit addressable range")]
    RegisterOutOfRange(u32),

    /// A value was written with `Resolution::Ignore`.
    #[error("attempt to write a field with ignored resolution")]
    IgnoredResolution,

    /// A read asked for more bytes than remain in the frame.
    #[error("frame overrun ({needed} bytes needed, {available} available)")]
    Overrun { needed: usize, available: usize },

    /// A combiner was finished before every field was visited.
    #[error("write combiner driven {driven} times, expected {expected}")]
    CombinerIncomplete { expected: usize, driven: usize },

    /// A combiner was driven past its last field.
    #[error("write combiner driven past its {expected} fields")]
    CombinerOverrun { expected: usize },
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
