/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Encoding a command failed; nothing was sent.
    #[error("protocol error: {0}")]
    Protocol(#[from] moteus_protocol::ProtocolError),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] moteus_transport::TransportError),

    /// The device did not answer a frame that expected a reply.
    #[error("device {0} did not reply")]
    NoReply(u8),

    /// The configured query requests no registers.
    #[error("query requests no registers")]
    NothingToQuery,

    /// No session exists for the device id.
    #[error("unknown device {0}")]
    UnknownDevice(u8),

    /// Two sessions were requested for the same device id.
    #[error("duplicate device {0}")]
    DuplicateDevice(u8),

    /// Device ids and transports were supplied in different numbers.
    #[error("{ids} device ids but {transports} transports")]
    LengthMismatch { ids: usize, transports: usize },
}

pub type Result<T> = std::result::Result<T, SessionError>;
