use moteus_protocol::ProtocolError;

/// Errors that can occur while moving frames to or from a device.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport has been shut down.
    #[error("transport closed")]
    Closed,

    /// A received payload is not a valid frame.
    #[error("invalid frame: {0}")]
    Frame(#[from] ProtocolError),

    /// An I/O error occurred on the underlying link.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
