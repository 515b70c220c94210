//! Error types for the transport boundary.
//!
//! Only fatal conditions are represented here. Transient would-block results
//! are data, not errors, and travel in [`crate::transport::IoResult`]; a
//! `TransportError` always tears the connection down.

/// Fatal failure reported by a transport socket.
#[derive(Debug)]
pub enum TransportError {
    /// The underlying socket operation failed.
    Io(std::io::Error),
    /// Transport-level negotiation failed before or during the handshake.
    Handshake(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "socket error: {error}"),
            Self::Handshake(reason) => write!(f, "transport handshake failed: {reason}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::Handshake(_) => None,
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(error: std::io::Error) -> Self { Self::Io(error) }
}
