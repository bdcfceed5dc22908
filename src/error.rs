//! Crate-level error types.

use std::fmt;

/// Errors produced by the scenelink crate.
///
/// Faults the protocol treats as recoverable (dropped sockets, unknown
/// message tags, out-of-order transfer parts) are logged where they happen
/// and never reach callers as a `ClientError`.
#[derive(Debug)]
pub enum ClientError {
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn a background thread.
    ThreadSpawn(std::io::Error),
    /// A frame could not be decoded as a message batch.
    Decode(String),
    /// A message could not be encoded for the wire.
    Encode(String),
    /// Render capture could not read back or encode a frame.
    Capture(String),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// A GUI prop update did not fit the component's shape.
    GuiUpdate(serde_json::Error),
    /// The transport worker is gone and can no longer accept commands.
    TransportClosed,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::Decode(msg) => write!(f, "batch decode error: {msg}"),
            Self::Encode(msg) => write!(f, "message encode error: {msg}"),
            Self::Capture(msg) => write!(f, "render capture error: {msg}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::GuiUpdate(e) => write!(f, "GUI update rejected: {e}"),
            Self::TransportClosed => write!(f, "transport worker has shut down"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            Self::GuiUpdate(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<rmp_serde::decode::Error> for ClientError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for ClientError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Self::Encode(e.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::GuiUpdate(e)
    }
}

impl From<image::ImageError> for ClientError {
    fn from(e: image::ImageError) -> Self {
        Self::Capture(e.to_string())
    }
}
