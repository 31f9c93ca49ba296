//! Error types for zconf core.

use thiserror::Error;

/// Core error type for shared operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Escape error: {0}")]
    Escape(#[from] EscapeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised by the discovery backends (the native mDNS tools).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Required tool '{tool}' not found on PATH")]
    ToolMissing { tool: String },

    #[error("Failed to spawn '{tool}': {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the publisher registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Service already registered: '{name}' {service_type} port {port}")]
    AlreadyRegistered {
        name: String,
        service_type: String,
        port: u16,
    },
}

/// Errors raised by the label escape codec.
///
/// Escaped labels are produced by the browse tools in plain ASCII; anything
/// outside that alphabet means the input was not tool output and decoding
/// refuses to guess.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EscapeError {
    #[error("Non-ASCII byte in escaped input at offset {index}")]
    NonAscii { index: usize },

    #[error("Dangling backslash at end of escaped input")]
    TrailingBackslash,

    #[error("Escape value {value} exceeds a byte")]
    ByteOutOfRange { value: u16 },

    #[error("Decoded bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
