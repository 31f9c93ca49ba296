//! Error types for the zconf CLI.
//!
//! CliError wraps CoreError from the shared library and adds CLI-specific variants.

use thiserror::Error;
use zconf_core::error::{BackendError, CoreError, RegistryError};

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const TOOL_MISSING: i32 = 2;
    pub const ALREADY_REGISTERED: i32 = 3;
    pub const INVALID_ARGS: i32 = 4;
    pub const NO_SERVICES: i32 = 5;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No services found")]
    NoServicesFound,
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(e) => match e {
                CoreError::Backend(BackendError::ToolMissing { .. }) => exit_codes::TOOL_MISSING,
                CoreError::Backend(_) => exit_codes::GENERAL_ERROR,
                CoreError::Registry(RegistryError::AlreadyRegistered { .. }) => {
                    exit_codes::ALREADY_REGISTERED
                }
                CoreError::Escape(_) => exit_codes::GENERAL_ERROR,
                CoreError::Io(_) => exit_codes::GENERAL_ERROR,
                CoreError::Other(_) => exit_codes::GENERAL_ERROR,
            },
            CliError::Io(_) => exit_codes::GENERAL_ERROR,
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
            CliError::NoServicesFound => exit_codes::NO_SERVICES,
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
