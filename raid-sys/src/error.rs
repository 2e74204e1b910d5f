// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

/// Error types for system-level operations
#[derive(Error, Debug)]
pub enum SysError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("no filesystem UUID reported for {0}")]
    UuidMissing(String),
}

/// Result type alias for system operations
pub type Result<T> = std::result::Result<T, SysError>;
