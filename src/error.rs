//! # Error Types
//!
//! Custom error types for gamepad-pointer using `thiserror`.

use thiserror::Error;

/// Main error type for gamepad-pointer
#[derive(Debug, Error)]
pub enum GamepadPointerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration serialization errors
    #[error("Configuration serialization error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gamepad-pointer
pub type Result<T> = std::result::Result<T, GamepadPointerError>;
