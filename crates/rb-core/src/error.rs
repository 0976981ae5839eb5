//! Error types for the retrobridge boundary layer

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::boundary::RequestId;
use crate::joypad::LogicalButton;

/// Main error type for the bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Frame format error: {0}")]
    Frame(#[from] FrameFormatError),

    #[error("Frame size error: {0}")]
    FrameSize(#[from] FrameSizeError),

    #[error("Request in flight: {0}")]
    RequestInFlight(#[from] RequestInFlightError),

    #[error("Key mapping error: {0}")]
    Mapping(#[from] KeyMappingError),

    #[error("Display surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("No service registered for request {0}")]
    NoService(&'static str),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// A frame payload whose length does not match the pixel buffer
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("expected {expected} bytes ({width}x{height}x4), got {actual}")]
pub struct FrameFormatError {
    pub width: u32,
    pub height: u32,
    pub expected: usize,
    pub actual: usize,
}

/// Frame dimensions too large to allocate a buffer for
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("frame size {width}x{height} exceeds {max} pixels per side")]
pub struct FrameSizeError {
    pub width: u32,
    pub height: u32,
    pub max: u32,
}

/// A pull request issued while a previous one is still outstanding
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("frame request still outstanding after {outstanding:?}")]
pub struct RequestInFlightError {
    /// Boundary id of the outstanding request; `None` while it is
    /// still being issued
    pub id: Option<RequestId>,
    pub outstanding: Duration,
}

/// Invalid key-to-button table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyMappingError {
    #[error("no key bound to {0}")]
    MissingButton(LogicalButton),

    #[error("empty key bound to {0}")]
    EmptyKey(LogicalButton),

    #[error("key {key:?} bound to both {first} and {second}")]
    DuplicateKey {
        key: String,
        first: LogicalButton,
        second: LogicalButton,
    },

    #[error("{0} bound more than once")]
    DuplicateButton(LogicalButton),
}

/// The display surface could not be acquired or used
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("display surface unsupported: {0}")]
    Unsupported(String),

    #[error("surface size {surface_width}x{surface_height} does not match buffer {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        surface_width: u32,
        surface_height: u32,
    },
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameFormatError {
            width: 256,
            height: 256,
            expected: 262144,
            actual: 12,
        };
        assert_eq!(
            format!("{}", err),
            "expected 262144 bytes (256x256x4), got 12"
        );

        let err = KeyMappingError::DuplicateKey {
            key: "w".to_string(),
            first: LogicalButton::Up,
            second: LogicalButton::A,
        };
        assert_eq!(format!("{}", err), "key \"w\" bound to both UP and A");
    }

    #[test]
    fn test_error_conversion() {
        let err = FrameFormatError {
            width: 1,
            height: 1,
            expected: 4,
            actual: 3,
        };
        let bridge_err: BridgeError = err.into();
        assert!(matches!(bridge_err, BridgeError::Frame(_)));

        let bridge_err: BridgeError = FrameSizeError {
            width: 1 << 20,
            height: 1,
            max: 4096,
        }
        .into();
        assert!(matches!(bridge_err, BridgeError::FrameSize(_)));
        assert_eq!(
            bridge_err.to_string(),
            "Frame size error: frame size 1048576x1 exceeds 4096 pixels per side"
        );

        let bridge_err: BridgeError = KeyMappingError::MissingButton(LogicalButton::B).into();
        assert!(matches!(bridge_err, BridgeError::Mapping(_)));
    }
}
