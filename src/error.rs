//! Unified error types for the relay timer firmware.
//!
//! A single `Error` enum that every subsystem can convert into. All
//! variants are `Copy` so they can be passed through the control surface
//! without allocation. Neither the duty-cycle engine nor the indicator
//! can fail; errors originate from storage, user input, firmware upload
//! and boot-time configuration.

use core::fmt;

use crate::app::ports::StoreError;
use crate::control::ota::OtaError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The timer store could not be read or written.
    Storage(StoreError),
    /// A control-surface request carried an unusable value.
    Input(InputError),
    /// A firmware upload failed.
    Ota(OtaError),
    /// Peripheral or service initialisation failed.
    Init(&'static str),
}

impl Error {
    /// The request was at fault (HTTP 400) rather than the device (500).
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Input(_) => true,
            Self::Ota(e) => e.is_client_error(),
            Self::Storage(_) | Self::Init(_) => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Input(e) => write!(f, "input: {e}"),
            Self::Ota(e) => write!(f, "ota: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

/// Rejections from control-surface input parsing. The field name is
/// carried so the HTTP layer can report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// The field was absent or empty.
    Missing(&'static str),
    /// The field was present but not a decimal integer.
    NotANumber(&'static str),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "missing field '{field}'"),
            Self::NotANumber(field) => write!(f, "field '{field}' is not an integer"),
        }
    }
}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

impl From<OtaError> for Error {
    fn from(e: OtaError) -> Self {
        Self::Ota(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
