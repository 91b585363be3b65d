//! Firmware upload over the web UI, backed by the `esp-ota` crate.
//!
//! Flow: `POST /update` with the raw image as the body →
//! [`OtaManager::begin`] → N × [`OtaManager::write`] →
//! [`OtaManager::finalize`] (boot partition set) → reboot.
//!
//! [`receive`] drives the whole sequence from any byte source, so the
//! HTTP adapter only supplies a read closure and the state machine is
//! testable on the host. Host builds stage the image in memory.

use core::fmt;

use log::{info, warn};
use serde::Serialize;

use super::ControlResponse;
use crate::error::Error;

/// Path the upload is accepted on.
pub const OTA_ROUTE: &str = "/update";

/// Largest image accepted. Matches the app partition size.
pub const MAX_FIRMWARE_SIZE: usize = 4 * 1024 * 1024;

/// Bytes moved from the transport to flash per write.
pub const CHUNK_SIZE: usize = 1024;

// ── Error type ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtaError {
    /// An upload is already being written.
    AlreadyInProgress,
    /// No `Content-Length`, zero length, or larger than [`MAX_FIRMWARE_SIZE`].
    InvalidSize,
    /// The inactive OTA partition could not be opened.
    BeginFailed,
    WriteFailed,
    /// Image verification or boot-partition switch failed.
    FinalizeFailed,
    /// `write`/`finalize` without an active upload.
    NotReceiving,
    /// More bytes than announced.
    Overflow,
    /// The body ended before the announced length.
    IncompleteTransfer,
    /// The transport returned an error mid-upload.
    Transport,
}

impl OtaError {
    /// The request itself was at fault, as opposed to the flash.
    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            Self::AlreadyInProgress
                | Self::InvalidSize
                | Self::Overflow
                | Self::IncompleteTransfer
                | Self::Transport
        )
    }
}

impl fmt::Display for OtaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInProgress => write!(f, "firmware upload already in progress"),
            Self::InvalidSize => write!(f, "firmware size out of range (max 4 MB)"),
            Self::BeginFailed => write!(f, "no OTA partition available"),
            Self::WriteFailed => write!(f, "flash write failed"),
            Self::FinalizeFailed => write!(f, "firmware image rejected"),
            Self::NotReceiving => write!(f, "no upload in progress"),
            Self::Overflow => write!(f, "body longer than Content-Length"),
            Self::IncompleteTransfer => write!(f, "body shorter than Content-Length"),
            Self::Transport => write!(f, "connection error during upload"),
        }
    }
}

// ── State machine ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtaState {
    Idle,
    Receiving { expected: usize, written: usize },
    ReadyToReboot,
}

pub struct OtaManager {
    state: OtaState,
    #[cfg(target_os = "espidf")]
    update: Option<esp_ota::OtaUpdate>,
    #[cfg(not(target_os = "espidf"))]
    staged: Vec<u8>,
}

impl OtaManager {
    pub fn new() -> Self {
        Self {
            state: OtaState::Idle,
            #[cfg(target_os = "espidf")]
            update: None,
            #[cfg(not(target_os = "espidf"))]
            staged: Vec::new(),
        }
    }

    pub fn state(&self) -> OtaState {
        self.state
    }

    /// Open the inactive partition for an image of `size` bytes.
    pub fn begin(&mut self, size: usize) -> Result<(), OtaError> {
        if self.state != OtaState::Idle {
            return Err(OtaError::AlreadyInProgress);
        }
        if size == 0 || size > MAX_FIRMWARE_SIZE {
            return Err(OtaError::InvalidSize);
        }

        #[cfg(target_os = "espidf")]
        {
            let update = esp_ota::OtaUpdate::begin().map_err(|e| {
                warn!("OTA: begin failed: {:?}", e);
                OtaError::BeginFailed
            })?;
            self.update = Some(update);
        }
        #[cfg(not(target_os = "espidf"))]
        self.staged.clear();

        self.state = OtaState::Receiving {
            expected: size,
            written: 0,
        };
        info!("OTA: receiving {} bytes", size);
        Ok(())
    }

    /// Append `data` to the image. Returns the running total.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, OtaError> {
        let OtaState::Receiving { expected, written } = self.state else {
            return Err(OtaError::NotReceiving);
        };
        let total = written + data.len();
        if total > expected {
            self.abort();
            return Err(OtaError::Overflow);
        }

        #[cfg(target_os = "espidf")]
        {
            let Some(update) = self.update.as_mut() else {
                return Err(OtaError::NotReceiving);
            };
            if let Err(e) = update.write(data) {
                warn!("OTA: write failed at {}: {:?}", written, e);
                self.abort();
                return Err(OtaError::WriteFailed);
            }
        }
        #[cfg(not(target_os = "espidf"))]
        self.staged.extend_from_slice(data);

        self.state = OtaState::Receiving {
            expected,
            written: total,
        };
        Ok(total)
    }

    /// Verify the image and make it the next boot partition.
    pub fn finalize(&mut self) -> Result<(), OtaError> {
        match self.state {
            OtaState::Receiving { expected, written } if written == expected => {}
            OtaState::Receiving { .. } => {
                self.abort();
                return Err(OtaError::IncompleteTransfer);
            }
            _ => return Err(OtaError::NotReceiving),
        }

        #[cfg(target_os = "espidf")]
        {
            let Some(update) = self.update.take() else {
                self.state = OtaState::Idle;
                return Err(OtaError::NotReceiving);
            };
            let mut completed = update.finalize().map_err(|e| {
                warn!("OTA: image verification failed: {:?}", e);
                self.state = OtaState::Idle;
                OtaError::FinalizeFailed
            })?;
            completed.set_as_boot_partition().map_err(|e| {
                warn!("OTA: set_as_boot_partition failed: {:?}", e);
                self.state = OtaState::Idle;
                OtaError::FinalizeFailed
            })?;
        }

        self.state = OtaState::ReadyToReboot;
        info!("OTA: image accepted, reboot pending");
        Ok(())
    }

    /// Drop the partial image and return to `Idle`.
    pub fn abort(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            // Dropping the handle aborts the esp-ota update.
            self.update.take();
        }
        #[cfg(not(target_os = "espidf"))]
        self.staged.clear();

        if self.state != OtaState::Idle {
            warn!("OTA: aborted");
        }
        self.state = OtaState::Idle;
    }

    /// Image received so far (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn staged(&self) -> &[u8] {
        &self.staged
    }
}

impl Default for OtaManager {
    fn default() -> Self {
        Self::new()
    }
}

// ── Streaming driver ──────────────────────────────────────────

/// Stream a whole upload of `content_len` bytes into `ota`.
///
/// `read` fills the buffer it is given and returns the byte count, 0 at
/// end of body. Any failure leaves `ota` idle, so the next upload can
/// start over. On success `ota` is [`OtaState::ReadyToReboot`] and the
/// image size is returned.
pub fn receive<E: fmt::Debug>(
    ota: &mut OtaManager,
    content_len: Option<usize>,
    mut read: impl FnMut(&mut [u8]) -> Result<usize, E>,
) -> Result<usize, OtaError> {
    ota.begin(content_len.ok_or(OtaError::InvalidSize)?)?;

    let mut buf = [0_u8; CHUNK_SIZE];
    loop {
        let n = match read(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                warn!("OTA: read failed: {:?}", e);
                ota.abort();
                return Err(OtaError::Transport);
            }
        };
        if n == 0 {
            break;
        }
        ota.write(&buf[..n])?;
    }

    let OtaState::Receiving { written, .. } = ota.state() else {
        return Err(OtaError::NotReceiving);
    };
    ota.finalize()?;
    Ok(written)
}

#[derive(Serialize)]
struct UploadDone {
    status: &'static str,
    bytes: usize,
}

/// `POST /update`: run [`receive`] and build the reply.
///
/// A 200 means the image is the next boot partition; the caller
/// schedules the reboot once the reply is out.
pub fn handle_upload<E: fmt::Debug>(
    ota: &mut OtaManager,
    content_len: Option<usize>,
    read: impl FnMut(&mut [u8]) -> Result<usize, E>,
) -> ControlResponse {
    match receive(ota, content_len, read) {
        Ok(bytes) => {
            info!("HTTP: firmware upload complete ({} bytes)", bytes);
            ControlResponse::json(&UploadDone { status: "ok", bytes })
        }
        Err(e) => {
            warn!("HTTP: firmware upload failed ({})", e);
            ControlResponse::from_error(&Error::Ota(e))
        }
    }
}
