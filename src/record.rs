//! Persisted timer record codec.
//!
//! The record is plain text, one decimal integer per line:
//!
//! ```text
//! <on-duration seconds>\n
//! <off-duration seconds>\n
//! ```
//!
//! Durations are held in milliseconds in memory and truncated to whole
//! seconds on the way out, so the record is only stable at second
//! granularity. Decoding tolerates `\r\n` line endings, surrounding
//! whitespace, and a missing final newline.

use core::fmt::Write;

use crate::app::ports::StoreError;
use crate::config::DutyCycleConfig;

/// Two `u64` values in decimal plus separators.
pub const RECORD_CAPACITY: usize = 48;

/// Encoded record text.
pub type RecordBuf = heapless::String<RECORD_CAPACITY>;

/// Render `config` as the two-line record.
pub fn encode(config: &DutyCycleConfig) -> RecordBuf {
    let mut out = RecordBuf::new();
    // Two u64 values (max 20 digits each) plus two newlines always fit.
    let _ = write!(out, "{}\n{}\n", config.on_secs(), config.off_secs());
    out
}

/// Parse a record produced by [`encode`].
///
/// Anything other than exactly two non-negative integers is
/// [`StoreError::Malformed`]. Trailing blank lines are ignored.
pub fn decode(bytes: &[u8]) -> Result<DutyCycleConfig, StoreError> {
    let text = core::str::from_utf8(bytes).map_err(|_| StoreError::Malformed)?;

    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let on_ms = parse_ms(lines.next())?;
    let off_ms = parse_ms(lines.next())?;
    if lines.next().is_some() {
        return Err(StoreError::Malformed);
    }

    Ok(DutyCycleConfig::new(on_ms, off_ms))
}

/// One line of whole seconds, as milliseconds. Values whose millisecond
/// form does not fit a `u64` are malformed.
fn parse_ms(line: Option<&str>) -> Result<u64, StoreError> {
    let line = line.ok_or(StoreError::Malformed)?;
    if !line.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StoreError::Malformed);
    }
    line.parse::<u64>()
        .ok()
        .and_then(|secs| secs.checked_mul(1000))
        .ok_or(StoreError::Malformed)
}
