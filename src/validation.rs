//! Validation and fixed-width field helpers for radio-facing strings.
//!
//! Wires-X payloads carry every text field at a fixed width, space padded. The
//! helpers here turn configuration strings into those fields and reject values
//! that would not survive the trip (non-ASCII, control characters, oversize
//! callsigns).

/// Callsign validation errors with helpful messages
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CallsignError {
    #[error("Callsign is empty")]
    Empty,

    #[error("Callsign is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Callsign contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },
}

/// Maximum callsign width on the wire.
pub const CALLSIGN_LEN: usize = 10;

/// Copy `value` into a space-padded field of width `N`, truncating if needed.
///
/// Non-ASCII bytes are replaced with `'?'` so every field stays one byte per
/// character.
pub fn fixed_field<const N: usize>(value: &str) -> [u8; N] {
    let mut out = [b' '; N];
    for (slot, b) in out.iter_mut().zip(value.bytes()) {
        *slot = if b.is_ascii() && !b.is_ascii_control() {
            b
        } else {
            b'?'
        };
    }
    out
}

/// True when every byte is an ASCII space.
pub fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == b' ')
}

/// Render a fixed-width field for display, dropping trailing padding.
pub fn field_str(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end().to_string()
}

/// Validate a station callsign and return it upper-cased.
///
/// Letters, digits, `-` and `/` are accepted; the result fits the 10-byte
/// callsign field.
pub fn validate_callsign(callsign: &str) -> Result<String, CallsignError> {
    let trimmed = callsign.trim();
    if trimmed.is_empty() {
        return Err(CallsignError::Empty);
    }
    if trimmed.len() > CALLSIGN_LEN {
        return Err(CallsignError::TooLong { max: CALLSIGN_LEN });
    }

    let invalid: String = trimmed
        .chars()
        .filter(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '/'))
        .collect();
    if !invalid.is_empty() {
        return Err(CallsignError::InvalidCharacters { chars: invalid });
    }

    Ok(trimmed.to_ascii_uppercase())
}
