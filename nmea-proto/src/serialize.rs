//! Sentence serialization: framing and checksum.
//!
//! Wraps a sentence body (address and fields, without `$`) into a complete
//! frame:
//!
//! ```text
//! $<body>*<checksum>\r\n
//! ```
//!
//! # Example
//!
//! ```
//! use nmea_proto::write_sentence;
//!
//! let mut buf = [0u8; 96];
//! let len = write_sentence("GPGLL,4916.45,N,12311.12,W,225444,A", &mut buf).unwrap();
//! assert_eq!(&buf[..len], b"$GPGLL,4916.45,N,12311.12,W,225444,A*31\r\n");
//! ```

use crate::checksum::checksum;
use crate::fmt::write_hex_u8;
use crate::sentence::MAX_SENTENCE_LENGTH;

/// Bytes added around the body: `$`, `*`, two checksum digits, CR, LF.
pub const FRAME_OVERHEAD: usize = 6;

/// Maximum size of a serialized sentence including CR LF.
pub const MAX_FRAME_SIZE: usize = MAX_SENTENCE_LENGTH + 2;

/// Longest body that still fits [`MAX_SENTENCE_LENGTH`] once framed.
pub const MAX_BODY_LENGTH: usize = MAX_FRAME_SIZE - FRAME_OVERHEAD;

/// Error type for serialization operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerializeError {
    /// The output buffer is too small to hold the serialized sentence.
    BufferTooSmall,
    /// The body contains a delimiter (`$`, `*`) or a non-printable byte.
    InvalidBody,
    /// The body is longer than [`MAX_BODY_LENGTH`].
    BodyTooLong,
    /// A write operation failed (for I/O adapters).
    WriteError,
}

impl core::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::InvalidBody => write!(f, "invalid sentence body"),
            Self::BodyTooLong => write!(f, "sentence body too long"),
            Self::WriteError => write!(f, "write error"),
        }
    }
}

/// Serialize a sentence body into `buf`.
///
/// Returns the number of bytes written on success.
///
/// # Errors
///
/// Returns [`SerializeError::BufferTooSmall`] if `buf` cannot hold the frame,
/// [`SerializeError::BodyTooLong`] if the frame would exceed
/// [`MAX_SENTENCE_LENGTH`], or [`SerializeError::InvalidBody`] if the body
/// would corrupt the framing.
pub fn write_sentence(body: &str, buf: &mut [u8]) -> Result<usize, SerializeError> {
    let body = body.as_bytes();
    validate_body(body)?;

    let len = body.len() + FRAME_OVERHEAD;
    if buf.len() < len {
        return Err(SerializeError::BufferTooSmall);
    }

    buf[0] = b'$';
    buf[1..=body.len()].copy_from_slice(body);
    let mut pos = body.len() + 1;

    buf[pos] = b'*';
    pos += 1;
    pos += write_hex_u8(&mut buf[pos..], checksum(body));
    buf[pos] = b'\r';
    buf[pos + 1] = b'\n';

    Ok(len)
}

/// Serialize a sentence body to a `core::fmt::Write` implementation.
///
/// This can be used with types like `heapless::String`.
///
/// # Errors
///
/// Body validation fails as for [`write_sentence()`]; returns
/// [`SerializeError::WriteError`] if the write fails.
pub fn write_sentence_fmt<W: core::fmt::Write>(
    body: &str,
    writer: &mut W,
) -> Result<(), SerializeError> {
    validate_body(body.as_bytes())?;
    write!(writer, "${}*{:02X}\r\n", body, checksum(body.as_bytes()))
        .map_err(|_| SerializeError::WriteError)
}

/// Serialize a sentence body to an `embedded_io::Write` implementation.
///
/// This can be used with UART or other I/O peripherals.
///
/// # Errors
///
/// Body validation fails as for [`write_sentence()`]; returns
/// [`SerializeError::WriteError`] if the write fails.
#[cfg(feature = "embedded-io")]
pub fn write_sentence_io<W: embedded_io::Write>(
    body: &str,
    writer: &mut W,
) -> Result<(), SerializeError> {
    let mut buf = [0u8; MAX_FRAME_SIZE];
    let len = write_sentence(body, &mut buf)?;
    writer
        .write_all(&buf[..len])
        .map_err(|_| SerializeError::WriteError)
}

fn validate_body(body: &[u8]) -> Result<(), SerializeError> {
    let valid = body
        .iter()
        .all(|&b| (0x20..=0x7E).contains(&b) && b != b'$' && b != b'*');
    if body.is_empty() || !valid {
        return Err(SerializeError::InvalidBody);
    }
    if body.len() > MAX_BODY_LENGTH {
        return Err(SerializeError::BodyTooLong);
    }
    Ok(())
}
