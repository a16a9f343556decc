//! The frame codec: a list of strings in, a length-prefixed byte frame out.
//!
//! Every packet on the wire looks like this:
//!
//! ```text
//! +------------------+----------------+----------------+-----+
//! | length (2 bytes) | field 0 \0     | field 1 \0     | ... |
//! | u16 big-endian   | UTF-8 bytes    | UTF-8 bytes    |     |
//! +------------------+----------------+----------------+-----+
//! ```
//!
//! The length prefix counts the **whole** frame, header included, so the
//! smallest legal frame is 2 bytes long and carries zero fields. Each field
//! is terminated by a single NUL byte; fields therefore cannot contain NUL
//! themselves.
//!
//! The codec is a pure transform. It knows nothing about sockets (that is
//! the [`Deserializer`](crate::Deserializer)'s job) or about what the
//! strings mean (that is the session's job).

use crate::ProtocolError;

/// Size of the length prefix in bytes.
pub const HEADER_LEN: usize = 2;

/// Largest frame the 16-bit length prefix can describe.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Encodes `fields` into a single frame, header included.
///
/// # Errors
/// Returns [`ProtocolError::Encode`] if a field contains a NUL byte or the
/// encoded frame would exceed [`MAX_FRAME_LEN`].
pub fn encode_frame<S: AsRef<str>>(fields: &[S]) -> Result<Vec<u8>, ProtocolError> {
    let body_len: usize = fields.iter().map(|f| f.as_ref().len() + 1).sum();
    let total = HEADER_LEN + body_len;
    if total > MAX_FRAME_LEN {
        return Err(ProtocolError::Encode(format!(
            "frame of {total} bytes exceeds the {MAX_FRAME_LEN} byte limit"
        )));
    }

    let mut frame = Vec::with_capacity(total);
    // Checked just above, the cast cannot truncate.
    frame.extend_from_slice(&(total as u16).to_be_bytes());
    for field in fields {
        let field = field.as_ref();
        if field.contains('\0') {
            return Err(ProtocolError::Encode(format!(
                "field {field:?} contains a NUL byte"
            )));
        }
        frame.extend_from_slice(field.as_bytes());
        frame.push(0);
    }
    Ok(frame)
}

/// Reads the declared frame length from the start of `buf`.
///
/// Returns `None` if fewer than [`HEADER_LEN`] bytes are available.
pub fn peek_frame_len(buf: &[u8]) -> Option<usize> {
    match buf {
        [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo]) as usize),
        _ => None,
    }
}

/// Decodes one complete frame (header included) back into its fields.
///
/// # Errors
/// Returns [`ProtocolError::MalformedPacket`] if the declared length does
/// not match `frame`, a field is not NUL-terminated before the frame ends,
/// or a field is not valid UTF-8.
pub fn decode_frame(frame: &[u8]) -> Result<Vec<String>, ProtocolError> {
    let declared = peek_frame_len(frame).ok_or_else(|| {
        ProtocolError::MalformedPacket("frame shorter than its header".into())
    })?;
    if declared < HEADER_LEN {
        return Err(ProtocolError::MalformedPacket(format!(
            "declared length {declared} is smaller than the header"
        )));
    }
    if declared != frame.len() {
        return Err(ProtocolError::MalformedPacket(format!(
            "declared length {declared} but frame holds {} bytes",
            frame.len()
        )));
    }
    decode_fields(&frame[HEADER_LEN..])
}

/// Splits a frame body into its NUL-terminated UTF-8 fields.
fn decode_fields(mut body: &[u8]) -> Result<Vec<String>, ProtocolError> {
    let mut fields = Vec::new();
    while !body.is_empty() {
        let end = body.iter().position(|&b| b == 0).ok_or_else(|| {
            ProtocolError::MalformedPacket(
                "string runs past the end of the frame".into(),
            )
        })?;
        let field = std::str::from_utf8(&body[..end]).map_err(|e| {
            ProtocolError::MalformedPacket(format!("field is not UTF-8: {e}"))
        })?;
        fields.push(field.to_owned());
        body = &body[end + 1..];
    }
    Ok(fields)
}

/// Encodes a boolean the way the metaserver expects it.
pub fn encode_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Decodes a wire boolean. Only the literal strings `"true"` and `"false"`
/// are accepted.
///
/// # Errors
/// Returns [`ProtocolError::InvalidBool`] for anything else.
pub fn decode_bool(value: &str) -> Result<bool, ProtocolError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ProtocolError::InvalidBool(other.to_owned())),
    }
}
