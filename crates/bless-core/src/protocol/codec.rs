// ============================================
// File: crates/bless-core/src/protocol/codec.rs
// ============================================
//! # Canonical JSON Codec
//!
//! ## Creation Reason
//! The gateway checks the heartbeat signature against the exact request
//! body bytes, and it expects those bytes in the format the browser
//! extension's serializer produces. This module is the single place that
//! produces them.
//!
//! ## Canonical Form
//! ```text
//! {"isB7SConnected": true}
//!   │               │
//!   │               └── ": " between key and value
//!   └── members in declaration order, ", " between members
//! ```
//! Non-ASCII characters are written as `\uXXXX` escapes (UTF-16 units,
//! lowercase hex).
//!
//! ## Main Functionality
//! - `to_canonical_vec` / `to_canonical_string`: encode any `Serialize`
//! - `decode_reply`: decode a gateway reply, rejecting empty documents
//!
//! ## ⚠️ Important Note for Next Developer
//! - Changing the formatter invalidates every heartbeat signature
//! - Test vectors in `crypto::signer` pin the output
//!
//! ## Last Modified
//! v0.1.0 - Initial codec implementation

use std::io;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::Value;

use crate::error::{CoreError, Result};

// ============================================
// SpacedFormatter
// ============================================

/// `serde_json` formatter emitting `", "` and `": "` separators and
/// ASCII-only strings.
#[derive(Debug, Default, Clone, Copy)]
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

// ============================================
// Encoding
// ============================================

/// Encodes `value` in canonical form.
///
/// # Errors
/// Returns `Encoding` if `value` cannot be represented as JSON
/// (e.g. a map with non-string keys).
///
/// # Example
/// ```
/// use bless_core::protocol::{to_canonical_vec, HeartbeatPayload};
///
/// let body = to_canonical_vec(&HeartbeatPayload::CONNECTED).unwrap();
/// assert_eq!(body, br#"{"isB7SConnected": true}"#);
/// ```
pub fn to_canonical_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut out = Vec::with_capacity(64);
    let mut serializer = Serializer::with_formatter(&mut out, SpacedFormatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| CoreError::encoding("canonical json", e.to_string()))?;
    Ok(out)
}

/// Encodes `value` in canonical form as a `String`.
///
/// # Errors
/// Same as [`to_canonical_vec`].
pub fn to_canonical_string<T>(value: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let bytes = to_canonical_vec(value)?;
    // The formatter only ever writes ASCII.
    String::from_utf8(bytes).map_err(|e| CoreError::encoding("canonical json", e.to_string()))
}

// ============================================
// Decoding
// ============================================

/// Decodes a gateway reply body.
///
/// `null`, `{}`, `[]` and blank bodies are rejected with `EmptyBody`: the
/// gateway answers that way when it accepted the request but did not act
/// on it, which callers treat as a failed attempt.
///
/// # Errors
/// - `EmptyBody` for empty documents
/// - `Decoding` for malformed JSON or a shape that does not fit `T`
pub fn decode_reply<T>(context: &str, body: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(CoreError::EmptyBody);
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|e| CoreError::decoding(context, e.to_string()))?;
    let empty = match &value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if empty {
        return Err(CoreError::EmptyBody);
    }
    serde_json::from_value(value).map_err(|e| CoreError::decoding(context, e.to_string()))
}

// ============================================
// Tests
// ============================================
