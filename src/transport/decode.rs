//! Decoding pipeline for SQL API response bodies.
//!
//! Every response body passes through the same fixed sequence of steps
//! before any component looks at its content:
//!
//! 1. reject empty bodies
//! 2. decompress when `content-encoding` declares gzip, falling back to raw
//!    DEFLATE when the stream turns out not to be a gzip stream
//! 3. strip stray ASCII control bytes (observed on the wire, and fatal to
//!    strict JSON parsers)
//! 4. parse JSON, keeping wide integers exact rather than rounding them
//!    through f64 (serde_json's `arbitrary_precision` representation)
//! 5. require the payload to be a JSON object
//! 6. map HTTP statuses >= 400 to a remote error carrying the payload's
//!    `message` field
//!
//! The decoder classifies errors; it never interprets statement semantics.

use crate::error::DecodeError;
use flate2::read::{DeflateDecoder, GzDecoder};
use std::io::Read;
use tracing::warn;

/// Decode a raw response body into a JSON object.
///
/// # Arguments
/// * `body` - The raw response bytes as received
/// * `content_encoding` - The `content-encoding` header value, if any
/// * `status` - The HTTP status code of the response
///
/// # Errors
/// [`DecodeError::EmptyResponse`] for an absent body,
/// [`DecodeError::MalformedResponse`] for undecodable or non-object payloads,
/// [`DecodeError::Remote`] for HTTP statuses >= 400.
pub fn decode_response(
    body: &[u8],
    content_encoding: Option<&str>,
    status: u16,
) -> Result<serde_json::Map<String, serde_json::Value>, DecodeError> {
    if body.is_empty() {
        return Err(DecodeError::EmptyResponse);
    }

    let bytes = if declares_gzip(content_encoding) {
        decompress(body)?
    } else {
        body.to_vec()
    };

    let cleaned = strip_control_bytes(&bytes);

    let parsed: serde_json::Value = serde_json::from_slice(&cleaned)?;
    let payload = match parsed {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(DecodeError::MalformedResponse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    if status >= 400 {
        let message = payload
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("no error message provided by server")
            .to_string();
        return Err(DecodeError::Remote { status, message });
    }

    Ok(payload)
}

/// Whether the `content-encoding` header declares a gzip body.
fn declares_gzip(content_encoding: Option<&str>) -> bool {
    content_encoding
        .map(|v| v.to_ascii_lowercase().contains("gzip"))
        .unwrap_or(false)
}

/// Decompress a gzip body, retrying as raw DEFLATE when the gzip framing is
/// absent.
fn decompress(body: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::new();
    match GzDecoder::new(body).read_to_end(&mut out) {
        Ok(_) => Ok(out),
        Err(gzip_err) => {
            warn!(
                error = %gzip_err,
                "gzip decompression failed; retrying as raw deflate"
            );
            out.clear();
            DeflateDecoder::new(body)
                .read_to_end(&mut out)
                .map_err(|deflate_err| {
                    DecodeError::MalformedResponse(format!(
                        "body declared gzip but could not be decompressed \
                         (gzip: {gzip_err}; deflate: {deflate_err})"
                    ))
                })?;
            Ok(out)
        }
    }
}

/// Remove ASCII control bytes (0x00-0x1F, 0x7F) from the payload.
///
/// Multi-byte UTF-8 sequences are untouched since all their bytes are
/// >= 0x80.
fn strip_control_bytes(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .copied()
        .filter(|b| *b >= 0x20 && *b != 0x7F)
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
