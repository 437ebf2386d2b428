//! Shift_JIS encoding utilities for bank file imports
//!
//! Japanese bank transfer imports expect Shift_JIS (CP932 repertoire), not
//! UTF-8. This module provides:
//! - A [`LegacyEncoder`] seam so the rest of the stack works in `str`
//! - Strict UTF-8 → Shift_JIS conversion (no replacement characters)

use tracing::instrument;

use crate::error::{ExportError, ExportResult};

/// Transcoder from UTF-8 text to a legacy byte encoding
///
/// Implementations must fail on characters outside their repertoire rather
/// than substituting.
pub trait LegacyEncoder {
    /// Encoding label, as used in `Content-Type` charset
    fn name(&self) -> &'static str;

    /// Encode `text`, failing on the first unmappable character
    fn encode(&self, text: &str) -> ExportResult<Vec<u8>>;
}

/// WHATWG Shift_JIS (CP932 repertoire) via encoding_rs
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftJisEncoder;

impl LegacyEncoder for ShiftJisEncoder {
    fn name(&self) -> &'static str {
        "Shift_JIS"
    }

    #[instrument(level = "trace", skip(self, text))]
    fn encode(&self, text: &str) -> ExportResult<Vec<u8>> {
        let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode(text);
        if !had_errors {
            return Ok(bytes.into_owned());
        }

        // encoding_rs substitutes numeric character references; locate the
        // first offending character so the caller can report it
        let character = text
            .chars()
            .find(|c| {
                let mut tmp = [0u8; 4];
                let (_, _, err) = encoding_rs::SHIFT_JIS.encode(c.encode_utf8(&mut tmp));
                err
            })
            .unwrap_or(char::REPLACEMENT_CHARACTER);

        tracing::debug!(character = %character, "Unencodable character for Shift_JIS");
        Err(ExportError::Unencodable {
            character,
            codepoint: character as u32,
            encoding: self.name(),
        })
    }
}
