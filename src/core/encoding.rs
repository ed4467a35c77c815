//! Windows-1252 ("WinAnsiEncoding") text for the standard Type 1 fonts.
//!
//! Latin-1 printable characters map to themselves; the 27 printable
//! characters Windows-1252 places in 0x80..=0x9F map to their slots. Anything
//! else, control characters included, is rejected rather than substituted.

use crate::utils::error::RenderError;

const HIGH_CONTROL_SLOTS: [(u8, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

fn encode_char(character: char) -> Option<u8> {
    match u32::from(character) {
        code @ 0x20..=0x7E | code @ 0xA0..=0xFF => u8::try_from(code).ok(),
        _ => HIGH_CONTROL_SLOTS
            .iter()
            .find(|(_, mapped)| *mapped == character)
            .map(|(byte, _)| *byte),
    }
}

fn decode_byte(byte: u8) -> char {
    HIGH_CONTROL_SLOTS
        .iter()
        .find(|(slot, _)| *slot == byte)
        .map(|(_, character)| *character)
        .unwrap_or(char::from(byte))
}

/// Text already validated and encoded for the output fonts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinAnsiText {
    bytes: Vec<u8>,
}

impl WinAnsiText {
    /// Encodes `text`, reporting the first unsupported character together
    /// with `field` and its character index.
    pub fn encode(field: &str, text: &str) -> Result<Self, RenderError> {
        let mut bytes = Vec::with_capacity(text.len());
        for (position, character) in text.chars().enumerate() {
            let byte = encode_char(character).ok_or_else(|| RenderError::Encoding {
                field: field.to_string(),
                character,
                position,
            })?;
            bytes.push(byte);
        }
        Ok(Self { bytes })
    }

    /// `label` followed by `value`; error positions refer to `value`.
    pub fn labeled(label: &str, field: &str, value: &str) -> Result<Self, RenderError> {
        let value = Self::encode(field, value)?;
        let mut text = Self::encode("label", label)?;
        text.bytes.extend_from_slice(&value.bytes);
        Ok(text)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Inverse of the encoding, for reading text back out of a content stream.
pub fn decode_win_ansi(bytes: &[u8]) -> String {
    bytes.iter().copied().map(decode_byte).collect()
}
