//! Character set conversion between message text and wire bytes.
//!
//! SMPP text fields carry an 8-bit `data_coding` selector that names the
//! character set of the accompanying bytes. This module owns the selector
//! enum and the conversion in both directions; the byte codec delegates
//! its encoded-string operations here.

pub mod gsm7;

use serde::{Deserialize, Serialize};

/// Wire values of the `data_coding` field this client understands.
///
/// Several selectors are byte-identical on the wire and differ only in
/// handset semantics: the two Latin-1 variants, the two UCS-2 variants
/// (plain and flash), and the two raw-octet variants.
///
/// [`DataCoding::Default`] is not a character set: it means "whatever the
/// connection agreed on" and must be resolved against a configured
/// fallback before any conversion happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DataCoding {
    /// Resolved to the connection-level fallback coding.
    Default = 0x00,
    /// GSM 7-bit default alphabet with escape extension, one code per byte.
    Ascii = 0x01,
    /// Raw 8-bit octets.
    Octets = 0x02,
    /// ISO-8859-1.
    Latin1 = 0x03,
    /// Raw 8-bit octets, alternative selector.
    OctetUnspecified = 0x04,
    /// UCS-2, big-endian.
    Ucs2 = 0x08,
    /// ISO-8859-1, message-class-bearing variant. Same bytes as [`DataCoding::Latin1`].
    Latin1Escape = 0x13,
    /// UCS-2 flash message. Same bytes as [`DataCoding::Ucs2`].
    UnicodeFlash = 0x18,
}

impl DataCoding {
    /// Parses a wire byte into a selector.
    pub fn from_byte(value: u8) -> Option<DataCoding> {
        match value {
            0x00 => Some(DataCoding::Default),
            0x01 => Some(DataCoding::Ascii),
            0x02 => Some(DataCoding::Octets),
            0x03 => Some(DataCoding::Latin1),
            0x04 => Some(DataCoding::OctetUnspecified),
            0x08 => Some(DataCoding::Ucs2),
            0x13 => Some(DataCoding::Latin1Escape),
            0x18 => Some(DataCoding::UnicodeFlash),
            _ => None,
        }
    }

    /// Replaces [`DataCoding::Default`] with the configured fallback.
    pub fn resolve(self, fallback: DataCoding) -> DataCoding {
        if self == DataCoding::Default {
            fallback
        } else {
            self
        }
    }

    /// Whether this selector names a text coding the client can convert.
    pub fn is_supported_text(self) -> bool {
        matches!(
            self,
            DataCoding::Default
                | DataCoding::Ascii
                | DataCoding::Octets
                | DataCoding::Latin1
                | DataCoding::OctetUnspecified
                | DataCoding::Ucs2
                | DataCoding::Latin1Escape
                | DataCoding::UnicodeFlash
        )
    }
}

/// Encodes a string into the bytes of the given character set.
///
/// `coding` must already be resolved; an unresolved [`DataCoding::Default`]
/// encodes nothing.
pub fn encode_string(value: &str, coding: DataCoding) -> Vec<u8> {
    match coding {
        DataCoding::Ucs2 | DataCoding::UnicodeFlash => value
            .encode_utf16()
            .flat_map(|unit| unit.to_be_bytes())
            .collect(),
        DataCoding::Octets | DataCoding::OctetUnspecified => value.as_bytes().to_vec(),
        DataCoding::Latin1 | DataCoding::Latin1Escape => value
            .chars()
            .map(|c| if (c as u32) <= 0xFF { c as u32 as u8 } else { b'?' })
            .collect(),
        DataCoding::Ascii => gsm7::encode(value),
        DataCoding::Default => Vec::new(),
    }
}

/// Decodes character set bytes back into a string.
///
/// Mirrors [`encode_string`]; an unresolved [`DataCoding::Default`]
/// decodes to the empty string.
pub fn decode_bytes(bytes: &[u8], coding: DataCoding) -> String {
    match coding {
        DataCoding::Ucs2 | DataCoding::UnicodeFlash => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        DataCoding::Octets | DataCoding::OctetUnspecified => {
            String::from_utf8_lossy(bytes).into_owned()
        }
        DataCoding::Latin1 | DataCoding::Latin1Escape => {
            bytes.iter().map(|&b| b as char).collect()
        }
        DataCoding::Ascii => gsm7::decode(bytes),
        DataCoding::Default => String::new(),
    }
}
