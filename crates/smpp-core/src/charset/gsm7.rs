//! GSM 03.38 "7-bit default alphabet" translation tables.
//!
//! This is the character set used when a message is submitted with the
//! IA5/ASCII data coding. Each character occupies one byte on the wire
//! (the packing into septets happens elsewhere, if at all; SMPP carries
//! the alphabet unpacked), except for the *extension page*: those
//! characters are emitted as the escape byte [`ESCAPE`] followed by the
//! extension code.
//!
//! # Lossy reverse mapping
//!
//! The alphabet has fewer code points than ISO-8859-1, so a handful of
//! accented vowels share a code with their canonical sibling:
//!
//! | Input | Code | Decodes back as |
//! |-------|------|-----------------|
//! | `ì`, `í` | 7   | `ì` |
//! | `ò`, `ó` | 8   | `ò` |
//! | `à`, `á` | 127 | `à` |
//!
//! Encoding and then decoding one of the non-canonical characters yields
//! the canonical one. This is a property of the character set itself and
//! is relied upon by deployed gateways and must not be "corrected".

/// Escape byte introducing an extension-page code.
pub const ESCAPE: u8 = 0x1B;

/// Converts one character to its alphabet code.
///
/// Returns `(code, escaped)`; when `escaped` is true the code is on the
/// extension page and must be preceded by [`ESCAPE`] on the wire.
/// Characters without a dedicated slot fall through to their low byte,
/// which covers the ASCII range shared verbatim with the alphabet.
fn char_to_gsm(c: char) -> (u8, bool) {
    match c {
        '@' => (0, false),
        '£' => (1, false),
        '$' => (2, false),
        '¥' => (3, false),
        'è' => (4, false),
        'é' => (5, false),
        'ú' => (6, false),
        'ì' | 'í' => (7, false),
        'ò' | 'ó' => (8, false),
        'Ç' => (9, false),
        'Ø' => (11, false),
        'ø' => (12, false),
        'Å' => (14, false),
        'å' => (15, false),
        '_' => (17, false),
        'Æ' => (28, false),
        'æ' => (29, false),
        'ß' => (30, false),
        'É' => (31, false),
        '¤' => (36, false), // 164 in ISO-8859-1
        '¡' => (64, false),
        // 65-90 capital letters, 97-122 small letters: identity fallthrough
        'Ä' => (91, false),
        'Ö' => (92, false),
        'Ñ' => (93, false),
        'Ü' => (94, false),
        '§' => (95, false),
        '¿' => (96, false),
        'ä' => (123, false),
        'ö' => (124, false),
        'ñ' => (125, false),
        'ü' => (126, false),
        'à' | 'á' => (127, false),

        // Extension page
        '\u{0C}' => (10, true), // form feed
        '^' => (20, true),
        '{' => (40, true),
        '}' => (41, true),
        '\\' => (47, true),
        '[' => (60, true),
        '~' => (61, true),
        ']' => (62, true),
        '|' => (64, true),
        '€' => (101, true), // 164 in ISO-8859-15

        _ => (c as u32 as u8, false),
    }
}

/// Converts one alphabet code back to a character using the base table.
fn gsm_to_char(byte: u8) -> char {
    match byte {
        0 => '@',
        1 => '£',
        2 => '$',
        3 => '¥',
        4 => 'è',
        5 => 'é',
        6 => 'ú',
        7 => 'ì',
        8 => 'ò',
        9 => 'Ç',
        11 => 'Ø',
        12 => 'ø',
        14 => 'Å',
        15 => 'å',
        17 => '_',
        28 => 'Æ',
        29 => 'æ',
        30 => 'ß',
        31 => 'É',
        36 => '¤', // 164 in ISO-8859-1
        64 => '¡',
        91 => 'Ä',
        92 => 'Ö',
        93 => 'Ñ',
        94 => 'Ü',
        95 => '§',
        96 => '¿',
        123 => 'ä',
        124 => 'ö',
        125 => 'ñ',
        126 => 'ü',
        127 => 'à',
        other => other as char,
    }
}

/// Converts one extension-page code back to a character.
///
/// Codes with no extension assignment decode to the NUL placeholder.
fn gsm_ext_to_char(byte: u8) -> char {
    match byte {
        10 => '\u{0C}', // form feed
        20 => '^',
        40 => '{',
        41 => '}',
        47 => '\\',
        60 => '[',
        61 => '~',
        62 => ']',
        64 => '|',
        101 => '€', // 164 in ISO-8859-15
        _ => '\0',
    }
}

/// Encodes a string into alphabet bytes.
///
/// Extension-page characters occupy two bytes, so the output may be
/// longer than the character count of the input.
pub fn encode(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for c in value.chars() {
        let (code, escaped) = char_to_gsm(c);
        if escaped {
            out.push(ESCAPE);
        }
        out.push(code);
    }
    out
}

/// Decodes alphabet bytes into a string.
///
/// The escape byte itself never appears in the output; the byte that
/// follows it is looked up on the extension page.
pub fn decode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut prev = 0u8;
    for &b in bytes {
        if b != ESCAPE {
            if prev == ESCAPE {
                out.push(gsm_ext_to_char(b));
            } else {
                out.push(gsm_to_char(b));
            }
        }
        prev = b;
    }
    out
}
