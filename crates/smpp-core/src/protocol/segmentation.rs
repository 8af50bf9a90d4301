//! Splitting oversized message payloads into transmittable parts.
//!
//! A part boundary must never fall between the GSM escape byte and the
//! code it introduces: the receiving handset decodes each part on its
//! own, and a split escape sequence would corrupt both halves.

use tracing::warn;

use crate::charset::gsm7::ESCAPE;
use crate::protocol::fields::UserData;
use crate::protocol::sequence::SequenceGenerator;

/// Splits `message` into chunks of at most `max_length` bytes.
///
/// A chunk that would end on the escape byte is shrunk by one so the
/// escape travels with its partner at the head of the next chunk. Only a
/// final leftover chunk may end on the escape byte. A `max_length` of 0
/// yields the whole message as a single part.
pub fn split_message_on_parts(message: &[u8], max_length: usize) -> Vec<Vec<u8>> {
    if max_length == 0 {
        return vec![message.to_vec()];
    }

    let mut parts = Vec::new();
    let mut rest = message;
    while !rest.is_empty() {
        let mut take = max_length.min(rest.len());
        if take > 1 && rest[take - 1] == ESCAPE {
            take -= 1;
        }
        parts.push(rest[..take].to_vec());
        rest = &rest[take..];
    }
    parts
}

/// Splits `message` and stamps each part with the 8-bit concatenation
/// header: a shared reference drawn from `sequencer`, the total part
/// count, and the part's 1-based position.
///
/// A message that fits in one part is returned without any header. More
/// than 255 parts cannot be described by the 8-bit element; the parts
/// are returned unstamped and the condition is logged.
pub fn split_with_concatenation(
    message: &[u8],
    max_length: usize,
    sequencer: &SequenceGenerator,
) -> Vec<UserData> {
    let parts = split_message_on_parts(message, max_length);

    if parts.len() == 1 {
        return parts.into_iter().map(UserData::from_payload).collect();
    }
    if parts.len() > u8::MAX as usize {
        warn!(parts = parts.len(), "too many parts for 8-bit concatenation");
        return parts.into_iter().map(UserData::from_payload).collect();
    }

    let msg_ref = sequencer.next_reference();
    let total = parts.len() as u8;
    parts
        .into_iter()
        .enumerate()
        .map(|(index, part)| {
            let mut user_data = UserData::from_payload(part);
            user_data
                .headers
                .add_concatenated_8bit(msg_ref, total, index as u8 + 1);
            user_data
        })
        .collect()
}
