//! Wire protocol: the byte codec, field blocks, PDU family, sequence
//! source, and payload segmentation.

pub mod buffer;
pub mod fields;
pub mod pdu;
pub mod segmentation;
pub mod sequence;

pub use buffer::{BufferError, SmppBuffer};
pub use pdu::{decode_frame, CommandId, CommandStatus, DecodeOutcome, Encodable, Header, Introspectable, Pdu};
pub use segmentation::{split_message_on_parts, split_with_concatenation};
pub use sequence::SequenceGenerator;
