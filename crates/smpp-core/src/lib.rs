//! # smpp-core
//!
//! Wire protocol core for an SMPP 3.4 client: the binary PDU codec,
//! the protocol data model, character set conversion, message
//! segmentation, sequence numbering, and the keep-alive timer primitive.
//!
//! This crate is the shared foundation under a messaging gateway client.
//! It has no dependency on sockets or any I/O: the connection layer feeds
//! received bytes into [`protocol::pdu::decode_frame`] and writes out the
//! bytes produced by [`protocol::pdu::Encodable::encode`]. Everything
//! here is synchronous; the one thread the crate ever creates is the
//! worker inside [`timer::SynchronousTimer`].
//!
//! The crate defines:
//!
//! - **`protocol`** – how bytes travel over the session. PDUs are a
//!   16-byte big-endian header plus per-command fields, built and parsed
//!   by [`protocol::buffer::SmppBuffer`] and typed by the closed
//!   [`protocol::pdu::Pdu`] family.
//!
//! - **`charset`** – conversion between message text and the character
//!   sets a message center understands, including the GSM 7-bit default
//!   alphabet and its escape extension.
//!
//! - **`timer`** – the periodic worker that keeps a bound session alive
//!   by scheduling keep-alive probes.

pub mod charset;
pub mod protocol;
pub mod timer;

pub use charset::DataCoding;
pub use protocol::buffer::{BufferError, SmppBuffer};
pub use protocol::pdu::{
    decode_frame, CommandId, CommandStatus, DecodeOutcome, Encodable, Introspectable, Pdu,
};
pub use protocol::sequence::SequenceGenerator;
pub use timer::SynchronousTimer;
