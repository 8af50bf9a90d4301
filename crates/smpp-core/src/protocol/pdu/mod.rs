//! PDU type family: the common header plus one struct per operation,
//! gathered into the closed [`Pdu`] enum.
//!
//! Every variant follows the same contract: build from explicit fields
//! (requests draw a fresh sequence from an injected
//! [`crate::protocol::sequence::SequenceGenerator`], responses echo
//! one), or build by decoding `(buffer, cursor)` where any fault yields
//! `None`. [`Encodable::encode`] always produces a complete PDU with the
//! length prefix in place; [`Introspectable::details`] re-walks the
//! captured raw span and yields an empty list rather than failing.
//!
//! [`decode_frame`] is the stream-facing entry: it classifies the bytes
//! at the cursor as a complete PDU, an incomplete frame, or an
//! unrecognized one, keeping the caller's framing loop alive either way.

mod bind;
mod deliver_sm;
mod enquire_link;
mod generic_nack;
mod header;
mod query_sm;
mod submit_sm;
mod unbind;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use bind::{BindSm, BindSmResp, INTERFACE_VERSION};
pub use deliver_sm::{DeliverSm, DeliverSmResp};
pub use enquire_link::{EnquireLinkSm, EnquireLinkSmResp};
pub use generic_nack::GenericNackSm;
pub use header::Header;
pub use query_sm::{message_state, QuerySm, QuerySmResp};
pub use submit_sm::{SubmitSm, SubmitSmResp};
pub use unbind::{UnbindSm, UnbindSmResp};

use crate::protocol::buffer::{BufferError, SmppBuffer};
use crate::protocol::fields::PduPropertyDetail;

/// esm_class bit announcing a user data header inside the short message.
pub const ESM_CLASS_UDHI: u8 = 0x40;

// ── Command identifiers ───────────────────────────────────────────────────────

/// The operations this client implements, with their wire values.
/// A response id is its request id with the high bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum CommandId {
    GenericNack = 0x8000_0000,
    BindReceiver = 0x0000_0001,
    BindReceiverResp = 0x8000_0001,
    BindTransmitter = 0x0000_0002,
    BindTransmitterResp = 0x8000_0002,
    QuerySm = 0x0000_0003,
    QuerySmResp = 0x8000_0003,
    SubmitSm = 0x0000_0004,
    SubmitSmResp = 0x8000_0004,
    DeliverSm = 0x0000_0005,
    DeliverSmResp = 0x8000_0005,
    Unbind = 0x0000_0006,
    UnbindResp = 0x8000_0006,
    BindTransceiver = 0x0000_0009,
    BindTransceiverResp = 0x8000_0009,
    EnquireLink = 0x0000_0015,
    EnquireLinkResp = 0x8000_0015,
}

impl TryFrom<u32> for CommandId {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, ()> {
        match value {
            0x8000_0000 => Ok(CommandId::GenericNack),
            0x0000_0001 => Ok(CommandId::BindReceiver),
            0x8000_0001 => Ok(CommandId::BindReceiverResp),
            0x0000_0002 => Ok(CommandId::BindTransmitter),
            0x8000_0002 => Ok(CommandId::BindTransmitterResp),
            0x0000_0003 => Ok(CommandId::QuerySm),
            0x8000_0003 => Ok(CommandId::QuerySmResp),
            0x0000_0004 => Ok(CommandId::SubmitSm),
            0x8000_0004 => Ok(CommandId::SubmitSmResp),
            0x0000_0005 => Ok(CommandId::DeliverSm),
            0x8000_0005 => Ok(CommandId::DeliverSmResp),
            0x0000_0006 => Ok(CommandId::Unbind),
            0x8000_0006 => Ok(CommandId::UnbindResp),
            0x0000_0009 => Ok(CommandId::BindTransceiver),
            0x8000_0009 => Ok(CommandId::BindTransceiverResp),
            0x0000_0015 => Ok(CommandId::EnquireLink),
            0x8000_0015 => Ok(CommandId::EnquireLinkResp),
            _ => Err(()),
        }
    }
}

// ── Command status ────────────────────────────────────────────────────────────

/// Result code carried in every header: 0 for success (and on all
/// requests), an error code otherwise.
///
/// Kept as a transparent wrapper rather than an enum: peers may send any
/// value and header decode must not fail on codes this client has no
/// name for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandStatus(pub u32);

impl CommandStatus {
    pub const OK: CommandStatus = CommandStatus(0x0000_0000);
    pub const INVALID_MESSAGE_LENGTH: CommandStatus = CommandStatus(0x0000_0001);
    pub const INVALID_COMMAND_LENGTH: CommandStatus = CommandStatus(0x0000_0002);
    pub const INVALID_COMMAND_ID: CommandStatus = CommandStatus(0x0000_0003);
    pub const INVALID_BIND_STATUS: CommandStatus = CommandStatus(0x0000_0004);
    pub const ALREADY_BOUND: CommandStatus = CommandStatus(0x0000_0005);
    pub const SYSTEM_ERROR: CommandStatus = CommandStatus(0x0000_0008);
    pub const INVALID_SOURCE_ADDRESS: CommandStatus = CommandStatus(0x0000_000A);
    pub const INVALID_DEST_ADDRESS: CommandStatus = CommandStatus(0x0000_000B);
    pub const INVALID_MESSAGE_ID: CommandStatus = CommandStatus(0x0000_000C);
    pub const BIND_FAILED: CommandStatus = CommandStatus(0x0000_000D);
    pub const INVALID_PASSWORD: CommandStatus = CommandStatus(0x0000_000E);
    pub const INVALID_SYSTEM_ID: CommandStatus = CommandStatus(0x0000_000F);
    pub const MESSAGE_QUEUE_FULL: CommandStatus = CommandStatus(0x0000_0014);
    pub const THROTTLED: CommandStatus = CommandStatus(0x0000_0058);
    pub const UNKNOWN_ERROR: CommandStatus = CommandStatus(0x0000_00FF);

    pub fn is_ok(self) -> bool {
        self == Self::OK
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::OK => write!(f, "ok"),
            Self::INVALID_MESSAGE_LENGTH => write!(f, "invalid message length"),
            Self::INVALID_COMMAND_LENGTH => write!(f, "invalid command length"),
            Self::INVALID_COMMAND_ID => write!(f, "invalid command id"),
            Self::INVALID_BIND_STATUS => write!(f, "invalid bind status"),
            Self::ALREADY_BOUND => write!(f, "already bound"),
            Self::SYSTEM_ERROR => write!(f, "system error"),
            Self::INVALID_SOURCE_ADDRESS => write!(f, "invalid source address"),
            Self::INVALID_DEST_ADDRESS => write!(f, "invalid destination address"),
            Self::INVALID_MESSAGE_ID => write!(f, "invalid message id"),
            Self::BIND_FAILED => write!(f, "bind failed"),
            Self::INVALID_PASSWORD => write!(f, "invalid password"),
            Self::INVALID_SYSTEM_ID => write!(f, "invalid system id"),
            Self::MESSAGE_QUEUE_FULL => write!(f, "message queue full"),
            Self::THROTTLED => write!(f, "throttled"),
            Self::UNKNOWN_ERROR => write!(f, "unknown error"),
            Self(other) => write!(f, "status 0x{other:08X}"),
        }
    }
}

// ── Capabilities ──────────────────────────────────────────────────────────────

/// Serialization to transmittable bytes.
pub trait Encodable {
    /// Builds the complete PDU, length prefix included.
    fn encode(&self) -> Result<Vec<u8>, BufferError>;
}

/// Field-level introspection for diagnostics and logging.
pub trait Introspectable {
    /// An ordered walk of the PDU's own captured bytes; empty when the
    /// PDU was never materialized or its span does not parse.
    fn details(&self) -> Vec<PduPropertyDetail>;
}

// ── The closed variant family ─────────────────────────────────────────────────

/// One decoded PDU of any recognized kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pdu {
    Bind(BindSm),
    BindResp(BindSmResp),
    Unbind(UnbindSm),
    UnbindResp(UnbindSmResp),
    EnquireLink(EnquireLinkSm),
    EnquireLinkResp(EnquireLinkSmResp),
    GenericNack(GenericNackSm),
    SubmitSm(SubmitSm),
    SubmitSmResp(SubmitSmResp),
    DeliverSm(DeliverSm),
    DeliverSmResp(DeliverSmResp),
    QuerySm(QuerySm),
    QuerySmResp(QuerySmResp),
}

impl Pdu {
    /// The shared header of whichever variant this is.
    pub fn header(&self) -> &Header {
        match self {
            Pdu::Bind(p) => &p.header,
            Pdu::BindResp(p) => &p.header,
            Pdu::Unbind(p) => &p.header,
            Pdu::UnbindResp(p) => &p.header,
            Pdu::EnquireLink(p) => &p.header,
            Pdu::EnquireLinkResp(p) => &p.header,
            Pdu::GenericNack(p) => &p.header,
            Pdu::SubmitSm(p) => &p.header,
            Pdu::SubmitSmResp(p) => &p.header,
            Pdu::DeliverSm(p) => &p.header,
            Pdu::DeliverSmResp(p) => &p.header,
            Pdu::QuerySm(p) => &p.header,
            Pdu::QuerySmResp(p) => &p.header,
        }
    }

    pub fn command(&self) -> CommandId {
        self.header().command
    }

    pub fn sequence(&self) -> u32 {
        self.header().sequence
    }
}

impl Encodable for Pdu {
    fn encode(&self) -> Result<Vec<u8>, BufferError> {
        match self {
            Pdu::Bind(p) => p.encode(),
            Pdu::BindResp(p) => p.encode(),
            Pdu::Unbind(p) => p.encode(),
            Pdu::UnbindResp(p) => p.encode(),
            Pdu::EnquireLink(p) => p.encode(),
            Pdu::EnquireLinkResp(p) => p.encode(),
            Pdu::GenericNack(p) => p.encode(),
            Pdu::SubmitSm(p) => p.encode(),
            Pdu::SubmitSmResp(p) => p.encode(),
            Pdu::DeliverSm(p) => p.encode(),
            Pdu::DeliverSmResp(p) => p.encode(),
            Pdu::QuerySm(p) => p.encode(),
            Pdu::QuerySmResp(p) => p.encode(),
        }
    }
}

impl Introspectable for Pdu {
    fn details(&self) -> Vec<PduPropertyDetail> {
        match self {
            Pdu::Bind(p) => p.details(),
            Pdu::BindResp(p) => p.details(),
            Pdu::Unbind(p) => p.details(),
            Pdu::UnbindResp(p) => p.details(),
            Pdu::EnquireLink(p) => p.details(),
            Pdu::EnquireLinkResp(p) => p.details(),
            Pdu::GenericNack(p) => p.details(),
            Pdu::SubmitSm(p) => p.details(),
            Pdu::SubmitSmResp(p) => p.details(),
            Pdu::DeliverSm(p) => p.details(),
            Pdu::DeliverSmResp(p) => p.details(),
            Pdu::QuerySm(p) => p.details(),
            Pdu::QuerySmResp(p) => p.details(),
        }
    }
}

// ── Stream framing entry ──────────────────────────────────────────────────────

/// Outcome of decoding one frame from a receive buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// A complete, recognized PDU; the cursor advanced past it.
    Pdu(Pdu),
    /// The length prefix framed a PDU this client cannot decode: an
    /// unknown command or a variant whose body did not parse. The cursor
    /// is unmoved; skip `length` bytes and resume reading.
    ///
    /// A `length` below 16 means the stream itself is desynchronized and
    /// skipping is no longer trustworthy.
    Unrecognized {
        length: u32,
        command: u32,
        sequence: u32,
    },
    /// Fewer bytes available than one header, or than the declared
    /// length. The cursor is unmoved; read more and retry.
    Incomplete,
}

/// Decodes one PDU from `buf` at `cursor`.
///
/// On success the cursor advances by exactly the declared PDU length.
/// The length prefix is trusted even when the variant decode fails, so a
/// framing loop can always make progress on a live stream.
pub fn decode_frame(buf: &SmppBuffer, cursor: &mut usize) -> DecodeOutcome {
    let start = *cursor;
    let mut peek = start;

    let (Ok(length), Ok(raw_command)) = (buf.extract_u32(&mut peek), buf.extract_u32(&mut peek))
    else {
        return DecodeOutcome::Incomplete;
    };
    let (Ok(_status), Ok(sequence)) = (buf.extract_u32(&mut peek), buf.extract_u32(&mut peek))
    else {
        return DecodeOutcome::Incomplete;
    };

    let unrecognized = DecodeOutcome::Unrecognized {
        length,
        command: raw_command,
        sequence,
    };

    if (length as usize) < Header::SIZE {
        warn!(length, command = raw_command, "frame length below header size");
        return unrecognized;
    }
    if buf.len() - start < length as usize {
        return DecodeOutcome::Incomplete;
    }

    let Ok(command) = CommandId::try_from(raw_command) else {
        warn!(command = raw_command, sequence, "unrecognized command id");
        return unrecognized;
    };

    let mut local = start;
    let decoded = match command {
        CommandId::BindTransmitter | CommandId::BindReceiver | CommandId::BindTransceiver => {
            BindSm::decode(buf, &mut local).map(Pdu::Bind)
        }
        CommandId::BindTransmitterResp
        | CommandId::BindReceiverResp
        | CommandId::BindTransceiverResp => BindSmResp::decode(buf, &mut local).map(Pdu::BindResp),
        CommandId::Unbind => UnbindSm::decode(buf, &mut local).map(Pdu::Unbind),
        CommandId::UnbindResp => UnbindSmResp::decode(buf, &mut local).map(Pdu::UnbindResp),
        CommandId::EnquireLink => EnquireLinkSm::decode(buf, &mut local).map(Pdu::EnquireLink),
        CommandId::EnquireLinkResp => {
            EnquireLinkSmResp::decode(buf, &mut local).map(Pdu::EnquireLinkResp)
        }
        CommandId::GenericNack => GenericNackSm::decode(buf, &mut local).map(Pdu::GenericNack),
        CommandId::SubmitSm => SubmitSm::decode(buf, &mut local).map(Pdu::SubmitSm),
        CommandId::SubmitSmResp => SubmitSmResp::decode(buf, &mut local).map(Pdu::SubmitSmResp),
        CommandId::DeliverSm => DeliverSm::decode(buf, &mut local).map(Pdu::DeliverSm),
        CommandId::DeliverSmResp => DeliverSmResp::decode(buf, &mut local).map(Pdu::DeliverSmResp),
        CommandId::QuerySm => QuerySm::decode(buf, &mut local).map(Pdu::QuerySm),
        CommandId::QuerySmResp => QuerySmResp::decode(buf, &mut local).map(Pdu::QuerySmResp),
    };

    match decoded {
        Some(pdu) => {
            *cursor = start + length as usize;
            DecodeOutcome::Pdu(pdu)
        }
        None => {
            warn!(command = raw_command, sequence, length, "PDU body failed to decode");
            unrecognized
        }
    }
}
