//! Keep-alive probe exchanged to confirm link liveness.
//!
//! Either peer may send `enquire_link`; the other side answers with
//! `enquire_link_resp` echoing the sequence number. Both carry nothing
//! beyond the header.

use serde::{Deserialize, Serialize};

use crate::charset::DataCoding;
use crate::protocol::buffer::{BufferError, SmppBuffer};
use crate::protocol::fields::PduPropertyDetail;
use crate::protocol::pdu::{CommandId, CommandStatus, Encodable, Header, Introspectable};
use crate::protocol::sequence::SequenceGenerator;

/// Link confidence check request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnquireLinkSm {
    pub header: Header,
}

impl EnquireLinkSm {
    /// Builds an outbound probe with a fresh sequence number.
    pub fn new(default_coding: DataCoding, sequencer: &SequenceGenerator) -> Self {
        Self {
            header: Header::new(default_coding, CommandId::EnquireLink, sequencer.next_sequence()),
        }
    }

    /// Parses a probe from the wire; `None` on any fault.
    pub fn decode(buf: &SmppBuffer, cursor: &mut usize) -> Option<Self> {
        let header = buf.extract_header(cursor).ok()?;
        if header.command != CommandId::EnquireLink {
            return None;
        }
        Some(Self { header })
    }
}

impl Encodable for EnquireLinkSm {
    fn encode(&self) -> Result<Vec<u8>, BufferError> {
        let mut buf = SmppBuffer::with_header(self.header.default_coding, &self.header);
        buf.add_final_length();
        Ok(buf.into_bytes())
    }
}

impl Introspectable for EnquireLinkSm {
    fn details(&self) -> Vec<PduPropertyDetail> {
        self.header.span_details()
    }
}

/// Link confidence check answer, echoing the probe's sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnquireLinkSmResp {
    pub header: Header,
}

impl EnquireLinkSmResp {
    pub fn new(default_coding: DataCoding, status: CommandStatus, sequence: u32) -> Self {
        Self {
            header: Header::with_status(default_coding, CommandId::EnquireLinkResp, status, sequence),
        }
    }

    /// The answer to a received probe.
    pub fn reply_to(probe: &EnquireLinkSm) -> Self {
        Self::new(probe.header.default_coding, CommandStatus::OK, probe.header.sequence)
    }

    /// Parses an answer from the wire; `None` on any fault.
    pub fn decode(buf: &SmppBuffer, cursor: &mut usize) -> Option<Self> {
        let header = buf.extract_header(cursor).ok()?;
        if header.command != CommandId::EnquireLinkResp {
            return None;
        }
        Some(Self { header })
    }
}

impl Encodable for EnquireLinkSmResp {
    fn encode(&self) -> Result<Vec<u8>, BufferError> {
        let mut buf = SmppBuffer::with_header(self.header.default_coding, &self.header);
        buf.add_final_length();
        Ok(buf.into_bytes())
    }
}

impl Introspectable for EnquireLinkSmResp {
    fn details(&self) -> Vec<PduPropertyDetail> {
        self.header.span_details()
    }
}
