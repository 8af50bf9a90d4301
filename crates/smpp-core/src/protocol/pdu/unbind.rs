//! Session release: deregisters this client from the message center and
//! tells it the connection will no longer submit or receive messages.

use serde::{Deserialize, Serialize};

use crate::charset::DataCoding;
use crate::protocol::buffer::{BufferError, SmppBuffer};
use crate::protocol::fields::PduPropertyDetail;
use crate::protocol::pdu::{CommandId, CommandStatus, Encodable, Header, Introspectable};
use crate::protocol::sequence::SequenceGenerator;

/// Unbind request. Carries nothing beyond the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbindSm {
    pub header: Header,
}

impl UnbindSm {
    /// Builds an outbound unbind with a fresh sequence number.
    pub fn new(default_coding: DataCoding, sequencer: &SequenceGenerator) -> Self {
        Self {
            header: Header::new(default_coding, CommandId::Unbind, sequencer.next_sequence()),
        }
    }

    /// Parses an unbind from the wire; `None` on any fault.
    pub fn decode(buf: &SmppBuffer, cursor: &mut usize) -> Option<Self> {
        let header = buf.extract_header(cursor).ok()?;
        if header.command != CommandId::Unbind {
            return None;
        }
        Some(Self { header })
    }
}

impl Encodable for UnbindSm {
    fn encode(&self) -> Result<Vec<u8>, BufferError> {
        let mut buf = SmppBuffer::with_header(self.header.default_coding, &self.header);
        buf.add_final_length();
        Ok(buf.into_bytes())
    }
}

impl Introspectable for UnbindSm {
    fn details(&self) -> Vec<PduPropertyDetail> {
        self.header.span_details()
    }
}

/// Unbind acknowledgment, echoing the request's sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbindSmResp {
    pub header: Header,
}

impl UnbindSmResp {
    pub fn new(default_coding: DataCoding, status: CommandStatus, sequence: u32) -> Self {
        Self {
            header: Header::with_status(default_coding, CommandId::UnbindResp, status, sequence),
        }
    }

    pub fn reply_to(request: &UnbindSm) -> Self {
        Self::new(request.header.default_coding, CommandStatus::OK, request.header.sequence)
    }

    /// Parses an acknowledgment from the wire; `None` on any fault.
    pub fn decode(buf: &SmppBuffer, cursor: &mut usize) -> Option<Self> {
        let header = buf.extract_header(cursor).ok()?;
        if header.command != CommandId::UnbindResp {
            return None;
        }
        Some(Self { header })
    }
}

impl Encodable for UnbindSmResp {
    fn encode(&self) -> Result<Vec<u8>, BufferError> {
        let mut buf = SmppBuffer::with_header(self.header.default_coding, &self.header);
        buf.add_final_length();
        Ok(buf.into_bytes())
    }
}

impl Introspectable for UnbindSmResp {
    fn details(&self) -> Vec<PduPropertyDetail> {
        self.header.span_details()
    }
}
