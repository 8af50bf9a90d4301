//! Delivery status query for a previously submitted message.

use serde::{Deserialize, Serialize};

use crate::charset::DataCoding;
use crate::protocol::buffer::{BufferError, SmppBuffer};
use crate::protocol::fields::PduPropertyDetail;
use crate::protocol::pdu::{CommandId, CommandStatus, Encodable, Header, Introspectable};
use crate::protocol::sequence::SequenceGenerator;

/// `query_sm`: asks the message center about the message it previously
/// receipted with `message_id`. The source address must match the
/// original submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySm {
    pub header: Header,
    pub message_id: String,
    pub source_ton: u8,
    pub source_npi: u8,
    pub source_addr: String,
}

impl QuerySm {
    /// Builds an outbound query with a fresh sequence number.
    pub fn new(
        default_coding: DataCoding,
        message_id: impl Into<String>,
        sequencer: &SequenceGenerator,
    ) -> Self {
        Self {
            header: Header::new(default_coding, CommandId::QuerySm, sequencer.next_sequence()),
            message_id: message_id.into(),
            source_ton: 0,
            source_npi: 0,
            source_addr: String::new(),
        }
    }

    /// Parses a query from the wire; `None` on any fault.
    pub fn decode(buf: &SmppBuffer, cursor: &mut usize) -> Option<Self> {
        let header = buf.extract_header(cursor).ok()?;
        if header.command != CommandId::QuerySm {
            return None;
        }

        let message_id = buf.extract_c_string(cursor);
        let source_ton = buf.extract_byte(cursor).ok()?;
        let source_npi = buf.extract_byte(cursor).ok()?;
        let source_addr = buf.extract_c_string(cursor);

        Some(Self {
            header,
            message_id,
            source_ton,
            source_npi,
            source_addr,
        })
    }
}

impl Encodable for QuerySm {
    fn encode(&self) -> Result<Vec<u8>, BufferError> {
        let mut buf = SmppBuffer::with_header(self.header.default_coding, &self.header);
        buf.add_c_string(&self.message_id);
        buf.add_byte(self.source_ton);
        buf.add_byte(self.source_npi);
        buf.add_c_string(&self.source_addr);
        buf.add_final_length();
        Ok(buf.into_bytes())
    }
}

impl Introspectable for QuerySm {
    fn details(&self) -> Vec<PduPropertyDetail> {
        let Some(data) = &self.header.pdu_data else {
            return Vec::new();
        };
        query_details(data).unwrap_or_default()
    }
}

fn query_details(data: &SmppBuffer) -> Result<Vec<PduPropertyDetail>, BufferError> {
    let mut cursor = 0;
    let mut details = data.extract_header_details(&mut cursor)?;
    details.push(data.extract_c_string_detail("MessageId", &mut cursor));
    details.push(data.extract_byte_detail("SourceTon", &mut cursor)?);
    details.push(data.extract_byte_detail("SourceNpi", &mut cursor)?);
    details.push(data.extract_c_string_detail("SourceAddr", &mut cursor));
    Ok(details)
}

/// Message states reported by `query_sm_resp`.
pub mod message_state {
    pub const ENROUTE: u8 = 1;
    pub const DELIVERED: u8 = 2;
    pub const EXPIRED: u8 = 3;
    pub const DELETED: u8 = 4;
    pub const UNDELIVERABLE: u8 = 5;
    pub const ACCEPTED: u8 = 6;
    pub const UNKNOWN: u8 = 7;
    pub const REJECTED: u8 = 8;
}

/// `query_sm_resp`: the message center's answer: where the message is
/// in its lifecycle and when it reached a final state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySmResp {
    pub header: Header,
    pub message_id: String,
    /// Final-state timestamp, 16 characters, or empty while in transit.
    pub final_date: String,
    pub message_state: u8,
    pub error_code: u8,
}

impl QuerySmResp {
    pub fn new(
        default_coding: DataCoding,
        status: CommandStatus,
        sequence: u32,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            header: Header::with_status(default_coding, CommandId::QuerySmResp, status, sequence),
            message_id: message_id.into(),
            final_date: String::new(),
            message_state: message_state::ENROUTE,
            error_code: 0,
        }
    }

    /// Parses a query answer from the wire; `None` on any fault.
    pub fn decode(buf: &SmppBuffer, cursor: &mut usize) -> Option<Self> {
        let header = buf.extract_header(cursor).ok()?;
        if header.command != CommandId::QuerySmResp {
            return None;
        }

        let message_id = buf.extract_c_string(cursor);
        let final_date = buf.extract_c_string(cursor);
        let message_state = buf.extract_byte(cursor).ok()?;
        let error_code = buf.extract_byte(cursor).ok()?;

        Some(Self {
            header,
            message_id,
            final_date,
            message_state,
            error_code,
        })
    }
}

impl Encodable for QuerySmResp {
    fn encode(&self) -> Result<Vec<u8>, BufferError> {
        let mut buf = SmppBuffer::with_header(self.header.default_coding, &self.header);
        buf.add_c_string(&self.message_id);
        buf.add_time_string(&self.final_date, 17)?;
        buf.add_byte(self.message_state);
        buf.add_byte(self.error_code);
        buf.add_final_length();
        Ok(buf.into_bytes())
    }
}

impl Introspectable for QuerySmResp {
    fn details(&self) -> Vec<PduPropertyDetail> {
        let Some(data) = &self.header.pdu_data else {
            return Vec::new();
        };
        query_resp_details(data).unwrap_or_default()
    }
}

fn query_resp_details(data: &SmppBuffer) -> Result<Vec<PduPropertyDetail>, BufferError> {
    let mut cursor = 0;
    let mut details = data.extract_header_details(&mut cursor)?;
    details.push(data.extract_c_string_detail("MessageId", &mut cursor));
    details.push(data.extract_c_string_detail("FinalDate", &mut cursor));
    details.push(data.extract_byte_detail("MessageState", &mut cursor)?);
    details.push(data.extract_byte_detail("ErrorCode", &mut cursor)?);
    Ok(details)
}
