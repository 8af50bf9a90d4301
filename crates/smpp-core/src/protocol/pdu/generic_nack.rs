//! Generic negative acknowledgment, sent when a received PDU cannot be
//! attributed to any recognizable request.

use serde::{Deserialize, Serialize};

use crate::charset::DataCoding;
use crate::protocol::buffer::{BufferError, SmppBuffer};
use crate::protocol::fields::PduPropertyDetail;
use crate::protocol::pdu::{CommandId, CommandStatus, Encodable, Header, Introspectable};

/// The nack carries its reason in the header status and echoes the
/// offending sequence; there is no body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericNackSm {
    pub header: Header,
}

impl GenericNackSm {
    pub fn new(default_coding: DataCoding, status: CommandStatus, sequence: u32) -> Self {
        Self {
            header: Header::with_status(default_coding, CommandId::GenericNack, status, sequence),
        }
    }

    /// Parses a nack from the wire; `None` on any fault.
    pub fn decode(buf: &SmppBuffer, cursor: &mut usize) -> Option<Self> {
        let header = buf.extract_header(cursor).ok()?;
        if header.command != CommandId::GenericNack {
            return None;
        }
        Some(Self { header })
    }
}

impl Encodable for GenericNackSm {
    fn encode(&self) -> Result<Vec<u8>, BufferError> {
        let mut buf = SmppBuffer::with_header(self.header.default_coding, &self.header);
        buf.add_final_length();
        Ok(buf.into_bytes())
    }
}

impl Introspectable for GenericNackSm {
    fn details(&self) -> Vec<PduPropertyDetail> {
        self.header.span_details()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nack_round_trip_keeps_status_and_sequence() {
        let nack = GenericNackSm::new(
            DataCoding::Latin1,
            CommandStatus::INVALID_COMMAND_ID,
            0x7FFF_0001,
        );
        let bytes = nack.encode().unwrap();

        let buf = SmppBuffer::from_bytes(DataCoding::Latin1, &bytes);
        let mut cursor = 0;
        let decoded = GenericNackSm::decode(&buf, &mut cursor).unwrap();
        assert_eq!(decoded.header.status, CommandStatus::INVALID_COMMAND_ID);
        assert_eq!(decoded.header.sequence, 0x7FFF_0001);
    }
}
