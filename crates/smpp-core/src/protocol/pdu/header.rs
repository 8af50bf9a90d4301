//! The 16-byte header shared by every PDU.

use serde::{Deserialize, Serialize};

use crate::charset::DataCoding;
use crate::protocol::buffer::SmppBuffer;
use crate::protocol::fields::PduPropertyDetail;
use crate::protocol::pdu::{CommandId, CommandStatus};

/// Common PDU header: total length, command, status, sequence.
///
/// `length` always equals the serialized byte count of the whole PDU,
/// including the four length bytes themselves; on an outbound header it
/// stays 0 until the PDU is materialized from the wire. `pdu_data` holds
/// the captured raw span of the full PDU once parsed, so the owning type
/// can re-walk its own bytes for diagnostics.
///
/// Equality compares command, status, and sequence. The length field is
/// derived during materialization (an outbound header carries 0 until
/// encoded), so it does not participate, and neither does the captured
/// span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    /// Fallback coding applied to [`DataCoding::Default`] text fields.
    pub default_coding: DataCoding,
    /// Total PDU byte count, including this field.
    pub length: u32,
    /// The operation this PDU performs.
    pub command: CommandId,
    /// 0 on success or on any request; an error code otherwise.
    pub status: CommandStatus,
    /// Correlates a response with its request.
    pub sequence: u32,
    /// Raw bytes of the whole PDU, present once materialized.
    pub pdu_data: Option<SmppBuffer>,
}

impl Header {
    /// Serialized size of the header fields.
    pub const SIZE: usize = 16;

    /// An outbound header with a successful status.
    pub fn new(default_coding: DataCoding, command: CommandId, sequence: u32) -> Self {
        Self::with_status(default_coding, command, CommandStatus::OK, sequence)
    }

    /// An outbound header carrying an explicit status, as responses do.
    pub fn with_status(
        default_coding: DataCoding,
        command: CommandId,
        status: CommandStatus,
        sequence: u32,
    ) -> Self {
        Self {
            default_coding,
            length: 0,
            command,
            status,
            sequence,
            pdu_data: None,
        }
    }

    /// Audit records for the header fields of the captured PDU span.
    ///
    /// Empty when the PDU was never materialized or its span is shorter
    /// than a header.
    pub fn span_details(&self) -> Vec<PduPropertyDetail> {
        let Some(data) = &self.pdu_data else {
            return Vec::new();
        };
        let mut cursor = 0;
        data.extract_header_details(&mut cursor).unwrap_or_default()
    }
}

impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.command == other.command
            && self.status == other.status
            && self.sequence == other.sequence
    }
}

impl Eq for Header {}
