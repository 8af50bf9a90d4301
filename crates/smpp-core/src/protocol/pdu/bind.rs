//! Bind request and response.
//!
//! One PDU shape serves the three bind operations; the command id in the
//! header selects whether the connection will transmit, receive, or both.
//! Which mode to negotiate is the connection layer's decision; this type
//! only owns the wire form.

use serde::{Deserialize, Serialize};

use crate::charset::DataCoding;
use crate::protocol::buffer::{BufferError, SmppBuffer};
use crate::protocol::fields::{PduPropertyDetail, TlvCollection};
use crate::protocol::pdu::{CommandId, CommandStatus, Encodable, Header, Introspectable};
use crate::protocol::sequence::SequenceGenerator;

/// Interface version this client speaks (SMPP 3.4).
pub const INTERFACE_VERSION: u8 = 0x34;

/// Bind request: credentials plus the address range this client serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindSm {
    pub header: Header,
    pub system_id: String,
    pub password: String,
    pub system_type: String,
    pub interface_version: u8,
    pub addr_ton: u8,
    pub addr_npi: u8,
    pub address_range: String,
}

impl BindSm {
    /// Builds an outbound bind with a fresh sequence number.
    ///
    /// `command` must be one of the three bind operations; it is stored
    /// as given.
    pub fn new(
        default_coding: DataCoding,
        command: CommandId,
        system_id: impl Into<String>,
        password: impl Into<String>,
        sequencer: &SequenceGenerator,
    ) -> Self {
        Self {
            header: Header::new(default_coding, command, sequencer.next_sequence()),
            system_id: system_id.into(),
            password: password.into(),
            system_type: String::new(),
            interface_version: INTERFACE_VERSION,
            addr_ton: 0,
            addr_npi: 0,
            address_range: String::new(),
        }
    }

    /// Parses a bind request from the wire; `None` on any fault.
    pub fn decode(buf: &SmppBuffer, cursor: &mut usize) -> Option<Self> {
        let header = buf.extract_header(cursor).ok()?;
        if !matches!(
            header.command,
            CommandId::BindTransmitter | CommandId::BindReceiver | CommandId::BindTransceiver
        ) {
            return None;
        }

        let system_id = buf.extract_c_string(cursor);
        let password = buf.extract_c_string(cursor);
        let system_type = buf.extract_c_string(cursor);
        let interface_version = buf.extract_byte(cursor).ok()?;
        let addr_ton = buf.extract_byte(cursor).ok()?;
        let addr_npi = buf.extract_byte(cursor).ok()?;
        let address_range = buf.extract_c_string(cursor);

        Some(Self {
            header,
            system_id,
            password,
            system_type,
            interface_version,
            addr_ton,
            addr_npi,
            address_range,
        })
    }
}

impl Encodable for BindSm {
    fn encode(&self) -> Result<Vec<u8>, BufferError> {
        let mut buf = SmppBuffer::with_header(self.header.default_coding, &self.header);
        buf.add_c_string(&self.system_id);
        buf.add_c_string(&self.password);
        buf.add_c_string(&self.system_type);
        buf.add_byte(self.interface_version);
        buf.add_byte(self.addr_ton);
        buf.add_byte(self.addr_npi);
        buf.add_c_string(&self.address_range);
        buf.add_final_length();
        Ok(buf.into_bytes())
    }
}

impl Introspectable for BindSm {
    fn details(&self) -> Vec<PduPropertyDetail> {
        let Some(data) = &self.header.pdu_data else {
            return Vec::new();
        };
        bind_details(data).unwrap_or_default()
    }
}

fn bind_details(data: &SmppBuffer) -> Result<Vec<PduPropertyDetail>, BufferError> {
    let mut cursor = 0;
    let mut details = data.extract_header_details(&mut cursor)?;
    details.push(data.extract_c_string_detail("SystemId", &mut cursor));
    details.push(data.extract_c_string_detail("Password", &mut cursor));
    details.push(data.extract_c_string_detail("SystemType", &mut cursor));
    details.push(data.extract_byte_detail("InterfaceVersion", &mut cursor)?);
    details.push(data.extract_byte_detail("AddrTon", &mut cursor)?);
    details.push(data.extract_byte_detail("AddrNpi", &mut cursor)?);
    details.push(data.extract_c_string_detail("AddressRange", &mut cursor));
    Ok(details)
}

/// Bind acknowledgment: the message center's system id, plus optional
/// parameters such as its interface version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindSmResp {
    pub header: Header,
    pub system_id: String,
    pub optional: TlvCollection,
}

impl BindSmResp {
    pub fn new(
        default_coding: DataCoding,
        command: CommandId,
        status: CommandStatus,
        sequence: u32,
        system_id: impl Into<String>,
    ) -> Self {
        Self {
            header: Header::with_status(default_coding, command, status, sequence),
            system_id: system_id.into(),
            optional: TlvCollection::new(),
        }
    }

    /// Parses a bind acknowledgment from the wire; `None` on any fault.
    ///
    /// A rejecting response may legally stop after the header.
    pub fn decode(buf: &SmppBuffer, cursor: &mut usize) -> Option<Self> {
        let start = *cursor;
        let header = buf.extract_header(cursor).ok()?;
        if !matches!(
            header.command,
            CommandId::BindTransmitterResp | CommandId::BindReceiverResp | CommandId::BindTransceiverResp
        ) {
            return None;
        }

        let end = start + header.length as usize;
        let system_id = if *cursor < end {
            buf.extract_c_string(cursor)
        } else {
            String::new()
        };

        let mut optional = TlvCollection::new();
        while *cursor < end {
            optional.push(buf.extract_tlv(cursor).ok()?);
        }

        Some(Self {
            header,
            system_id,
            optional,
        })
    }
}

impl Encodable for BindSmResp {
    fn encode(&self) -> Result<Vec<u8>, BufferError> {
        let mut buf = SmppBuffer::with_header(self.header.default_coding, &self.header);
        buf.add_c_string(&self.system_id);
        buf.add_tlv_collection(&self.optional);
        buf.add_final_length();
        Ok(buf.into_bytes())
    }
}

impl Introspectable for BindSmResp {
    fn details(&self) -> Vec<PduPropertyDetail> {
        let Some(data) = &self.header.pdu_data else {
            return Vec::new();
        };
        bind_resp_details(data).unwrap_or_default()
    }
}

fn bind_resp_details(data: &SmppBuffer) -> Result<Vec<PduPropertyDetail>, BufferError> {
    let mut cursor = 0;
    let mut details = data.extract_header_details(&mut cursor)?;
    if cursor < data.len() {
        details.push(data.extract_c_string_detail("SystemId", &mut cursor));
    }
    while cursor < data.len() {
        data.extract_tlv_details(&mut details, &mut cursor)?;
    }
    Ok(details)
}
