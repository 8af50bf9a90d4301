//! Message delivery from the message center to this client: mobile
//! originated messages and delivery receipts share this PDU.

use serde::{Deserialize, Serialize};

use crate::charset::{self, DataCoding};
use crate::protocol::buffer::{BufferError, SmppBuffer};
use crate::protocol::fields::{PduPropertyDetail, TlvCollection, UserData};
use crate::protocol::pdu::{
    CommandId, CommandStatus, Encodable, Header, Introspectable, ESM_CLASS_UDHI,
};
use crate::protocol::sequence::SequenceGenerator;

/// `deliver_sm`: field-for-field the submit layout, flowing the other
/// way. The schedule and validity fields are always empty on delivery;
/// receipts arrive with the receipt bits of esm_class set and their
/// message id in the optional parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverSm {
    pub header: Header,
    pub service_type: String,
    pub source_ton: u8,
    pub source_npi: u8,
    pub source_addr: String,
    pub dest_ton: u8,
    pub dest_npi: u8,
    pub dest_addr: String,
    pub esm_class: u8,
    pub protocol_id: u8,
    pub priority_flag: u8,
    pub schedule_delivery_time: String,
    pub validity_period: String,
    pub registered_delivery: u8,
    pub replace_if_present: u8,
    pub data_coding: DataCoding,
    pub sm_default_msg_id: u8,
    pub user_data: UserData,
    pub optional: TlvCollection,
}

impl DeliverSm {
    /// Builds an outbound delivery with a fresh sequence number.
    /// Primarily useful to gateway simulators and tests; a client mostly
    /// decodes these.
    pub fn new(default_coding: DataCoding, sequencer: &SequenceGenerator) -> Self {
        Self {
            header: Header::new(default_coding, CommandId::DeliverSm, sequencer.next_sequence()),
            service_type: String::new(),
            source_ton: 0,
            source_npi: 0,
            source_addr: String::new(),
            dest_ton: 0,
            dest_npi: 0,
            dest_addr: String::new(),
            esm_class: 0,
            protocol_id: 0,
            priority_flag: 0,
            schedule_delivery_time: String::new(),
            validity_period: String::new(),
            registered_delivery: 0,
            replace_if_present: 0,
            data_coding: DataCoding::Default,
            sm_default_msg_id: 0,
            user_data: UserData::new(),
            optional: TlvCollection::new(),
        }
    }

    /// The message payload converted back to text.
    pub fn message_text(&self) -> String {
        let coding = self.data_coding.resolve(self.header.default_coding);
        charset::decode_bytes(&self.user_data.short_message, coding)
    }

    fn wire_esm_class(&self) -> u8 {
        if self.user_data.headers.is_empty() {
            self.esm_class & !ESM_CLASS_UDHI
        } else {
            self.esm_class | ESM_CLASS_UDHI
        }
    }

    /// Parses a delivery from the wire; `None` on any fault.
    pub fn decode(buf: &SmppBuffer, cursor: &mut usize) -> Option<Self> {
        let start = *cursor;
        let header = buf.extract_header(cursor).ok()?;
        if header.command != CommandId::DeliverSm {
            return None;
        }

        let service_type = buf.extract_c_string(cursor);
        let source_ton = buf.extract_byte(cursor).ok()?;
        let source_npi = buf.extract_byte(cursor).ok()?;
        let source_addr = buf.extract_c_string(cursor);
        let dest_ton = buf.extract_byte(cursor).ok()?;
        let dest_npi = buf.extract_byte(cursor).ok()?;
        let dest_addr = buf.extract_c_string(cursor);
        let esm_class = buf.extract_byte(cursor).ok()?;
        let protocol_id = buf.extract_byte(cursor).ok()?;
        let priority_flag = buf.extract_byte(cursor).ok()?;
        let schedule_delivery_time = buf.extract_c_string(cursor);
        let validity_period = buf.extract_c_string(cursor);
        let registered_delivery = buf.extract_byte(cursor).ok()?;
        let replace_if_present = buf.extract_byte(cursor).ok()?;
        let data_coding = DataCoding::from_byte(buf.extract_byte(cursor).ok()?)?;
        let sm_default_msg_id = buf.extract_byte(cursor).ok()?;

        let sm_length = buf.extract_byte(cursor).ok()? as usize;
        let sm_bytes = buf.extract_byte_array(cursor, sm_length).ok()?;
        let udhi = esm_class & ESM_CLASS_UDHI != 0;
        let user_data = SmppBuffer::from_bytes(header.default_coding, &sm_bytes)
            .extract_user_data(udhi, 0);

        let end = start + header.length as usize;
        let mut optional = TlvCollection::new();
        while *cursor < end {
            optional.push(buf.extract_tlv(cursor).ok()?);
        }

        Some(Self {
            header,
            service_type,
            source_ton,
            source_npi,
            source_addr,
            dest_ton,
            dest_npi,
            dest_addr,
            esm_class,
            protocol_id,
            priority_flag,
            schedule_delivery_time,
            validity_period,
            registered_delivery,
            replace_if_present,
            data_coding,
            sm_default_msg_id,
            user_data,
            optional,
        })
    }
}

impl Encodable for DeliverSm {
    fn encode(&self) -> Result<Vec<u8>, BufferError> {
        let mut buf = SmppBuffer::with_header(self.header.default_coding, &self.header);
        buf.add_c_string(&self.service_type);
        buf.add_byte(self.source_ton);
        buf.add_byte(self.source_npi);
        buf.add_c_string(&self.source_addr);
        buf.add_byte(self.dest_ton);
        buf.add_byte(self.dest_npi);
        buf.add_c_string(&self.dest_addr);
        buf.add_byte(self.wire_esm_class());
        buf.add_byte(self.protocol_id);
        buf.add_byte(self.priority_flag);
        buf.add_time_string(&self.schedule_delivery_time, 17)?;
        buf.add_time_string(&self.validity_period, 17)?;
        buf.add_byte(self.registered_delivery);
        buf.add_byte(self.replace_if_present);
        buf.add_byte(self.data_coding as u8);
        buf.add_byte(self.sm_default_msg_id);
        buf.add_user_data(&self.user_data)?;
        buf.add_tlv_collection(&self.optional);
        buf.add_final_length();
        Ok(buf.into_bytes())
    }
}

impl Introspectable for DeliverSm {
    fn details(&self) -> Vec<PduPropertyDetail> {
        let Some(data) = &self.header.pdu_data else {
            return Vec::new();
        };
        deliver_details(data).unwrap_or_default()
    }
}

fn deliver_details(data: &SmppBuffer) -> Result<Vec<PduPropertyDetail>, BufferError> {
    let mut cursor = 0;
    let mut details = data.extract_header_details(&mut cursor)?;
    details.push(data.extract_c_string_detail("ServiceType", &mut cursor));
    details.push(data.extract_byte_detail("SourceTon", &mut cursor)?);
    details.push(data.extract_byte_detail("SourceNpi", &mut cursor)?);
    details.push(data.extract_c_string_detail("SourceAddr", &mut cursor));
    details.push(data.extract_byte_detail("DestTon", &mut cursor)?);
    details.push(data.extract_byte_detail("DestNpi", &mut cursor)?);
    details.push(data.extract_c_string_detail("DestAddr", &mut cursor));
    details.push(data.extract_byte_detail("EsmClass", &mut cursor)?);
    details.push(data.extract_byte_detail("ProtocolId", &mut cursor)?);
    details.push(data.extract_byte_detail("PriorityFlag", &mut cursor)?);
    details.push(data.extract_c_string_detail("ScheduleDeliveryTime", &mut cursor));
    details.push(data.extract_c_string_detail("ValidityPeriod", &mut cursor));
    details.push(data.extract_byte_detail("RegisteredDelivery", &mut cursor)?);
    details.push(data.extract_byte_detail("ReplaceIfPresent", &mut cursor)?);
    details.push(data.extract_byte_detail("DataCoding", &mut cursor)?);
    details.push(data.extract_byte_detail("SmDefaultMsgId", &mut cursor)?);

    let length_detail = data.extract_byte_detail("SmLength", &mut cursor)?;
    let sm_length = length_detail.as_byte().unwrap_or(0) as usize;
    details.push(length_detail);
    details.push(data.extract_byte_array_detail("ShortMessage", &mut cursor, sm_length)?);

    while cursor < data.len() {
        data.extract_tlv_details(&mut details, &mut cursor)?;
    }
    Ok(details)
}

/// `deliver_sm_resp`: acknowledges a delivery. The message id field is
/// unused in this direction and always encodes as a bare terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverSmResp {
    pub header: Header,
    pub message_id: String,
}

impl DeliverSmResp {
    pub fn new(default_coding: DataCoding, status: CommandStatus, sequence: u32) -> Self {
        Self {
            header: Header::with_status(default_coding, CommandId::DeliverSmResp, status, sequence),
            message_id: String::new(),
        }
    }

    pub fn reply_to(delivery: &DeliverSm) -> Self {
        Self::new(
            delivery.header.default_coding,
            CommandStatus::OK,
            delivery.header.sequence,
        )
    }

    /// Parses a delivery acknowledgment from the wire; `None` on any fault.
    pub fn decode(buf: &SmppBuffer, cursor: &mut usize) -> Option<Self> {
        let start = *cursor;
        let header = buf.extract_header(cursor).ok()?;
        if header.command != CommandId::DeliverSmResp {
            return None;
        }

        let end = start + header.length as usize;
        let message_id = if *cursor < end {
            buf.extract_c_string(cursor)
        } else {
            String::new()
        };

        Some(Self { header, message_id })
    }
}

impl Encodable for DeliverSmResp {
    fn encode(&self) -> Result<Vec<u8>, BufferError> {
        let mut buf = SmppBuffer::with_header(self.header.default_coding, &self.header);
        buf.add_c_string(&self.message_id);
        buf.add_final_length();
        Ok(buf.into_bytes())
    }
}

impl Introspectable for DeliverSmResp {
    fn details(&self) -> Vec<PduPropertyDetail> {
        let Some(data) = &self.header.pdu_data else {
            return Vec::new();
        };
        let mut cursor = 0;
        let mut details = match data.extract_header_details(&mut cursor) {
            Ok(details) => details,
            Err(_) => return Vec::new(),
        };
        if cursor < data.len() {
            details.push(data.extract_c_string_detail("MessageId", &mut cursor));
        }
        details
    }
}
