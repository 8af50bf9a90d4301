//! Binary codec for SMPP PDU construction and extraction.
//!
//! [`SmppBuffer`] is a growable byte buffer with append primitives for
//! building outbound PDUs and cursor-based extraction primitives for
//! parsing inbound ones. All multi-byte integers are big-endian on the
//! wire regardless of host byte order.
//!
//! Extraction comes in two shapes: the plain `extract_*` operations, and
//! `extract_*_detail` twins that perform the identical decode while also
//! recording a [`PduPropertyDetail`] audit record. A detail variant must
//! never change the decode result, only observe it.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::charset::{self, DataCoding};
use crate::protocol::fields::{
    DestinationAddress, PduDataType, PduPropertyDetail, PduValue, Tlv, TlvCollection,
    UnsuccessDestinationAddress, UserData, UserDataHeader, UserDataHeaderCollection,
};
use crate::protocol::pdu::{CommandId, CommandStatus, Header};

/// Errors raised by buffer operations.
///
/// [`BufferError::Underrun`] indicates a malformed peer or a
/// desynchronized stream; the remaining variants indicate a local caller
/// handing the codec a value that cannot fit its fixed-width field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    /// A read past the available bytes.
    #[error("buffer underrun at offset {offset}: need {needed} bytes, {available} available")]
    Underrun {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A value too long for its fixed-width field.
    #[error("field of {length} bytes exceeds the fixed width of {max}")]
    FieldTooLong { length: usize, max: usize },

    /// A field width that is not a legal wire length.
    #[error("invalid field length: {0}")]
    InvalidLength(usize),

    /// A command id this client does not recognize.
    #[error("unknown command id: 0x{0:08X}")]
    UnknownCommand(u32),
}

/// Growable byte buffer holding exactly one PDU (or a span of one) and
/// the default character coding used to resolve [`DataCoding::Default`].
///
/// Instances are not synchronized; each one belongs to a single encode or
/// decode operation at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmppBuffer {
    default_coding: DataCoding,
    data: Vec<u8>,
}

impl SmppBuffer {
    /// Creates an empty buffer.
    pub fn new(default_coding: DataCoding) -> Self {
        Self {
            default_coding,
            data: Vec::new(),
        }
    }

    /// Creates a buffer over a copy of `bytes`.
    pub fn from_bytes(default_coding: DataCoding, bytes: &[u8]) -> Self {
        Self {
            default_coding,
            data: bytes.to_vec(),
        }
    }

    /// Creates a buffer seeded with the command, status, and sequence of
    /// `header`. The length field is deferred to [`SmppBuffer::add_final_length`].
    pub fn with_header(default_coding: DataCoding, header: &Header) -> Self {
        let mut buf = Self::new(default_coding);
        buf.add_u32(header.command as u32);
        buf.add_u32(header.status.0);
        buf.add_u32(header.sequence);
        buf
    }

    /// Creates a buffer holding `value` encoded in `coding`.
    pub fn from_encoded_string(default_coding: DataCoding, value: &str, coding: DataCoding) -> Self {
        let mut buf = Self::new(default_coding);
        buf.add_encoded_string(value, coding);
        buf
    }

    /// The raw bytes stored so far.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Number of bytes stored.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The coding substituted for [`DataCoding::Default`].
    pub fn default_coding(&self) -> DataCoding {
        self.default_coding
    }

    // ── Append primitives ─────────────────────────────────────────────────────

    /// Prepends the total PDU length (current length + 4) as a big-endian
    /// u32 at offset 0.
    ///
    /// Call exactly once, after every other field has been appended; the
    /// result is the transmittable PDU.
    pub fn add_final_length(&mut self) {
        let length = (self.data.len() as u32 + 4).to_be_bytes();
        self.data.splice(0..0, length);
    }

    pub fn add_byte(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn add_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn add_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn add_u16(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends the bytes of `value` followed by a single zero terminator.
    pub fn add_c_string(&mut self, value: &str) {
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
    }

    /// Appends a fixed-width time/date field: the string, zero padding up
    /// to `length - 1`, then the terminator. An empty value appends just
    /// the terminator.
    pub fn add_time_string(&mut self, value: &str, length: usize) -> Result<(), BufferError> {
        if length == 0 {
            return Err(BufferError::InvalidLength(length));
        }
        if value.is_empty() {
            self.data.push(0);
            return Ok(());
        }
        if value.len() >= length {
            return Err(BufferError::FieldTooLong {
                length: value.len(),
                max: length - 1,
            });
        }
        self.data.extend_from_slice(value.as_bytes());
        self.data.resize(self.data.len() + (length - value.len()), 0);
        Ok(())
    }

    /// Appends `value` converted to the character set named by `coding`,
    /// resolving [`DataCoding::Default`] against the buffer's fallback.
    /// No terminator is appended; encoded strings are length-delimited.
    pub fn add_encoded_string(&mut self, value: &str, coding: DataCoding) {
        if value.is_empty() {
            return;
        }
        let coding = coding.resolve(self.default_coding);
        self.data.extend(charset::encode_string(value, coding));
    }

    /// Appends the contents of another buffer.
    pub fn add_smpp_buffer(&mut self, other: &SmppBuffer) {
        self.data.extend_from_slice(other.bytes());
    }

    /// Appends the command, status, and sequence fields of `header`.
    pub fn add_header(&mut self, header: &Header) {
        self.add_u32(header.command as u32);
        self.add_u32(header.status.0);
        self.add_u32(header.sequence);
    }

    /// Appends one TLV: tag, length, value.
    pub fn add_tlv(&mut self, tlv: &Tlv) {
        self.add_u16(tlv.tag);
        self.add_u16(tlv.len());
        self.add_bytes(&tlv.value);
    }

    /// Appends every TLV in the collection, omitting zero-length entries.
    pub fn add_tlv_collection(&mut self, collection: &TlvCollection) {
        for tlv in collection {
            if !tlv.is_empty() {
                self.add_tlv(tlv);
            }
        }
    }

    /// Appends one user data header element: identifier, length, data.
    pub fn add_user_data_header(&mut self, header: &UserDataHeader) {
        self.add_byte(header.iei);
        self.add_byte(header.len());
        self.add_bytes(&header.data);
    }

    /// Appends a user data header block: a length byte covering the
    /// elements, then each element. Appends nothing for an empty
    /// collection.
    pub fn add_user_data_header_collection(
        &mut self,
        collection: &UserDataHeaderCollection,
    ) -> Result<(), BufferError> {
        if collection.is_empty() {
            return Ok(());
        }
        let mut block = SmppBuffer::new(self.default_coding);
        for header in collection {
            block.add_user_data_header(header);
        }
        if block.len() > u8::MAX as usize {
            return Err(BufferError::FieldTooLong {
                length: block.len(),
                max: u8::MAX as usize,
            });
        }
        self.add_byte(block.len() as u8);
        self.add_smpp_buffer(&block);
        Ok(())
    }

    /// Appends a complete short-message field: the sm_length byte, the
    /// header block (when present), and the payload.
    pub fn add_user_data(&mut self, user_data: &UserData) -> Result<(), BufferError> {
        let mut block = SmppBuffer::new(self.default_coding);
        block.add_user_data_header_collection(&user_data.headers)?;
        block.add_bytes(&user_data.short_message);
        if block.len() > u8::MAX as usize {
            return Err(BufferError::FieldTooLong {
                length: block.len(),
                max: u8::MAX as usize,
            });
        }
        self.add_byte(block.len() as u8);
        self.add_smpp_buffer(&block);
        Ok(())
    }

    /// Appends one destination address tuple.
    pub fn add_destination_address(&mut self, address: &DestinationAddress) {
        self.add_byte(address.dest_type);
        self.add_byte(address.ton);
        self.add_byte(address.npi);
        self.add_c_string(&address.address);
    }

    /// Appends a destination address list: a count byte, then each tuple.
    pub fn add_destination_addresses(
        &mut self,
        addresses: &[DestinationAddress],
    ) -> Result<(), BufferError> {
        if addresses.len() > u8::MAX as usize {
            return Err(BufferError::FieldTooLong {
                length: addresses.len(),
                max: u8::MAX as usize,
            });
        }
        self.add_byte(addresses.len() as u8);
        for address in addresses {
            self.add_destination_address(address);
        }
        Ok(())
    }

    /// Appends one undelivered destination with its error status.
    pub fn add_unsuccess_destination_address(&mut self, address: &UnsuccessDestinationAddress) {
        self.add_byte(address.ton);
        self.add_byte(address.npi);
        self.add_c_string(&address.address);
        self.add_u32(address.error_status.0);
    }

    /// Appends an undelivered destination list: a count byte, then each
    /// entry.
    pub fn add_unsuccess_destination_addresses(
        &mut self,
        addresses: &[UnsuccessDestinationAddress],
    ) -> Result<(), BufferError> {
        if addresses.len() > u8::MAX as usize {
            return Err(BufferError::FieldTooLong {
                length: addresses.len(),
                max: u8::MAX as usize,
            });
        }
        self.add_byte(addresses.len() as u8);
        for address in addresses {
            self.add_unsuccess_destination_address(address);
        }
        Ok(())
    }

    // ── Extraction primitives ─────────────────────────────────────────────────

    fn check(&self, offset: usize, needed: usize) -> Result<(), BufferError> {
        let available = self.data.len().saturating_sub(offset);
        if available < needed {
            return Err(BufferError::Underrun {
                offset,
                needed,
                available,
            });
        }
        Ok(())
    }

    /// Reads a big-endian u32 at `cursor`, advancing it by 4.
    pub fn extract_u32(&self, cursor: &mut usize) -> Result<u32, BufferError> {
        self.check(*cursor, 4)?;
        let value = u32::from_be_bytes([
            self.data[*cursor],
            self.data[*cursor + 1],
            self.data[*cursor + 2],
            self.data[*cursor + 3],
        ]);
        *cursor += 4;
        Ok(value)
    }

    /// Reads a big-endian u16 at `cursor`, advancing it by 2.
    pub fn extract_u16(&self, cursor: &mut usize) -> Result<u16, BufferError> {
        self.check(*cursor, 2)?;
        let value = u16::from_be_bytes([self.data[*cursor], self.data[*cursor + 1]]);
        *cursor += 2;
        Ok(value)
    }

    /// Reads one byte at `cursor`, advancing it by 1.
    pub fn extract_byte(&self, cursor: &mut usize) -> Result<u8, BufferError> {
        self.check(*cursor, 1)?;
        let value = self.data[*cursor];
        *cursor += 1;
        Ok(value)
    }

    /// Copies `length` bytes at `cursor`, advancing it by `length`.
    pub fn extract_byte_array(
        &self,
        cursor: &mut usize,
        length: usize,
    ) -> Result<Vec<u8>, BufferError> {
        self.check(*cursor, length)?;
        let bytes = self.data[*cursor..*cursor + length].to_vec();
        *cursor += length;
        Ok(bytes)
    }

    /// Reads a zero-terminated string at `cursor`.
    ///
    /// Returns the text before the terminator and advances past it. When
    /// the byte at `cursor` is already the terminator, or no terminator
    /// exists before the end of the buffer, returns the empty string and
    /// advances by exactly one byte; malformed input never propagates a
    /// fault past this boundary.
    pub fn extract_c_string(&self, cursor: &mut usize) -> String {
        let start = *cursor;
        match self.data[start.min(self.data.len())..]
            .iter()
            .position(|&b| b == 0)
        {
            Some(0) | None => {
                *cursor += 1;
                String::new()
            }
            Some(rel) => {
                let text = String::from_utf8_lossy(&self.data[start..start + rel]).into_owned();
                *cursor = start + rel + 1;
                text
            }
        }
    }

    /// Reads `length` bytes of encoded text at `cursor` and converts them
    /// from the character set named by `coding` (resolving
    /// [`DataCoding::Default`]).
    ///
    /// On any fault the cursor advances by one byte and the empty string
    /// is returned; a caller that requested a nonzero `length` and got an
    /// empty result must treat the field as failed, not blank.
    pub fn extract_encoded_string(
        &self,
        length: usize,
        coding: DataCoding,
        cursor: &mut usize,
    ) -> String {
        if length == 0 {
            return String::new();
        }
        if self.check(*cursor, length).is_err() {
            debug!(
                offset = *cursor,
                length, "encoded string overruns buffer, recovering"
            );
            *cursor += 1;
            return String::new();
        }
        let coding = coding.resolve(self.default_coding);
        let text = charset::decode_bytes(&self.data[*cursor..*cursor + length], coding);
        *cursor += length;
        text
    }

    /// Reads the 16-byte PDU header at `cursor` and captures the full
    /// declared span as a sub-buffer for later re-parsing.
    ///
    /// The cursor advances by 16; body fields follow.
    pub fn extract_header(&self, cursor: &mut usize) -> Result<Header, BufferError> {
        let start = *cursor;
        let length = self.extract_u32(cursor)?;
        let raw_command = self.extract_u32(cursor)?;
        let status = CommandStatus(self.extract_u32(cursor)?);
        let sequence = self.extract_u32(cursor)?;

        let command =
            CommandId::try_from(raw_command).map_err(|_| BufferError::UnknownCommand(raw_command))?;

        self.check(start, length as usize)?;
        let pdu_data = SmppBuffer::from_bytes(
            self.default_coding,
            &self.data[start..start + length as usize],
        );

        Ok(Header {
            default_coding: self.default_coding,
            length,
            command,
            status,
            sequence,
            pdu_data: Some(pdu_data),
        })
    }

    /// Reads the header fields at `offset` without advancing anything and
    /// without capturing the PDU span.
    ///
    /// Used to inspect an incoming stream before deciding how to dispatch
    /// it; returns `None` on any fault.
    pub fn peek_header(&self, offset: usize) -> Option<Header> {
        let mut cursor = offset;
        let length = self.extract_u32(&mut cursor).ok()?;
        let command = CommandId::try_from(self.extract_u32(&mut cursor).ok()?).ok()?;
        let status = CommandStatus(self.extract_u32(&mut cursor).ok()?);
        let sequence = self.extract_u32(&mut cursor).ok()?;

        Some(Header {
            default_coding: self.default_coding,
            length,
            command,
            status,
            sequence,
            pdu_data: None,
        })
    }

    /// Reads one TLV at `cursor`.
    pub fn extract_tlv(&self, cursor: &mut usize) -> Result<Tlv, BufferError> {
        let tag = self.extract_u16(cursor)?;
        let length = self.extract_u16(cursor)?;
        let value = self.extract_byte_array(cursor, length as usize)?;
        Ok(Tlv { tag, value })
    }

    /// Reads one destination address tuple at `cursor`.
    pub fn extract_destination_address(
        &self,
        cursor: &mut usize,
    ) -> Result<DestinationAddress, BufferError> {
        let dest_type = self.extract_byte(cursor)?;
        let ton = self.extract_byte(cursor)?;
        let npi = self.extract_byte(cursor)?;
        let address = self.extract_c_string(cursor);
        Ok(DestinationAddress {
            dest_type,
            ton,
            npi,
            address,
        })
    }

    /// Reads a destination address list (count byte + tuples) at `cursor`.
    pub fn extract_destination_addresses(
        &self,
        cursor: &mut usize,
    ) -> Result<Vec<DestinationAddress>, BufferError> {
        let count = self.extract_byte(cursor)?;
        let mut addresses = Vec::with_capacity(count as usize);
        for _ in 0..count {
            addresses.push(self.extract_destination_address(cursor)?);
        }
        Ok(addresses)
    }

    /// Reads one undelivered destination entry at `cursor`.
    pub fn extract_unsuccess_destination_address(
        &self,
        cursor: &mut usize,
    ) -> Result<UnsuccessDestinationAddress, BufferError> {
        let ton = self.extract_byte(cursor)?;
        let npi = self.extract_byte(cursor)?;
        let address = self.extract_c_string(cursor);
        let error_status = CommandStatus(self.extract_u32(cursor)?);
        Ok(UnsuccessDestinationAddress {
            ton,
            npi,
            address,
            error_status,
        })
    }

    /// Reads an undelivered destination list at `cursor`.
    pub fn extract_unsuccess_destination_addresses(
        &self,
        cursor: &mut usize,
    ) -> Result<Vec<UnsuccessDestinationAddress>, BufferError> {
        let count = self.extract_byte(cursor)?;
        let mut addresses = Vec::with_capacity(count as usize);
        for _ in 0..count {
            addresses.push(self.extract_unsuccess_destination_address(cursor)?);
        }
        Ok(addresses)
    }

    /// Parses the short-message bytes from `offset` to the end of this
    /// buffer into headers and payload.
    ///
    /// When `udhi` is set the block starts with a user-data-header length
    /// byte and its elements. An element length that overruns the declared
    /// block, or the buffer itself, discards the headers parsed so far
    /// and yields the entire buffer as payload, matching the recovery a
    /// live stream needs when a peer miscounts.
    pub fn extract_user_data(&self, udhi: bool, offset: usize) -> UserData {
        let mut user_data = UserData::new();
        let mut offset = offset;

        if udhi {
            match self.parse_udh_block(&mut offset, &mut user_data.headers) {
                Ok(()) => {}
                Err(_) => {
                    debug!(offset, "malformed user data header block, keeping raw payload");
                    user_data.headers.clear();
                    offset = 0;
                }
            }
        }

        if offset < self.data.len() {
            user_data.short_message = self.data[offset..].to_vec();
        } else if offset == 0 {
            user_data.short_message = self.data.clone();
        }
        user_data
    }

    fn parse_udh_block(
        &self,
        offset: &mut usize,
        headers: &mut UserDataHeaderCollection,
    ) -> Result<(), BufferError> {
        let udh_length = self.extract_byte(offset)? as usize;
        let block_end = *offset + udh_length;
        let mut counted = 0usize;

        while *offset < block_end {
            let iei = self.extract_byte(offset)?;
            let element_length = self.extract_byte(offset)? as usize;
            counted += element_length + 2;
            if counted > udh_length {
                return Err(BufferError::InvalidLength(counted));
            }
            let data = self.extract_byte_array(offset, element_length)?;
            headers.push(UserDataHeader::new(iei, data));
        }
        Ok(())
    }

    /// Splits the buffer into transmit-sized chunks of at most
    /// `max_length` bytes.
    pub fn break_into_data_blocks(&self, max_length: usize) -> Vec<Vec<u8>> {
        if max_length == 0 {
            return vec![self.data.clone()];
        }
        self.data.chunks(max_length).map(<[u8]>::to_vec).collect()
    }

    // ── Extraction with decode audit records ──────────────────────────────────

    /// [`SmppBuffer::extract_u32`], additionally producing an audit record.
    pub fn extract_u32_detail(
        &self,
        name: &'static str,
        cursor: &mut usize,
    ) -> Result<PduPropertyDetail, BufferError> {
        let mut detail = PduPropertyDetail::new(*cursor, PduDataType::UInt, name);
        detail.data_block = self.data.get(*cursor..*cursor + 4).map(<[u8]>::to_vec).unwrap_or_default();
        let value = self.extract_u32(cursor)?;
        detail.value = Some(PduValue::UInt(value));
        Ok(detail)
    }

    /// [`SmppBuffer::extract_u16`], additionally producing an audit record.
    pub fn extract_u16_detail(
        &self,
        name: &'static str,
        cursor: &mut usize,
    ) -> Result<PduPropertyDetail, BufferError> {
        let mut detail = PduPropertyDetail::new(*cursor, PduDataType::UShort, name);
        detail.data_block = self.data.get(*cursor..*cursor + 2).map(<[u8]>::to_vec).unwrap_or_default();
        let value = self.extract_u16(cursor)?;
        detail.value = Some(PduValue::UShort(value));
        Ok(detail)
    }

    /// [`SmppBuffer::extract_byte`], additionally producing an audit record.
    pub fn extract_byte_detail(
        &self,
        name: &'static str,
        cursor: &mut usize,
    ) -> Result<PduPropertyDetail, BufferError> {
        let mut detail = PduPropertyDetail::new(*cursor, PduDataType::Byte, name);
        let value = self.extract_byte(cursor)?;
        detail.data_block = vec![value];
        detail.value = Some(PduValue::Byte(value));
        Ok(detail)
    }

    /// [`SmppBuffer::extract_byte_array`], additionally producing an audit
    /// record. Byte arrays decode to nothing beyond their raw bytes.
    pub fn extract_byte_array_detail(
        &self,
        name: &'static str,
        cursor: &mut usize,
        length: usize,
    ) -> Result<PduPropertyDetail, BufferError> {
        let mut detail = PduPropertyDetail::new(*cursor, PduDataType::ByteArray, name);
        detail.data_block = self.extract_byte_array(cursor, length)?;
        Ok(detail)
    }

    /// [`SmppBuffer::extract_c_string`], additionally producing an audit
    /// record. A missing terminator records the single skipped byte with
    /// no decoded value.
    pub fn extract_c_string_detail(
        &self,
        name: &'static str,
        cursor: &mut usize,
    ) -> PduPropertyDetail {
        let mut detail = PduPropertyDetail::new(*cursor, PduDataType::CString, name);
        let start = *cursor;
        let text = self.extract_c_string(cursor);
        if text.is_empty() && *cursor == start + 1 {
            detail.data_block = self.data.get(start).map(|&b| vec![b]).unwrap_or_default();
        } else {
            detail.data_block = self.data[start..*cursor - 1].to_vec();
            detail.value = Some(PduValue::Text(text));
        }
        detail
    }

    /// [`SmppBuffer::extract_encoded_string`], additionally producing an
    /// audit record.
    pub fn extract_encoded_string_detail(
        &self,
        name: &'static str,
        length: usize,
        coding: DataCoding,
        cursor: &mut usize,
    ) -> PduPropertyDetail {
        let mut detail = PduPropertyDetail::new(*cursor, PduDataType::EncodedString, name);
        let start = *cursor;
        let decodable = length > 0 && self.check(start, length).is_ok();
        let text = self.extract_encoded_string(length, coding, cursor);
        detail.data_block = self.data.get(start..*cursor).map(<[u8]>::to_vec).unwrap_or_default();
        if decodable {
            detail.value = Some(PduValue::Text(text));
        }
        detail
    }

    /// Audit records for the four header fields.
    pub fn extract_header_details(
        &self,
        cursor: &mut usize,
    ) -> Result<Vec<PduPropertyDetail>, BufferError> {
        Ok(vec![
            self.extract_u32_detail("Length", cursor)?,
            self.extract_u32_detail("CommandId", cursor)?,
            self.extract_u32_detail("CommandStatus", cursor)?,
            self.extract_u32_detail("Sequence", cursor)?,
        ])
    }

    /// Audit records for one TLV.
    pub fn extract_tlv_details(
        &self,
        details: &mut Vec<PduPropertyDetail>,
        cursor: &mut usize,
    ) -> Result<(), BufferError> {
        details.push(self.extract_u16_detail("Tlv_Tag", cursor)?);
        let length_detail = self.extract_u16_detail("Tlv_Length", cursor)?;
        let length = length_detail.as_u16().unwrap_or(0) as usize;
        details.push(length_detail);
        details.push(self.extract_byte_array_detail("Tlv_Value", cursor, length)?);
        Ok(())
    }

    /// Audit records for one destination address tuple.
    pub fn extract_destination_address_details(
        &self,
        details: &mut Vec<PduPropertyDetail>,
        cursor: &mut usize,
    ) -> Result<(), BufferError> {
        details.push(self.extract_byte_detail("DestAddress_DestType", cursor)?);
        details.push(self.extract_byte_detail("DestAddress_Ton", cursor)?);
        details.push(self.extract_byte_detail("DestAddress_Npi", cursor)?);
        details.push(self.extract_c_string_detail("DestAddress_Addr", cursor));
        Ok(())
    }

    /// Audit records for a destination address list.
    pub fn extract_destination_addresses_details(
        &self,
        details: &mut Vec<PduPropertyDetail>,
        cursor: &mut usize,
    ) -> Result<(), BufferError> {
        let count_detail = self.extract_byte_detail("DestAddress_Count", cursor)?;
        let count = count_detail.as_byte().unwrap_or(0);
        details.push(count_detail);
        for _ in 0..count {
            self.extract_destination_address_details(details, cursor)?;
        }
        Ok(())
    }

    /// Audit records for one undelivered destination entry.
    pub fn extract_unsuccess_destination_address_details(
        &self,
        details: &mut Vec<PduPropertyDetail>,
        cursor: &mut usize,
    ) -> Result<(), BufferError> {
        details.push(self.extract_byte_detail("UnsuccessDestAddress_Ton", cursor)?);
        details.push(self.extract_byte_detail("UnsuccessDestAddress_Npi", cursor)?);
        details.push(self.extract_c_string_detail("UnsuccessDestAddress_Addr", cursor));
        details.push(self.extract_u32_detail("UnsuccessDestAddress_ErrorStatus", cursor)?);
        Ok(())
    }

    /// Audit records for an undelivered destination list.
    pub fn extract_unsuccess_destination_addresses_details(
        &self,
        details: &mut Vec<PduPropertyDetail>,
        cursor: &mut usize,
    ) -> Result<(), BufferError> {
        let count_detail = self.extract_byte_detail("UnsuccessDestAddress_Count", cursor)?;
        let count = count_detail.as_byte().unwrap_or(0);
        details.push(count_detail);
        for _ in 0..count {
            self.extract_unsuccess_destination_address_details(details, cursor)?;
        }
        Ok(())
    }

    /// Audit records for the short-message block, mirroring
    /// [`SmppBuffer::extract_user_data`]. An overrunning element length
    /// stops the header walk; the remainder is recorded as payload.
    pub fn extract_user_data_details(
        &self,
        details: &mut Vec<PduPropertyDetail>,
        udhi: bool,
        offset: usize,
    ) -> Result<(), BufferError> {
        let mut offset = offset;

        if udhi {
            let length_detail = self.extract_byte_detail("UserData_UdhLength", &mut offset)?;
            let udh_length = length_detail.as_byte().unwrap_or(0) as usize;
            details.push(length_detail);

            let block_end = offset + udh_length;
            let mut counted = 0usize;
            while offset < block_end {
                details.push(self.extract_byte_detail("UserData_ElementId", &mut offset)?);
                let element_detail = self.extract_byte_detail("UserData_ElementLength", &mut offset)?;
                let element_length = element_detail.as_byte().unwrap_or(0) as usize;
                details.push(element_detail);

                counted += element_length + 2;
                if counted > udh_length {
                    break;
                }
                details.push(self.extract_byte_array_detail(
                    "UserData_ElementData",
                    &mut offset,
                    element_length,
                )?);
            }
        }

        if offset < self.data.len() {
            let mut detail = PduPropertyDetail::new(offset, PduDataType::ByteArray, "UserData_Payload");
            detail.data_block = self.data[offset..].to_vec();
            details.push(detail);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(bytes: &[u8]) -> SmppBuffer {
        SmppBuffer::from_bytes(DataCoding::Latin1, bytes)
    }

    // ── Append primitives ────────────────────────────────────────────────────

    #[test]
    fn test_integers_are_big_endian() {
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_u32(0x0102_0304);
        buf.add_u16(0xBEEF);
        buf.add_byte(0x7F);

        assert_eq!(buf.bytes(), &[0x01, 0x02, 0x03, 0x04, 0xBE, 0xEF, 0x7F]);
    }

    #[test]
    fn test_add_final_length_prepends_length_plus_four() {
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_bytes(&[0; 12]);
        buf.add_final_length();

        assert_eq!(buf.len(), 16);
        assert_eq!(&buf.bytes()[0..4], &16u32.to_be_bytes());
    }

    #[test]
    fn test_add_c_string_appends_terminator() {
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_c_string("AB");
        buf.add_c_string("");

        assert_eq!(buf.bytes(), &[0x41, 0x42, 0x00, 0x00]);
    }

    #[test]
    fn test_add_time_string_pads_to_fixed_width() {
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_time_string("991224", 8).unwrap();

        assert_eq!(buf.bytes(), &[0x39, 0x39, 0x31, 0x32, 0x32, 0x34, 0x00, 0x00]);
    }

    #[test]
    fn test_add_time_string_empty_appends_single_terminator() {
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_time_string("", 17).unwrap();

        assert_eq!(buf.bytes(), &[0x00]);
    }

    #[test]
    fn test_add_time_string_rejects_oversized_value() {
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        let err = buf.add_time_string("12345678", 8).unwrap_err();
        assert!(matches!(err, BufferError::FieldTooLong { length: 8, max: 7 }));
    }

    #[test]
    fn test_add_time_string_rejects_zero_width() {
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        assert_eq!(
            buf.add_time_string("x", 0),
            Err(BufferError::InvalidLength(0))
        );
    }

    #[test]
    fn test_add_encoded_string_resolves_default_coding() {
        let mut buf = SmppBuffer::new(DataCoding::Ucs2);
        buf.add_encoded_string("A", DataCoding::Default);

        assert_eq!(buf.bytes(), &[0x00, 0x41]);
    }

    #[test]
    fn test_add_tlv_collection_omits_zero_length_entries() {
        let mut collection = TlvCollection::new();
        collection.push(Tlv::new(5, vec![1, 2, 3]));
        collection.push(Tlv::new(6, Vec::new()));

        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_tlv_collection(&collection);

        assert_eq!(buf.bytes(), &[0x00, 0x05, 0x00, 0x03, 1, 2, 3]);
    }

    // ── Extraction primitives ────────────────────────────────────────────────

    #[test]
    fn test_extract_u32_advances_cursor() {
        let buf = buffer(&[0x00, 0x00, 0x00, 0x2A, 0xFF]);
        let mut cursor = 0;

        assert_eq!(buf.extract_u32(&mut cursor).unwrap(), 42);
        assert_eq!(cursor, 4);
    }

    #[test]
    fn test_extract_past_end_reports_underrun() {
        let buf = buffer(&[0x01, 0x02]);
        let mut cursor = 0;

        let err = buf.extract_u32(&mut cursor).unwrap_err();
        assert_eq!(
            err,
            BufferError::Underrun {
                offset: 0,
                needed: 4,
                available: 2
            }
        );
        assert_eq!(cursor, 0, "a failed read must not advance the cursor");
    }

    #[test]
    fn test_extract_c_string_stops_at_terminator() {
        let buf = buffer(&[0x41, 0x42, 0x00, 0x43]);
        let mut cursor = 0;

        assert_eq!(buf.extract_c_string(&mut cursor), "AB");
        assert_eq!(cursor, 3);
    }

    #[test]
    fn test_extract_c_string_on_immediate_terminator() {
        let buf = buffer(&[0x00, 0x41]);
        let mut cursor = 0;

        assert_eq!(buf.extract_c_string(&mut cursor), "");
        assert_eq!(cursor, 1);
    }

    #[test]
    fn test_extract_c_string_without_terminator_recovers() {
        let buf = buffer(&[0x41, 0x42]);
        let mut cursor = 0;

        assert_eq!(buf.extract_c_string(&mut cursor), "");
        assert_eq!(cursor, 1);
    }

    #[test]
    fn test_extract_c_string_past_end_recovers() {
        let buf = buffer(&[0x41]);
        let mut cursor = 5;

        assert_eq!(buf.extract_c_string(&mut cursor), "");
        assert_eq!(cursor, 6);
    }

    #[test]
    fn test_extract_encoded_string_round_trips() {
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_encoded_string("hällo", DataCoding::Latin1);

        let mut cursor = 0;
        let text = buf.extract_encoded_string(5, DataCoding::Latin1, &mut cursor);
        assert_eq!(text, "hällo");
        assert_eq!(cursor, 5);
    }

    #[test]
    fn test_extract_encoded_string_overrun_advances_one() {
        let buf = buffer(&[0x41]);
        let mut cursor = 0;

        assert_eq!(buf.extract_encoded_string(9, DataCoding::Latin1, &mut cursor), "");
        assert_eq!(cursor, 1);
    }

    #[test]
    fn test_extract_encoded_string_zero_length_is_no_op() {
        let buf = buffer(&[0x41]);
        let mut cursor = 0;

        assert_eq!(buf.extract_encoded_string(0, DataCoding::Latin1, &mut cursor), "");
        assert_eq!(cursor, 0);
    }

    #[test]
    fn test_tlv_round_trip() {
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_tlv(&Tlv::new(5, vec![0xDE, 0xAD, 0xBE]));

        let mut cursor = 0;
        let tlv = buf.extract_tlv(&mut cursor).unwrap();
        assert_eq!(tlv.tag, 5);
        assert_eq!(tlv.len(), 3);
        assert_eq!(tlv.value, vec![0xDE, 0xAD, 0xBE]);
        assert_eq!(cursor, 7);
    }

    #[test]
    fn test_destination_addresses_round_trip() {
        let addresses = vec![
            DestinationAddress::new(DestinationAddress::TYPE_SME, 1, 1, "12223334444"),
            DestinationAddress::new(DestinationAddress::TYPE_DISTRIBUTION_LIST, 0, 0, "list-a"),
        ];
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_destination_addresses(&addresses).unwrap();

        let mut cursor = 0;
        let decoded = buf.extract_destination_addresses(&mut cursor).unwrap();
        assert_eq!(decoded, addresses);
        assert_eq!(cursor, buf.len());
    }

    #[test]
    fn test_unsuccess_destination_addresses_round_trip() {
        let addresses = vec![UnsuccessDestinationAddress::new(
            2,
            1,
            "15556667777",
            CommandStatus(0x0000_000B),
        )];
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_unsuccess_destination_addresses(&addresses).unwrap();

        let mut cursor = 0;
        let decoded = buf.extract_unsuccess_destination_addresses(&mut cursor).unwrap();
        assert_eq!(decoded, addresses);
    }

    #[test]
    fn test_from_encoded_string_seeds_the_buffer() {
        let buf = SmppBuffer::from_encoded_string(DataCoding::Latin1, "hi", DataCoding::Ascii);
        assert_eq!(buf.bytes(), b"hi");
    }

    #[test]
    fn test_destination_address_details_follow_the_list() {
        let addresses = vec![
            DestinationAddress::new(DestinationAddress::TYPE_SME, 1, 1, "111"),
            DestinationAddress::new(DestinationAddress::TYPE_SME, 2, 1, "222"),
        ];
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_destination_addresses(&addresses).unwrap();

        let mut details = Vec::new();
        let mut cursor = 0;
        buf.extract_destination_addresses_details(&mut details, &mut cursor)
            .unwrap();

        assert_eq!(cursor, buf.len());
        // count + 2 * (type, ton, npi, addr)
        assert_eq!(details.len(), 9);
        assert_eq!(details[0].as_byte(), Some(2));
        assert_eq!(details[4].name, "DestAddress_Addr");
    }

    #[test]
    fn test_unsuccess_address_details_include_error_status() {
        let addresses = vec![UnsuccessDestinationAddress::new(
            1,
            1,
            "333",
            CommandStatus(0x14),
        )];
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_unsuccess_destination_addresses(&addresses).unwrap();

        let mut details = Vec::new();
        let mut cursor = 0;
        buf.extract_unsuccess_destination_addresses_details(&mut details, &mut cursor)
            .unwrap();

        let status = details.last().unwrap();
        assert_eq!(status.name, "UnsuccessDestAddress_ErrorStatus");
        assert_eq!(status.as_u32(), Some(0x14));
    }

    // ── Header ───────────────────────────────────────────────────────────────

    #[test]
    fn test_add_header_appends_the_three_seed_fields() {
        let header = Header::new(DataCoding::Latin1, CommandId::QuerySm, 8);
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_header(&header);

        assert_eq!(buf.len(), 12);
        assert_eq!(buf.bytes(), SmppBuffer::with_header(DataCoding::Latin1, &header).bytes());
    }

    #[test]
    fn test_extract_header_captures_pdu_span() {
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_u32(CommandId::EnquireLink as u32);
        buf.add_u32(0);
        buf.add_u32(42);
        buf.add_final_length();

        let mut cursor = 0;
        let header = buf.extract_header(&mut cursor).unwrap();
        assert_eq!(cursor, 16);
        assert_eq!(header.length, 16);
        assert_eq!(header.command, CommandId::EnquireLink);
        assert_eq!(header.status, CommandStatus::OK);
        assert_eq!(header.sequence, 42);
        assert_eq!(header.pdu_data.as_ref().unwrap().len(), 16);
    }

    #[test]
    fn test_extract_header_rejects_unknown_command() {
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_u32(0x0000_0077);
        buf.add_u32(0);
        buf.add_u32(1);
        buf.add_final_length();

        let mut cursor = 0;
        assert_eq!(
            buf.extract_header(&mut cursor),
            Err(BufferError::UnknownCommand(0x0000_0077))
        );
    }

    #[test]
    fn test_peek_header_does_not_advance() {
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_u32(CommandId::Unbind as u32);
        buf.add_u32(0);
        buf.add_u32(9);
        buf.add_final_length();

        let header = buf.peek_header(0).unwrap();
        assert_eq!(header.command, CommandId::Unbind);
        assert_eq!(header.sequence, 9);
        assert!(header.pdu_data.is_none());
    }

    #[test]
    fn test_peek_header_on_short_buffer_returns_none() {
        let buf = buffer(&[0x00, 0x00]);
        assert!(buf.peek_header(0).is_none());
    }

    // ── User data ────────────────────────────────────────────────────────────

    #[test]
    fn test_user_data_round_trip_with_headers() {
        let mut user_data = UserData::from_payload(b"hello".to_vec());
        user_data.headers.add_concatenated_8bit(7, 2, 1);

        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_user_data(&user_data).unwrap();

        // sm_length, udh block length, element, payload
        assert_eq!(buf.bytes()[0], 11);
        assert_eq!(buf.bytes()[1], 5);

        let mut cursor = 0;
        let sm_length = buf.extract_byte(&mut cursor).unwrap() as usize;
        let sm_bytes = buf.extract_byte_array(&mut cursor, sm_length).unwrap();
        let block = SmppBuffer::from_bytes(DataCoding::Latin1, &sm_bytes);
        let decoded = block.extract_user_data(true, 0);
        assert_eq!(decoded, user_data);
    }

    #[test]
    fn test_user_data_round_trip_without_headers() {
        let user_data = UserData::from_payload(b"plain".to_vec());

        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_user_data(&user_data).unwrap();
        assert_eq!(buf.bytes()[0], 5);

        let block = SmppBuffer::from_bytes(DataCoding::Latin1, &buf.bytes()[1..]);
        assert_eq!(block.extract_user_data(false, 0), user_data);
    }

    #[test]
    fn test_extract_user_data_recovers_from_overrunning_element() {
        // declared block of 3 bytes, but the element claims 9 bytes
        let bytes = [3u8, 0x00, 9, 0xAA, 0xBB, 0xCC];
        let buf = buffer(&bytes);

        let user_data = buf.extract_user_data(true, 0);
        assert!(user_data.headers.is_empty());
        assert_eq!(user_data.short_message, bytes);
    }

    #[test]
    fn test_extract_user_data_recovers_from_truncated_block() {
        let bytes = [9u8, 0x00, 3];
        let buf = buffer(&bytes);

        let user_data = buf.extract_user_data(true, 0);
        assert!(user_data.headers.is_empty());
        assert_eq!(user_data.short_message, bytes);
    }

    #[test]
    fn test_break_into_data_blocks_chunks_evenly() {
        let buf = buffer(&[1, 2, 3, 4, 5]);
        let blocks = buf.break_into_data_blocks(2);
        assert_eq!(blocks, vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    // ── Audit records ────────────────────────────────────────────────────────

    #[test]
    fn test_detail_extraction_matches_plain_extraction() {
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_u32(CommandId::SubmitSm as u32);
        buf.add_u32(0);
        buf.add_u32(77);
        buf.add_final_length();

        let mut cursor = 0;
        let details = buf.extract_header_details(&mut cursor).unwrap();
        assert_eq!(cursor, 16);

        let names: Vec<&str> = details.iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Length", "CommandId", "CommandStatus", "Sequence"]);
        assert_eq!(details[0].as_u32(), Some(16));
        assert_eq!(details[1].as_u32(), Some(CommandId::SubmitSm as u32));
        assert_eq!(details[3].as_u32(), Some(77));
        assert_eq!(details[3].offset, 12);
        assert_eq!(details[3].data_block, vec![0, 0, 0, 77]);
    }

    #[test]
    fn test_tlv_details_record_offsets_and_raw_bytes() {
        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_tlv(&Tlv::new(0x0210, vec![0x34]));

        let mut details = Vec::new();
        let mut cursor = 0;
        buf.extract_tlv_details(&mut details, &mut cursor).unwrap();

        assert_eq!(details.len(), 3);
        assert_eq!(details[0].as_u16(), Some(0x0210));
        assert_eq!(details[1].as_u16(), Some(1));
        assert_eq!(details[2].data_block, vec![0x34]);
        assert_eq!(cursor, 5);
    }

    #[test]
    fn test_user_data_details_mirror_plain_walk() {
        let mut user_data = UserData::from_payload(b"xy".to_vec());
        user_data.headers.add_concatenated_8bit(1, 2, 1);

        let mut buf = SmppBuffer::new(DataCoding::Latin1);
        buf.add_user_data(&user_data).unwrap();
        let block = SmppBuffer::from_bytes(DataCoding::Latin1, &buf.bytes()[1..]);

        let mut details = Vec::new();
        block.extract_user_data_details(&mut details, true, 0).unwrap();

        let names: Vec<&str> = details.iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "UserData_UdhLength",
                "UserData_ElementId",
                "UserData_ElementLength",
                "UserData_ElementData",
                "UserData_Payload",
            ]
        );
        assert_eq!(details[4].data_block, b"xy");
    }

    #[test]
    fn test_c_string_detail_without_terminator_records_skipped_byte() {
        let buf = buffer(&[0x41, 0x42]);
        let mut cursor = 0;

        let detail = buf.extract_c_string_detail("Anything", &mut cursor);
        assert_eq!(detail.data_block, vec![0x41]);
        assert!(detail.value.is_none());
        assert_eq!(cursor, 1);
    }
}
