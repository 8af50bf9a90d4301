//! Typed field blocks that ride inside PDU bodies.
//!
//! These are the composite wire structures shared by several PDU kinds:
//! optional TLV parameters, destination address tuples, user data headers,
//! and the short-message user data block. The byte codec in
//! [`crate::protocol::buffer`] owns their exact wire representation; the
//! structs here own their invariants.

use serde::{Deserialize, Serialize};

use crate::protocol::pdu::CommandStatus;

// ── TLV optional parameters ───────────────────────────────────────────────────

/// Well-known optional parameter tags.
pub mod tags {
    pub const RECEIPTED_MESSAGE_ID: u16 = 0x001E;
    pub const USER_MESSAGE_REFERENCE: u16 = 0x0204;
    pub const SAR_MSG_REF_NUM: u16 = 0x020C;
    pub const SAR_TOTAL_SEGMENTS: u16 = 0x020E;
    pub const SAR_SEGMENT_SEQNUM: u16 = 0x020F;
    pub const SC_INTERFACE_VERSION: u16 = 0x0210;
    pub const MESSAGE_PAYLOAD: u16 = 0x0424;
    pub const MORE_MESSAGES_TO_SEND: u16 = 0x0426;
}

/// One tag-length-value optional parameter.
///
/// The length field of the wire form is always `value.len()`; it is not
/// stored separately, so the two cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tlv {
    /// Parameter tag, big-endian on the wire.
    pub tag: u16,
    /// Raw parameter bytes, exactly `length` of them.
    pub value: Vec<u8>,
}

impl Tlv {
    pub fn new(tag: u16, value: Vec<u8>) -> Self {
        Self { tag, value }
    }

    /// Wire value of the length field.
    pub fn len(&self) -> u16 {
        self.value.len() as u16
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Ordered list of optional parameters, keyed by tag for point lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlvCollection(Vec<Tlv>);

impl TlvCollection {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, tlv: Tlv) {
        self.0.push(tlv);
    }

    /// First parameter carrying `tag`, if present.
    pub fn find(&self, tag: u16) -> Option<&Tlv> {
        self.0.iter().find(|tlv| tlv.tag == tag)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tlv> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a TlvCollection {
    type Item = &'a Tlv;
    type IntoIter = std::slice::Iter<'a, Tlv>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── Destination addresses ─────────────────────────────────────────────────────

/// One destination of a multi-recipient submit.
///
/// `dest_type` distinguishes an SME address (1) from a distribution list
/// (2); `ton` and `npi` are the usual numeric type-of-number and
/// numbering-plan codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationAddress {
    pub dest_type: u8,
    pub ton: u8,
    pub npi: u8,
    /// Zero-terminated ASCII on the wire.
    pub address: String,
}

impl DestinationAddress {
    pub const TYPE_SME: u8 = 1;
    pub const TYPE_DISTRIBUTION_LIST: u8 = 2;

    pub fn new(dest_type: u8, ton: u8, npi: u8, address: impl Into<String>) -> Self {
        Self {
            dest_type,
            ton,
            npi,
            address: address.into(),
        }
    }
}

/// A destination the message center could not deliver to, with the
/// status explaining why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsuccessDestinationAddress {
    pub ton: u8,
    pub npi: u8,
    pub address: String,
    pub error_status: CommandStatus,
}

impl UnsuccessDestinationAddress {
    pub fn new(ton: u8, npi: u8, address: impl Into<String>, error_status: CommandStatus) -> Self {
        Self {
            ton,
            npi,
            address: address.into(),
            error_status,
        }
    }
}

// ── User data headers ─────────────────────────────────────────────────────────

/// Well-known information element identifiers.
pub mod iei {
    /// Concatenated short messages, 8-bit reference number.
    pub const CONCATENATED_8BIT: u8 = 0x00;
    /// Application port addressing, 16-bit ports.
    pub const APPLICATION_PORT_16BIT: u8 = 0x05;
    /// Concatenated short messages, 16-bit reference number.
    pub const CONCATENATED_16BIT: u8 = 0x08;
}

/// One information element of a user data header block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDataHeader {
    /// Information element identifier.
    pub iei: u8,
    /// Element payload; the wire length byte is always `data.len()`.
    pub data: Vec<u8>,
}

impl UserDataHeader {
    pub fn new(iei: u8, data: Vec<u8>) -> Self {
        Self { iei, data }
    }

    /// Wire value of the element length byte.
    pub fn len(&self) -> u8 {
        self.data.len() as u8
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Ordered collection of user data headers.
///
/// Insertion order is wire order; lookups by identifier return the first
/// matching element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDataHeaderCollection(Vec<UserDataHeader>);

impl UserDataHeaderCollection {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, header: UserDataHeader) {
        self.0.push(header);
    }

    /// Adds an element from an identifier and its payload.
    pub fn add(&mut self, iei: u8, data: Vec<u8>) {
        self.0.push(UserDataHeader::new(iei, data));
    }

    /// Adds the 8-bit concatenation element for one part of a split
    /// message: shared reference, total part count, 1-based position.
    pub fn add_concatenated_8bit(&mut self, msg_ref: u8, total: u8, seq_num: u8) {
        self.add(iei::CONCATENATED_8BIT, vec![msg_ref, total, seq_num]);
    }

    /// First element with the given identifier, if present.
    pub fn find(&self, iei: u8) -> Option<&UserDataHeader> {
        self.0.iter().find(|h| h.iei == iei)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UserDataHeader> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Parses a standalone user-data-header block: a length byte covering
    /// the elements, then `(iei, length, data)` triples.
    ///
    /// Returns `None` when an element length overruns the declared block
    /// or the block overruns the input.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let (&block_len, rest) = bytes.split_first()?;
        let block = rest.get(..block_len as usize)?;

        let mut collection = Self::new();
        let mut offset = 0usize;
        while offset < block.len() {
            let iei = *block.get(offset)?;
            let len = *block.get(offset + 1)? as usize;
            let data = block.get(offset + 2..offset + 2 + len)?;
            collection.add(iei, data.to_vec());
            offset += 2 + len;
        }
        Some(collection)
    }
}

impl<'a> IntoIterator for &'a UserDataHeaderCollection {
    type Item = &'a UserDataHeader;
    type IntoIter = std::slice::Iter<'a, UserDataHeader>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── User data ─────────────────────────────────────────────────────────────────

/// The decoded short-message field: optional header block plus payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub headers: UserDataHeaderCollection,
    pub short_message: Vec<u8>,
}

impl UserData {
    pub fn new() -> Self {
        Self::default()
    }

    /// A user data block holding only a payload.
    pub fn from_payload(short_message: Vec<u8>) -> Self {
        Self {
            headers: UserDataHeaderCollection::new(),
            short_message,
        }
    }
}

// ── Decode diagnostics ────────────────────────────────────────────────────────

/// Declared type of a [`PduPropertyDetail`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PduDataType {
    Byte,
    UShort,
    UInt,
    CString,
    EncodedString,
    ByteArray,
}

/// Decoded value of a [`PduPropertyDetail`], when the field has one
/// beyond its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PduValue {
    Byte(u8),
    UShort(u16),
    UInt(u32),
    Text(String),
}

/// One record of the decode audit trail: where a field sat in the PDU,
/// what type it declared, and what it decoded to.
///
/// Details exist purely for diagnostics; producing them never changes a
/// decode result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PduPropertyDetail {
    /// Byte offset of the field within the PDU.
    pub offset: usize,
    pub data_type: PduDataType,
    pub name: &'static str,
    /// The raw bytes the field occupied.
    pub data_block: Vec<u8>,
    /// The decoded value, absent for raw byte arrays and failed text
    /// decodes.
    pub value: Option<PduValue>,
}

impl PduPropertyDetail {
    pub fn new(offset: usize, data_type: PduDataType, name: &'static str) -> Self {
        Self {
            offset,
            data_type,
            name,
            data_block: Vec::new(),
            value: None,
        }
    }

    /// The decoded u32, when this detail holds one.
    pub fn as_u32(&self) -> Option<u32> {
        match self.value {
            Some(PduValue::UInt(v)) => Some(v),
            _ => None,
        }
    }

    /// The decoded u16, when this detail holds one.
    pub fn as_u16(&self) -> Option<u16> {
        match self.value {
            Some(PduValue::UShort(v)) => Some(v),
            _ => None,
        }
    }

    /// The decoded byte, when this detail holds one.
    pub fn as_byte(&self) -> Option<u8> {
        match self.value {
            Some(PduValue::Byte(v)) => Some(v),
            _ => None,
        }
    }
}
