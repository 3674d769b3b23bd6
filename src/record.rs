// src/record.rs

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use url::Url;

use crate::types::NdefRecord;

pub const BLUETOOTH_OOB_TYPE: &[u8] = b"application/vnd.bluetooth.ep.oob";

// `Absent` stands in for records without a payload and renders as `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeByte {
    Absent,
    Byte(u8),
}

impl TypeByte {
    pub fn as_i16(self) -> i16 {
        match self {
            TypeByte::Absent => -1,
            TypeByte::Byte(b) => b as i16,
        }
    }
}

impl fmt::Display for TypeByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i16())
    }
}

pub type DecodedMap = BTreeMap<TypeByte, String>;

pub fn type_byte(payload: &[u8]) -> TypeByte {
    match payload.first() {
        Some(&b) => TypeByte::Byte(b),
        None => TypeByte::Absent,
    }
}

// Decode every record, keeping only the first one seen for each type byte.
pub fn decode_all_by_type(records: &[NdefRecord]) -> DecodedMap {
    let mut decoded = DecodedMap::new();
    for (index, record) in records.iter().enumerate() {
        let key = type_byte(&record.payload);
        if decoded.contains_key(&key) {
            debug!("Skipping record {} with duplicate type byte {}", index, key);
            continue;
        }
        decoded.insert(key, decode_by_type(record));
    }
    decoded
}

pub fn decode_by_type(record: &NdefRecord) -> String {
    if record.record_type == BLUETOOTH_OOB_TYPE {
        return decode_bluetooth_oob(&record.payload);
    }
    let text = decode_header_stripped(&record.payload);
    if let Err(err) = Url::parse(&text) {
        debug!("Record text {:?} is not an absolute URI: {}", text, err);
    }
    text
}

// Payload layout: 2-byte length, then the address stored least significant
// byte first. Everything from index 2 on is emitted in reverse.
fn decode_bluetooth_oob(payload: &[u8]) -> String {
    if payload.len() <= 2 {
        return String::new();
    }
    payload[2..]
        .iter()
        .rev()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

// Skip the header byte, decode the rest as US-ASCII and trim control
// characters and spaces from both ends.
pub fn decode_header_stripped(payload: &[u8]) -> String {
    if payload.is_empty() {
        return String::new();
    }
    let text: String = payload[1..]
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
        .collect();
    text.trim_matches(|c: char| c <= ' ').to_string()
}

// Header-stripped text of the first record, if any.
pub fn decode_message(records: &[NdefRecord]) -> Option<String> {
    records.first().map(|r| decode_header_stripped(&r.payload))
}

pub fn extract_types(
    records: &[NdefRecord],
) -> impl Iterator<Item = TypeByte> + Clone + '_ {
    records.iter().map(|r| type_byte(&r.payload))
}
