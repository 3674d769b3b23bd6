// src/ndef.rs
use std::ops::Range;

use thiserror::Error;

use crate::types::NdefRecord;

const TLV_NULL: u8 = 0x00;
const TLV_NDEF: u8 = 0x03;
const TLV_TERMINATOR: u8 = 0xFE;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NdefError {
    #[error("No NDEF TLV found")]
    NoNdefTlv,
    #[error("Incomplete data: need {needed} bytes, have {available}")]
    Incomplete { needed: usize, available: usize },
    #[error("Empty NDEF")]
    Empty,
    #[error("Truncated record at offset {0}")]
    TruncatedRecord(usize),
}

fn incomplete(needed: usize, memory: &[u8]) -> NdefError {
    NdefError::Incomplete {
        needed,
        available: memory.len(),
    }
}

// Walk the TLV blocks and return the value range of the NDEF TLV. Running
// out of memory before the terminator is `Incomplete`, with the number of
// bytes needed to make progress.
fn locate_ndef_tlv(memory: &[u8]) -> Result<Range<usize>, NdefError> {
    let mut cursor = 0;

    while cursor < memory.len() {
        let tag = memory[cursor];
        cursor += 1;

        match tag {
            TLV_NULL => continue,
            TLV_TERMINATOR => return Err(NdefError::NoNdefTlv),
            _ => {}
        }

        // L is 1 byte, or 0xFF followed by a 2-byte big-endian length
        let first = *memory.get(cursor).ok_or(incomplete(cursor + 1, memory))?;
        cursor += 1;
        let len = if first == 0xFF {
            let b = memory
                .get(cursor..cursor + 2)
                .ok_or(incomplete(cursor + 2, memory))?;
            cursor += 2;
            u16::from_be_bytes([b[0], b[1]]) as usize
        } else {
            first as usize
        };

        if cursor + len > memory.len() {
            return Err(incomplete(cursor + len, memory));
        }

        if tag == TLV_NDEF {
            return Ok(cursor..cursor + len);
        }

        // Lock/memory control or proprietary TLV
        cursor += len;
    }

    Err(incomplete(cursor + 1, memory))
}

// How many bytes of tag memory cover the NDEF TLV, as far as can be told
// from what has been read so far.
pub fn ndef_bytes_needed(memory: &[u8]) -> Result<usize, NdefError> {
    match locate_ndef_tlv(memory) {
        Ok(range) => Ok(range.end),
        Err(NdefError::Incomplete { needed, .. }) => Ok(needed),
        Err(e) => Err(e),
    }
}

// Locate the NDEF message inside raw tag memory and return its bytes
// without the TLV header.
pub fn find_ndef_message(memory: &[u8]) -> Result<&[u8], NdefError> {
    let range = locate_ndef_tlv(memory)?;
    if range.is_empty() {
        return Err(NdefError::Empty);
    }
    Ok(&memory[range])
}

fn take<'a>(data: &'a [u8], cursor: &mut usize, len: usize) -> Result<&'a [u8], NdefError> {
    let start = *cursor;
    let slice = data
        .get(start..start + len)
        .ok_or(NdefError::TruncatedRecord(start))?;
    *cursor += len;
    Ok(slice)
}

// Split an NDEF message into records. Payloads are returned untouched.
pub fn parse_ndef_records(data: &[u8]) -> Result<Vec<NdefRecord>, NdefError> {
    let mut records = Vec::new();
    let mut cursor = 0;

    while cursor < data.len() {
        let header = data[cursor];
        let tnf = header & 0x07; // Last 3 bits
        let is_short_record = (header & 0x10) != 0; // SR flag
        let has_id = (header & 0x08) != 0; // IL flag
        let is_me = (header & 0x40) != 0; // Message End flag

        cursor += 1;

        // 1. Get Type Length
        let type_len = take(data, &mut cursor, 1)?[0] as usize;

        // 2. Get Payload Length (1 byte for Short Record, 4 bytes otherwise)
        let payload_len = if is_short_record {
            take(data, &mut cursor, 1)?[0] as usize
        } else {
            let b = take(data, &mut cursor, 4)?;
            u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as usize
        };

        // 3. Get ID Length (if present)
        let id_len = if has_id {
            take(data, &mut cursor, 1)?[0] as usize
        } else {
            0
        };

        // 4. Extract Type
        let record_type = take(data, &mut cursor, type_len)?.to_vec();

        // 5. Extract ID
        let id = if has_id {
            Some(take(data, &mut cursor, id_len)?.to_vec())
        } else {
            None
        };

        // 6. Extract Payload
        let payload = take(data, &mut cursor, payload_len)?.to_vec();

        records.push(NdefRecord {
            tnf,
            record_type,
            payload,
            id,
        });

        if is_me {
            break;
        }
    }

    Ok(records)
}
