// src/apdu.rs
use pcsc::Card;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Transmit Error: {0}")]
    Transmit(#[from] pcsc::Error),
    #[error("{op} Failed: {status:02X?}")]
    Status { op: &'static str, status: Vec<u8> },
    #[error("Could not authenticate sector at block {0}")]
    Auth(u8),
    #[error("No NDEF container found (Tag 0x03 missing)")]
    NoNdefContainer,
    #[error("No data could be read from the card")]
    NoData,
}

// Send a pseudo-APDU and strip the status word, requiring 0x90 0x00
fn transmit(card: &Card, apdu: &[u8], op: &'static str) -> Result<Vec<u8>, ReaderError> {
    let mut recv_buffer = [0u8; 258];
    let resp = card.transmit(apdu, &mut recv_buffer)?;
    match resp {
        [data @ .., 0x90, 0x00] => Ok(data.to_vec()),
        _ => Err(ReaderError::Status {
            op,
            status: resp.to_vec(),
        }),
    }
}

// Get Data (UID): FF CA 00 00 00
pub fn get_uid(card: &Card) -> Result<Vec<u8>, ReaderError> {
    transmit(card, &[0xFF, 0xCA, 0x00, 0x00, 0x00], "Get UID")
}

// Load Authentication Keys into Reader Memory (Location 0x00 or 0x20)
// ACR122U standard: FF 82 00 key_num 06 [KEY]
pub fn load_key(card: &Card, key: &[u8; 6]) -> Result<(), ReaderError> {
    let mut apdu = vec![0xFF, 0x82, 0x00, 0x00, 0x06];
    apdu.extend_from_slice(key);
    transmit(card, &apdu, "Load Key").map(|_| ())
}

// Authenticate Block
// CMD: FF 86 00 00 05 01 00 Block KeyType KeyNumber
// KeyType: 0x60 (A), 0x61 (B)
pub fn authenticate(card: &Card, block: u8, key_type: u8) -> Result<(), ReaderError> {
    let apdu = [
        0xFF, 0x86, 0x00, 0x00, 0x05, 0x01, 0x00, block, key_type, 0x00,
    ];
    transmit(card, &apdu, "Auth").map(|_| ())
}

pub fn read_binary(card: &Card, block: u8, length: u8) -> Result<Vec<u8>, ReaderError> {
    // Read: FF B0 00 Block Len
    transmit(card, &[0xFF, 0xB0, 0x00, block, length], "Read")
}
