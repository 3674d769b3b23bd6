// src/cards.rs
use std::collections::HashMap;

use lazy_static::lazy_static;
use log::{debug, warn};
use pcsc::Card;

use crate::apdu::{self, ReaderError};
use crate::ndef;
use crate::technology::{
    MifareClassicInfo, MifareClassicType, MifareUltralightType, ResolvedDetails, SIZE_1K,
    SIZE_4K, SIZE_MINI, TECH_MIFARE_CLASSIC, TECH_MIFARE_ULTRALIGHT, TECH_NDEF, TECH_NFC_A,
};

pub const CARD_TYPE_MIFARE_1K: u8 = 0x6a; // MIFARE Classic 1K
pub const CARD_TYPE_NTAG: u8 = 0x68; // NTAG215/Ultralight

// Factory default and widely published transport keys
pub const COMMON_KEYS: [[u8; 6]; 8] = [
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5],
    [0xD3, 0xF7, 0xD3, 0xF7, 0xD3, 0xF7],
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    [0xB0, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5],
    [0x4D, 0x3A, 0x99, 0xC3, 0x51, 0xDD],
    [0x1A, 0x98, 0x2C, 0x7E, 0x45, 0x9A],
    [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Classic { size: usize },
    Ultralight,
    UltralightC,
    Unknown,
}

lazy_static! {
    // PC/SC Part 3 card names (ATR bytes 13-14)
    static ref CARD_NAMES: HashMap<u16, CardKind> = {
        let mut m = HashMap::new();
        m.insert(0x0001, CardKind::Classic { size: SIZE_1K });
        m.insert(0x0002, CardKind::Classic { size: SIZE_4K });
        m.insert(0x0026, CardKind::Classic { size: SIZE_MINI });
        m.insert(0x0003, CardKind::Ultralight);
        m.insert(0x003A, CardKind::UltralightC);
        m
    };
}

impl CardKind {
    pub fn from_atr(atr: &[u8]) -> Self {
        if atr.len() > 14 {
            let name = u16::from_be_bytes([atr[13], atr[14]]);
            if let Some(kind) = CARD_NAMES.get(&name) {
                return *kind;
            }
        }
        // Fall back on the ATR checksum byte
        match atr.last() {
            Some(&CARD_TYPE_MIFARE_1K) => CardKind::Classic { size: SIZE_1K },
            Some(&CARD_TYPE_NTAG) => CardKind::Ultralight,
            _ => CardKind::Unknown,
        }
    }

    pub fn technologies(self) -> Vec<String> {
        let mut techs = vec![TECH_NFC_A.to_string()];
        match self {
            CardKind::Classic { .. } => techs.push(TECH_MIFARE_CLASSIC.to_string()),
            CardKind::Ultralight | CardKind::UltralightC => {
                techs.push(TECH_MIFARE_ULTRALIGHT.to_string())
            }
            CardKind::Unknown => {}
        }
        techs.push(TECH_NDEF.to_string());
        techs
    }

    pub fn details(self) -> ResolvedDetails {
        let mut details = ResolvedDetails::default();
        match self {
            CardKind::Classic { size } => {
                details.classic = MifareClassicInfo::from_size(MifareClassicType::Classic, size);
            }
            CardKind::Ultralight => details.ultralight = Ok(MifareUltralightType::Ultralight),
            CardKind::UltralightC => details.ultralight = Ok(MifareUltralightType::UltralightC),
            CardKind::Unknown => {}
        }
        details
    }
}

// Sectors 32+ of a 4K card hold 16 blocks
pub fn get_mifare_data_blocks(size: usize) -> Vec<u8> {
    let info = match MifareClassicInfo::from_size(MifareClassicType::Classic, size) {
        Ok(info) => info,
        Err(_) => return Vec::new(),
    };
    let mut blocks = Vec::new();
    let mut first_block = 0usize;
    for sector in 0..info.sector_count {
        let blocks_in_sector = if sector < 32 { 4 } else { 16 };
        if sector > 0 {
            for offset in 0..blocks_in_sector - 1 {
                blocks.push((first_block + offset) as u8);
            }
        }
        first_block += blocks_in_sector;
    }
    blocks
}

fn is_sector_start(block: u8) -> bool {
    let block = block as usize;
    if block < 128 {
        block % 4 == 0
    } else {
        (block - 128) % 16 == 0
    }
}

fn authenticate_sector(card: &Card, block: u8) -> Result<(), ReaderError> {
    for key in COMMON_KEYS.iter() {
        if apdu::load_key(card, key).is_ok()
            // Try Key A (0x60) or Key B (0x61)
            && (apdu::authenticate(card, block, 0x60).is_ok()
                || apdu::authenticate(card, block, 0x61).is_ok())
        {
            return Ok(());
        }
    }
    Err(ReaderError::Auth(block))
}

// Stop once the NDEF TLV is fully read, or once the terminator shows
// there is none
fn ndef_complete(data: &[u8]) -> bool {
    ndef::ndef_bytes_needed(data).map_or(true, |needed| data.len() >= needed)
}

pub fn read_mifare(card: &Card, size: usize) -> Result<Vec<u8>, ReaderError> {
    let mut full_data = Vec::new();

    for block in get_mifare_data_blocks(size) {
        if is_sector_start(block) {
            if let Err(e) = authenticate_sector(card, block) {
                // Can't get into this sector, keep whatever was read so far
                warn!("{}. Stopping.", e);
                break;
            }
        }

        match apdu::read_binary(card, block, 16) {
            Ok(data) => {
                full_data.extend_from_slice(&data);
                if ndef_complete(&full_data) {
                    break;
                }
            }
            Err(e) => {
                debug!("Read of block {} failed: {}", block, e);
                break;
            }
        }
    }

    if full_data.is_empty() {
        return Err(ReaderError::NoData);
    }

    Ok(full_data)
}

// Page to read next, or None once the NDEF TLV is covered. Reads start at
// page 4, 4 bytes per page.
fn next_ultralight_page(data: &[u8]) -> Result<Option<u8>, ReaderError> {
    let needed = ndef::ndef_bytes_needed(data).map_err(|_| ReaderError::NoNdefContainer)?;
    if data.len() >= needed {
        return Ok(None);
    }
    Ok(u8::try_from(4 + data.len() / 4).ok())
}

pub fn read_ultralight(card: &Card) -> Result<Vec<u8>, ReaderError> {
    // 1. Read pages 4-7, where the TLV area starts
    let mut full_data = apdu::read_binary(card, 4, 16)?;

    // 2. Keep reading 4 pages at a time until the NDEF TLV is covered
    while let Some(page) = next_ultralight_page(&full_data)? {
        match apdu::read_binary(card, page, 16) {
            Ok(data) if !data.is_empty() => full_data.extend(data),
            Ok(_) => break,
            Err(e) => {
                debug!("Read of page {} failed: {}", page, e);
                break;
            }
        }
    }

    Ok(full_data)
}
