// src/diagnostics.rs
use log::trace;
use num_bigint::BigUint;

use crate::technology::{TECH_NAMESPACE, Technology, TechnologyDetails};

// Last stored byte first
pub fn to_hex(id: &[u8]) -> String {
    id.iter()
        .rev()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn to_reversed_hex(id: &[u8]) -> String {
    id.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

// First byte is least significant
pub fn to_dec(id: &[u8]) -> BigUint {
    BigUint::from_bytes_le(id)
}

pub fn to_reversed_dec(id: &[u8]) -> BigUint {
    BigUint::from_bytes_be(id)
}

pub fn strip_namespace(tech: &str) -> &str {
    tech.strip_prefix(TECH_NAMESPACE).unwrap_or(tech)
}

pub fn describe(id: &[u8], technologies: &[String], details: &dyn TechnologyDetails) -> String {
    let names: Vec<&str> = technologies.iter().map(|t| strip_namespace(t)).collect();
    let mut lines = vec![
        format!("ID (hex): {}", to_hex(id)),
        format!("ID (reversed hex): {}", to_reversed_hex(id)),
        format!("ID (dec): {}", to_dec(id)),
        format!("ID (reversed dec): {}", to_reversed_dec(id)),
        format!("Technologies: {}", names.join(", ")),
    ];

    for tech in technologies {
        match Technology::from_name(tech) {
            Technology::MifareClassic => match details.mifare_classic() {
                Ok(info) => {
                    lines.push(format!("Mifare Classic type: {}", info.card_type.label()));
                    lines.push(format!("Mifare size: {} bytes", info.size));
                    lines.push(format!("Mifare sectors: {}", info.sector_count));
                    lines.push(format!("Mifare blocks: {}", info.block_count));
                }
                Err(e) => lines.push(format!("Mifare classic error: {}", e)),
            },
            Technology::MifareUltralight => match details.mifare_ultralight() {
                Ok(kind) => lines.push(format!("Mifare Ultralight type: {}", kind.label())),
                Err(e) => lines.push(format!("Mifare ultralight error: {}", e)),
            },
            Technology::Other => {}
        }
    }

    let report = lines.join("\n");
    trace!("{}", report);
    report
}
