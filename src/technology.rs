// src/technology.rs
// Technology names reported for a tag and the descriptors the diagnostics
// report needs for the two MIFARE families.

use thiserror::Error;

// Namespace shared by every fully-qualified technology name.
pub const TECH_NAMESPACE: &str = "android.nfc.tech.";

pub const TECH_NFC_A: &str = "android.nfc.tech.NfcA";
pub const TECH_MIFARE_CLASSIC: &str = "android.nfc.tech.MifareClassic";
pub const TECH_MIFARE_ULTRALIGHT: &str = "android.nfc.tech.MifareUltralight";
pub const TECH_NDEF: &str = "android.nfc.tech.Ndef";

pub const SIZE_MINI: usize = 320;
pub const SIZE_1K: usize = 1024;
pub const SIZE_2K: usize = 2048;
pub const SIZE_4K: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Technology {
    MifareClassic,
    MifareUltralight,
    Other,
}

impl Technology {
    pub fn from_name(name: &str) -> Self {
        match name {
            TECH_MIFARE_CLASSIC => Technology::MifareClassic,
            TECH_MIFARE_ULTRALIGHT => Technology::MifareUltralight,
            _ => Technology::Other,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TechError {
    #[error("tag does not support {0}")]
    Unsupported(&'static str),
    #[error("unsupported MIFARE Classic size: {0} bytes")]
    UnsupportedSize(usize),
    #[error("{0}")]
    Transceive(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MifareClassicType {
    Classic,
    Plus,
    Pro,
    Unknown,
}

impl MifareClassicType {
    pub fn label(self) -> &'static str {
        match self {
            MifareClassicType::Classic => "Classic",
            MifareClassicType::Plus => "Plus",
            MifareClassicType::Pro => "Pro",
            MifareClassicType::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MifareClassicInfo {
    pub card_type: MifareClassicType,
    pub size: usize,
    pub sector_count: usize,
    pub block_count: usize,
}

impl MifareClassicInfo {
    // Derive the sector layout from the memory size. Sectors 32 and up
    // (4K cards only) hold 16 blocks instead of 4.
    pub fn from_size(card_type: MifareClassicType, size: usize) -> Result<Self, TechError> {
        let sector_count = match size {
            SIZE_MINI => 5,
            SIZE_1K => 16,
            SIZE_2K => 32,
            SIZE_4K => 40,
            other => return Err(TechError::UnsupportedSize(other)),
        };
        let block_count = if sector_count < 32 {
            sector_count * 4
        } else {
            32 * 4 + (sector_count - 32) * 16
        };
        Ok(MifareClassicInfo {
            card_type,
            size,
            sector_count,
            block_count,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MifareUltralightType {
    Ultralight,
    UltralightC,
    Unknown,
}

impl MifareUltralightType {
    pub fn label(self) -> &'static str {
        match self {
            MifareUltralightType::Ultralight => "Ultralight",
            MifareUltralightType::UltralightC => "Ultralight C",
            MifareUltralightType::Unknown => "Unknown",
        }
    }
}

// Source of technology-specific descriptors. Lookups may fail (for example
// when the tag leaves the field mid-read); callers render the error.
pub trait TechnologyDetails {
    fn mifare_classic(&self) -> Result<MifareClassicInfo, TechError>;
    fn mifare_ultralight(&self) -> Result<MifareUltralightType, TechError>;
}

// Descriptors resolved ahead of time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDetails {
    pub classic: Result<MifareClassicInfo, TechError>,
    pub ultralight: Result<MifareUltralightType, TechError>,
}

impl Default for ResolvedDetails {
    fn default() -> Self {
        ResolvedDetails {
            classic: Err(TechError::Unsupported("MifareClassic")),
            ultralight: Err(TechError::Unsupported("MifareUltralight")),
        }
    }
}

impl TechnologyDetails for ResolvedDetails {
    fn mifare_classic(&self) -> Result<MifareClassicInfo, TechError> {
        self.classic.clone()
    }

    fn mifare_ultralight(&self) -> Result<MifareUltralightType, TechError> {
        self.ultralight.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_layouts_follow_size() {
        let mini = MifareClassicInfo::from_size(MifareClassicType::Classic, SIZE_MINI).unwrap();
        assert_eq!((mini.sector_count, mini.block_count), (5, 20));
        let one_k = MifareClassicInfo::from_size(MifareClassicType::Classic, SIZE_1K).unwrap();
        assert_eq!((one_k.sector_count, one_k.block_count), (16, 64));
        let two_k = MifareClassicInfo::from_size(MifareClassicType::Plus, SIZE_2K).unwrap();
        assert_eq!((two_k.sector_count, two_k.block_count), (32, 128));
        let four_k = MifareClassicInfo::from_size(MifareClassicType::Classic, SIZE_4K).unwrap();
        assert_eq!((four_k.sector_count, four_k.block_count), (40, 256));
    }

    #[test]
    fn odd_classic_size_is_an_error() {
        assert_eq!(
            MifareClassicInfo::from_size(MifareClassicType::Classic, 512),
            Err(TechError::UnsupportedSize(512))
        );
    }

    #[test]
    fn technology_names_map_to_families() {
        assert_eq!(Technology::from_name(TECH_MIFARE_CLASSIC), Technology::MifareClassic);
        assert_eq!(Technology::from_name(TECH_MIFARE_ULTRALIGHT), Technology::MifareUltralight);
        assert_eq!(Technology::from_name("MifareClassic"), Technology::Other);
        assert_eq!(Technology::from_name(TECH_NFC_A), Technology::Other);
    }

    #[test]
    fn labels() {
        assert_eq!(MifareClassicType::Pro.label(), "Pro");
        assert_eq!(MifareUltralightType::UltralightC.label(), "Ultralight C");
        assert_eq!(MifareUltralightType::Unknown.label(), "Unknown");
    }
}
