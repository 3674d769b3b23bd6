pub mod apdu;
pub mod cards;
pub mod config;
pub mod diagnostics;
pub mod ndef;
pub mod nfc_service;
pub mod record;
pub mod technology;
pub mod types;
pub mod ws;

pub use diagnostics::describe;
pub use record::{
    DecodedMap, TypeByte, decode_all_by_type, decode_by_type, decode_header_stripped,
    decode_message, extract_types,
};
pub use technology::{ResolvedDetails, TechError, TechnologyDetails};
pub use types::NdefRecord;
