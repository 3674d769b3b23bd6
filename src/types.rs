// src/types.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// Messages sent TO the WebSocket client (Frontend)
#[allow(non_camel_case_types)]
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum OutgoingMessage {
    READER_STATUS {
        success: bool,
    },
    CARD_STATUS {
        success: bool,
        message: String,
    },
    TAG_READ {
        uid: String,
        // Keyed by the rendered type byte ("-1" for records without payload)
        records: BTreeMap<String, String>,
        message: Option<String>,
        diagnostics: String,
        error: Option<String>,
    },
    READER_ERROR {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdefRecord {
    pub tnf: u8, // Type Name Format (How to interpret the type)
    pub record_type: Vec<u8>,
    pub payload: Vec<u8>,
    pub id: Option<Vec<u8>>,
}

impl NdefRecord {
    // Well-known record (TNF 1) without an ID field.
    pub fn well_known(record_type: &[u8], payload: &[u8]) -> Self {
        NdefRecord {
            tnf: 0x01,
            record_type: record_type.to_vec(),
            payload: payload.to_vec(),
            id: None,
        }
    }

    // MIME-typed record (TNF 2) without an ID field.
    pub fn mime(media_type: &str, payload: &[u8]) -> Self {
        NdefRecord {
            tnf: 0x02,
            record_type: media_type.as_bytes().to_vec(),
            payload: payload.to_vec(),
            id: None,
        }
    }
}

// Messages received FROM the WebSocket client
#[allow(non_camel_case_types)]
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum IncomingMessage {
    GET_READER_STATUS,
}

// Internal commands sent from WS Server -> NFC Thread
#[derive(Debug, PartialEq)]
pub enum NfcCommand {
    CheckReaderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outgoing_messages_are_tagged_by_type() {
        let json = serde_json::to_string(&OutgoingMessage::READER_STATUS { success: true }).unwrap();
        assert_eq!(json, r#"{"type":"READER_STATUS","success":true}"#);
    }

    #[test]
    fn tag_read_serializes_records_as_object() {
        let mut records = BTreeMap::new();
        records.insert("4".to_string(), "example.com".to_string());
        let msg = OutgoingMessage::TAG_READ {
            uid: "04A122".into(),
            records,
            message: Some("example.com".into()),
            diagnostics: "ID (hex): 22 A1 04".into(),
            error: None,
        };
        let value: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "TAG_READ");
        assert_eq!(value["records"]["4"], "example.com");
        assert!(value["error"].is_null());
    }

    #[test]
    fn incoming_reader_status_request_parses() {
        let parsed: IncomingMessage = serde_json::from_str(r#"{"type":"GET_READER_STATUS"}"#).unwrap();
        assert_eq!(parsed, IncomingMessage::GET_READER_STATUS);
        assert!(serde_json::from_str::<IncomingMessage>(r#"{"type":"WRITE_DATA"}"#).is_err());
    }
}
