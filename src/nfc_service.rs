// src/nfc_service.rs
use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info};
use pcsc::{Card, Context, PNP_NOTIFICATION, Protocols, ReaderState, Scope, ShareMode, State};
use std::ffi::{CStr, CString};
use std::time::Duration;

use crate::apdu::{self, ReaderError};
use crate::cards::{self, CardKind};
use crate::types::{NfcCommand, OutgoingMessage};
use crate::{diagnostics, ndef, record};

pub fn run(tx: Sender<OutgoingMessage>, rx: Receiver<NfcCommand>, poll_interval: Duration) {
    info!("Starting NFC Service (Event Driven)...");

    let ctx = match Context::establish(Scope::User) {
        Ok(ctx) => ctx,
        Err(err) => {
            error!("Failed to establish context: {}", err);
            let _ = tx.send(OutgoingMessage::READER_ERROR {
                error: err.to_string(),
            });
            return;
        }
    };

    let mut readers_buf = [0; 2048];
    let mut reader_names: Vec<CString> = Vec::new();

    let mut reader_states = vec![ReaderState::new(PNP_NOTIFICATION(), State::UNAWARE)];

    loop {
        // 1. Wait for State Change
        if let Err(err) = ctx.get_status_change(poll_interval, &mut reader_states) {
            if err != pcsc::Error::Timeout {
                error!("PCSC Error: {}", err);
                std::thread::sleep(Duration::from_secs(1));
                continue;
            }
        }

        // 2. CHECK FOR COMMANDS
        let mut readers_changed = false;
        while let Ok(cmd) = rx.try_recv() {
            match cmd {
                NfcCommand::CheckReaderStatus => readers_changed = true,
            }
        }

        // 3. PROCESS EVENTS
        // Check PnP (Index 0)
        if reader_states[0].event_state().intersects(State::CHANGED) {
            info!("Hardware change detected");
            readers_changed = true;
            reader_states[0].sync_current_state();
        }

        // Check Readers (Indices 1..)
        for i in 1..reader_states.len() {
            let rs = &reader_states[i];
            let Some(name) = reader_names.get(i - 1) else {
                break;
            };

            if rs.event_state().intersects(State::CHANGED) {
                let current = rs.event_state();

                // Card Inserted
                if current.intersects(State::PRESENT)
                    && !rs.current_state().intersects(State::PRESENT)
                {
                    info!("Card Inserted on {:?}", name);
                    handle_card_insertion(&ctx, name, &tx);
                }

                // Card Removed
                if current.intersects(State::EMPTY) && rs.current_state().intersects(State::PRESENT)
                {
                    info!("Card Removed from {:?}", name);
                    let _ = tx.send(OutgoingMessage::CARD_STATUS {
                        success: false,
                        message: "Card removed!".into(),
                    });
                }

                reader_states[i].sync_current_state();
            }
        }

        // 4. REFRESH LIST
        if readers_changed {
            match ctx.list_readers(&mut readers_buf) {
                Ok(iter) => {
                    reader_names = iter.map(CString::from).collect();
                    // Keep the PnP state (index 0) and drop everything else.
                    reader_states.truncate(1);
                    for name in &reader_names {
                        reader_states.push(ReaderState::new(name.clone(), State::UNAWARE));
                    }

                    let _ = tx.send(OutgoingMessage::READER_STATUS {
                        success: !reader_names.is_empty(),
                    });
                }
                Err(err) => {
                    debug!("No readers listed: {}", err);
                    reader_names.clear();
                    reader_states.truncate(1);

                    let _ = tx.send(OutgoingMessage::READER_STATUS { success: false });
                }
            }
        }
    }
}

fn handle_card_insertion(ctx: &Context, reader_name: &CStr, tx: &Sender<OutgoingMessage>) {
    let _ = tx.send(OutgoingMessage::CARD_STATUS {
        success: true,
        message: "Card detected!".into(),
    });

    match ctx.connect(reader_name, ShareMode::Shared, Protocols::ANY) {
        Ok(card) => {
            let mut names_buf = [0u8; 128];
            let mut atr_buf = [0u8; 64];
            let kind = match card.status2(&mut names_buf, &mut atr_buf) {
                Ok(status) => CardKind::from_atr(status.atr()),
                Err(e) => {
                    debug!("Card status unavailable: {}", e);
                    CardKind::Unknown
                }
            };
            info!("Detected card kind {:?}", kind);

            let uid = match apdu::get_uid(&card) {
                Ok(uid) => uid,
                Err(e) => {
                    error!("Failed to read UID: {}", e);
                    Vec::new()
                }
            };

            let memory = read_memory(&card, kind);
            let _ = tx.send(build_tag_event(&uid, kind, memory));
        }
        Err(e) => error!("Failed to connect to card: {}", e),
    }
}

fn read_memory(card: &Card, kind: CardKind) -> Result<Vec<u8>, ReaderError> {
    match kind {
        CardKind::Classic { size } => cards::read_mifare(card, size),
        _ => cards::read_ultralight(card),
    }
}

// Turn one card read into the event clients receive. Diagnostics are always
// produced, even when the NDEF area could not be read or parsed.
pub fn build_tag_event(
    uid: &[u8],
    kind: CardKind,
    memory: Result<Vec<u8>, ReaderError>,
) -> OutgoingMessage {
    let (records, read_error) = match memory {
        Ok(raw) => match ndef::find_ndef_message(&raw).and_then(ndef::parse_ndef_records) {
            Ok(records) => (records, None),
            Err(e) => (Vec::new(), Some(format!("Empty/Non-NDEF: {}", e))),
        },
        Err(e) => (Vec::new(), Some(e.to_string())),
    };

    let decoded = record::decode_all_by_type(&records)
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();

    OutgoingMessage::TAG_READ {
        uid: hex::encode_upper(uid),
        records: decoded,
        message: record::decode_message(&records),
        diagnostics: diagnostics::describe(uid, &kind.technologies(), &kind.details()),
        error: read_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tlv(message: &[u8]) -> Vec<u8> {
        let mut memory = vec![0x03, message.len() as u8];
        memory.extend_from_slice(message);
        memory.push(0xFE);
        memory
    }

    #[test]
    fn tag_event_carries_records_and_diagnostics() {
        // Two URI records with the same prefix code, then an empty record
        let message = [
            0x91, 0x01, 0x04, b'U', 0x04, b'a', b'.', b'b', // MB|SR
            0x11, 0x01, 0x04, b'U', 0x04, b'c', b'.', b'd', // SR
            0x51, 0x01, 0x00, b'U', // ME|SR, empty payload
        ];
        let event = build_tag_event(
            &[0x04, 0xA1, 0x22],
            CardKind::Classic { size: 1024 },
            Ok(tlv(&message)),
        );

        match event {
            OutgoingMessage::TAG_READ {
                uid,
                records,
                message,
                diagnostics,
                error,
            } => {
                assert_eq!(uid, "04A122");
                assert_eq!(records.len(), 2);
                assert_eq!(records["4"], "a.b");
                assert_eq!(records["-1"], "");
                assert_eq!(message.as_deref(), Some("a.b"));
                assert!(diagnostics.starts_with("ID (hex): 22 A1 04\n"));
                assert!(diagnostics.contains("Technologies: NfcA, MifareClassic, Ndef"));
                assert!(diagnostics.contains("Mifare sectors: 16"));
                assert_eq!(error, None);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn read_failure_still_reports_diagnostics() {
        let event = build_tag_event(&[0x01], CardKind::Ultralight, Err(ReaderError::NoNdefContainer));
        match event {
            OutgoingMessage::TAG_READ {
                records,
                message,
                diagnostics,
                error,
                ..
            } => {
                assert!(records.is_empty());
                assert_eq!(message, None);
                assert!(diagnostics.ends_with("Mifare Ultralight type: Ultralight"));
                assert_eq!(error.as_deref(), Some("No NDEF container found (Tag 0x03 missing)"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn non_ndef_memory_is_reported() {
        let event = build_tag_event(&[], CardKind::Unknown, Ok(vec![0x00, 0x00, 0xFE]));
        match event {
            OutgoingMessage::TAG_READ { uid, error, .. } => {
                assert_eq!(uid, "");
                assert_eq!(error.as_deref(), Some("Empty/Non-NDEF: No NDEF TLV found"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
