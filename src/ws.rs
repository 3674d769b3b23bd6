// src/ws.rs
use crate::types::{IncomingMessage, NfcCommand, OutgoingMessage};
use crossbeam_channel::Sender;
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use warp::Filter;

pub async fn start_server(
    addr: SocketAddr,
    nfc_cmd_tx: Sender<NfcCommand>,
    mut nfc_event_rx: broadcast::Receiver<OutgoingMessage>,
) {
    // Shared Broadcast Channel for WS Clients
    let (ws_tx, _) = broadcast::channel::<OutgoingMessage>(32);
    let ws_tx = Arc::new(ws_tx);

    // 1. Task to forward NFC Events -> All WS Clients
    let ws_tx_clone = ws_tx.clone();
    tokio::spawn(async move {
        loop {
            match nfc_event_rx.recv().await {
                Ok(msg) => {
                    let _ = ws_tx_clone.send(msg);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Dropped {} NFC events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // 2. Define WS Route (Matches root path "/")
    let ws_route = warp::path::end()
        .and(warp::ws())
        .map(move |ws: warp::ws::Ws| {
            let nfc_cmd_tx = nfc_cmd_tx.clone();
            let ws_tx = ws_tx.clone();
            ws.on_upgrade(move |socket| handle_connection(socket, nfc_cmd_tx, ws_tx))
        });

    let routes = ws_route.with(warp::cors().allow_any_origin());

    info!("WebSocket server running on ws://{}", addr);
    warp::serve(routes).run(addr).await;
}

// Map a client text frame to a command for the NFC thread.
pub fn parse_command(text: &str) -> Option<NfcCommand> {
    match serde_json::from_str::<IncomingMessage>(text) {
        Ok(IncomingMessage::GET_READER_STATUS) => Some(NfcCommand::CheckReaderStatus),
        Err(e) => {
            debug!("Ignoring client message {:?}: {}", text, e);
            None
        }
    }
}

async fn handle_connection(
    ws: warp::ws::WebSocket,
    nfc_cmd_tx: Sender<NfcCommand>,
    ws_tx: Arc<broadcast::Sender<OutgoingMessage>>,
) {
    let (mut client_ws_tx, mut client_ws_rx) = ws.split();
    let mut rx_broadcast = ws_tx.subscribe();

    // Spawn task to send Broadcasts -> Client
    tokio::spawn(async move {
        while let Ok(msg) = rx_broadcast.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize {:?}: {}", msg, e);
                    continue;
                }
            };
            if client_ws_tx
                .send(warp::ws::Message::text(json))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    // Handle incoming messages from Client
    while let Some(Ok(msg)) = client_ws_rx.next().await {
        let Ok(text) = msg.to_str() else {
            continue;
        };
        if let Some(cmd) = parse_command(text) {
            let _ = nfc_cmd_tx.send(cmd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_status_request_becomes_command() {
        assert_eq!(
            parse_command(r#"{"type":"GET_READER_STATUS"}"#),
            Some(NfcCommand::CheckReaderStatus)
        );
    }

    #[test]
    fn unknown_messages_are_ignored() {
        assert_eq!(parse_command("not json"), None);
        assert_eq!(parse_command(r#"{"type":"WRITE_DATA"}"#), None);
    }
}
