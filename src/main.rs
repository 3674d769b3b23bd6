use crossbeam_channel::unbounded;
use log::{error, info};
use tokio::sync::broadcast;

use nfc_tag_reader::config::ServiceConfig;
use nfc_tag_reader::types::{NfcCommand, OutgoingMessage};
use nfc_tag_reader::{nfc_service, ws};

#[tokio::main]
async fn main() {
    env_logger::init();
    info!("Starting NFC tag reader...");

    let config = ServiceConfig::from_env().unwrap_or_else(|e| {
        error!("Invalid configuration, using defaults: {}", e);
        ServiceConfig::default()
    });

    // Channel: WS -> NFC (Commands)
    // Crossbeam (Sync) because the NFC thread is blocking
    let (cmd_tx, cmd_rx) = unbounded::<NfcCommand>();

    // Channel: NFC -> WS (Events), fanned out to WS clients
    let (event_tx, event_rx) = broadcast::channel::<OutgoingMessage>(config.event_capacity);

    // NFC thread -> bridge thread -> broadcast
    let (bridge_tx, bridge_rx) = unbounded::<OutgoingMessage>();
    let poll_interval = config.poll_interval;
    std::thread::spawn(move || nfc_service::run(bridge_tx, cmd_rx, poll_interval));
    std::thread::spawn(move || {
        while let Ok(msg) = bridge_rx.recv() {
            let _ = event_tx.send(msg);
        }
    });

    ws::start_server(config.ws_addr, cmd_tx, event_rx).await;
}
