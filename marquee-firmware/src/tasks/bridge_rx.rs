//! Bridge UART receive task
//!
//! Decodes frames from the network bridge and queues the events for the
//! feed client.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embassy_sync::channel::TrySendError;
use embedded_io_async::Read;

use marquee_protocol::{BridgeEvent, FrameDecoder};

use crate::channels::BRIDGE_EVENTS;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

#[embassy_executor::task]
pub async fn bridge_rx_task(mut rx: BufferedUartRx) {
    info!("Bridge RX task started");

    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };
        trace!("RX: {} bytes", n);

        for &byte in &buf[..n] {
            match decoder.push(byte) {
                Ok(Some(frame)) => match BridgeEvent::from_frame(&frame) {
                    Ok(event) => forward(event),
                    Err(e) => warn!("Bad bridge message type {=u8:#x}: {:?}", frame.msg_type, e),
                },
                Ok(None) => {}
                Err(e) => warn!("Frame decode error: {:?}", e),
            }
        }
    }
}

fn forward(event: BridgeEvent) {
    if let Err(TrySendError::Full(event)) = BRIDGE_EVENTS.try_send(event) {
        warn!("Bridge event channel full, dropping {:?}", event);
    }
}
