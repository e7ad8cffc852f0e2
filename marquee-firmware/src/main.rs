//! Marquee - MQTT label display firmware
//!
//! Firmware for an RP2040 driving a 256x64 HUB75 matrix (Interstate 75
//! pinout). Five text lines are updated over MQTT through a network bridge
//! on UART1 and redrawn continuously.
//!
//! Core0 runs the embassy executor (bridge RX and label tasks); core1 does
//! nothing but scan the panel.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{Delay, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use marquee_core::config::{parse_config, MarqueeConfig};
use marquee_display::{FrameBuffer, Hub75, Hub75Pins};

use crate::shared_frame::{PanelFrame, PANEL_HEIGHT, PANEL_WIDTH};

/// Embedded startup configuration (compiled into firmware)
/// Edit marquee.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../marquee.toml");

/// Seconds between scan-rate reports
const REPORT_INTERVAL_S: u64 = 10;

mod bridge;
mod channels;
mod clock;
mod shared_frame;
mod tasks;

bind_interrupts!(struct Irqs {
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 512]> = StaticCell::new();

static CONFIG: StaticCell<MarqueeConfig> = StaticCell::new();
static RENDER_FRAME: StaticCell<PanelFrame> = StaticCell::new();
static CORE1_STACK: StaticCell<Stack<4096>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Marquee firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static MarqueeConfig = CONFIG.init(load_config());
    let display = &config.display;
    if usize::from(display.width) != PANEL_WIDTH || usize::from(display.height) != PANEL_HEIGHT {
        warn!(
            "Configured {}x{} panel, firmware drives {}x{}",
            display.width, display.height, PANEL_WIDTH, PANEL_HEIGHT
        );
    }

    // HUB75 connector, Interstate 75 pinout
    let pins = Hub75Pins {
        r1: Output::new(p.PIN_0, Level::Low),
        g1: Output::new(p.PIN_1, Level::Low),
        b1: Output::new(p.PIN_2, Level::Low),
        r2: Output::new(p.PIN_3, Level::Low),
        g2: Output::new(p.PIN_4, Level::Low),
        b2: Output::new(p.PIN_5, Level::Low),
        addr: [
            Output::new(p.PIN_6, Level::Low),
            Output::new(p.PIN_7, Level::Low),
            Output::new(p.PIN_8, Level::Low),
            Output::new(p.PIN_9, Level::Low),
            Output::new(p.PIN_10, Level::Low),
        ],
        clk: Output::new(p.PIN_11, Level::Low),
        lat: Output::new(p.PIN_12, Level::Low),
        oe: Output::new(p.PIN_13, Level::High),
    };
    let hub = Hub75::new(pins, Delay);

    spawn_core1(p.CORE1, CORE1_STACK.init(Stack::new()), move || {
        tasks::scan_loop(hub)
    });
    info!("Panel scan running on core1");

    // UART1 to the network bridge (GP20 TX, GP21 RX)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = 115200;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 512]);

    let uart = Uart::new_blocking(p.UART1, p.PIN_20, p.PIN_21, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for bridge communication");

    let frame = RENDER_FRAME.init_with(|| FrameBuffer::new(display.bit_depth));

    spawner.spawn(tasks::bridge_rx_task(rx)).unwrap();
    spawner.spawn(tasks::label_task(config, tx, frame)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(REPORT_INTERVAL_S).await;
        debug!(
            "Panel refresh {} Hz",
            shared_frame::take_scans() / REPORT_INTERVAL_S as u32
        );
    }
}

/// Parse the embedded configuration
///
/// Falls back to built-in defaults if marquee.toml does not parse or is
/// inconsistent, so the panel still comes up.
fn load_config() -> MarqueeConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!(
                "Failed to parse embedded config, line {}: {:?}",
                e.line, e.kind
            );
            error!("Using default configuration");
            return MarqueeConfig::default();
        }
    };

    match config.validate() {
        Ok(()) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Embedded config rejected: {:?}", e);
            error!("Using default configuration");
            MarqueeConfig::default()
        }
    }
}
