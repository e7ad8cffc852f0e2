//! HUB75 scan loop
//!
//! Runs alone on core1 and never yields: the panel only shows light while
//! it is being scanned, so any pause is visible as flicker.

use core::convert::Infallible;

use embassy_rp::gpio::Output;
use embassy_time::Delay;
use marquee_display::{Hub75, Levels};

use crate::shared_frame::{self, PanelRow, PANEL_HEIGHT, PANEL_WIDTH};

pub fn scan_loop(mut hub: Hub75<Output<'static>, Delay>) -> ! {
    ok(hub.init());

    let mut upper: PanelRow = [Levels::OFF; PANEL_WIDTH];
    let mut lower: PanelRow = [Levels::OFF; PANEL_WIDTH];
    loop {
        for row in 0..PANEL_HEIGHT / 2 {
            if let Some(depth) = shared_frame::row_pair(row, &mut upper, &mut lower) {
                ok(hub.scan_row(row, &upper, &lower, depth));
            }
        }
        shared_frame::scan_done();
    }
}

/// RP2040 output pins cannot fail
fn ok(result: Result<(), Infallible>) {
    match result {
        Ok(()) => {}
        Err(never) => match never {},
    }
}
