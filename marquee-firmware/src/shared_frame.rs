//! Frame hand-off between the label task and the scan loop
//!
//! The label task on core0 publishes finished frames here. The scan loop on
//! core1 copies one row pair at a time out of it, so neither side holds the
//! lock for longer than a small copy.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use marquee_display::{FrameBuffer, Levels, MatrixPanel, PanelError};
use portable_atomic::{AtomicU32, Ordering};

/// Panel columns (two chained 128x64 modules)
pub const PANEL_WIDTH: usize = 256;

/// Panel rows
pub const PANEL_HEIGHT: usize = 64;

pub type PanelFrame = FrameBuffer<PANEL_WIDTH, PANEL_HEIGHT>;

/// One panel row worth of pixels
pub type PanelRow = [Levels; PANEL_WIDTH];

static FRAME: Mutex<CriticalSectionRawMutex, RefCell<PanelFrame>> =
    Mutex::new(RefCell::new(FrameBuffer::new(1)));

/// Full panel scans completed by core1
static SCANS: AtomicU32 = AtomicU32::new(0);

/// [`MatrixPanel`] that publishes frames to the scan loop
#[derive(Debug, Default)]
pub struct SharedFrame;

impl MatrixPanel<PANEL_WIDTH, PANEL_HEIGHT> for SharedFrame {
    fn show(&mut self, frame: &PanelFrame) -> Result<(), PanelError> {
        FRAME.lock(|shared| shared.borrow_mut().copy_from(frame));
        Ok(())
    }
}

/// Copy out row `row` and its partner in the lower half, plus the bit depth
pub fn row_pair(row: usize, upper: &mut PanelRow, lower: &mut PanelRow) -> Option<u8> {
    FRAME.lock(|shared| {
        let frame = shared.borrow();
        upper.copy_from_slice(frame.row(row)?);
        lower.copy_from_slice(frame.row(row + PANEL_HEIGHT / 2)?);
        Some(frame.bit_depth())
    })
}

/// Count one completed scan
pub fn scan_done() {
    SCANS.fetch_add(1, Ordering::Relaxed);
}

/// Read and reset the scan counter
pub fn take_scans() -> u32 {
    SCANS.swap(0, Ordering::Relaxed)
}
