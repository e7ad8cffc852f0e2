//! HUB75 scan driver
//!
//! Bit-banged scan for 1/(H/2) multiplexed RGB panels. Each refresh walks
//! every row pair (row `y` and `y + H/2` are driven together) and every bit
//! plane: shift `W` columns, blank, latch, select the row, then light the
//! row for a time proportional to the plane's weight.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::framebuffer::{FrameBuffer, Levels};

/// Default on-time of the least significant bit plane
pub const DEFAULT_BASE_ON_NS: u32 = 2_000;

/// Panel connector pins
pub struct Hub75Pins<P> {
    pub r1: P,
    pub g1: P,
    pub b1: P,
    pub r2: P,
    pub g2: P,
    pub b2: P,
    /// Row address lines A..E, least significant first
    pub addr: [P; 5],
    pub clk: P,
    pub lat: P,
    /// Output enable, active low
    pub oe: P,
}

/// Scan driver owning the panel pins
pub struct Hub75<P, D> {
    pins: Hub75Pins<P>,
    delay: D,
    base_on_ns: u32,
}

impl<P, D> Hub75<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(pins: Hub75Pins<P>, delay: D) -> Self {
        Self {
            pins,
            delay,
            base_on_ns: DEFAULT_BASE_ON_NS,
        }
    }

    /// Set the on-time of the least significant plane
    pub fn with_base_on_ns(mut self, base_on_ns: u32) -> Self {
        self.base_on_ns = base_on_ns;
        self
    }

    /// Blank the panel and park the control lines
    pub fn init(&mut self) -> Result<(), P::Error> {
        self.pins.oe.set_high()?;
        self.pins.lat.set_low()?;
        self.pins.clk.set_low()?;
        Ok(())
    }

    /// Scan a whole frame once
    pub fn refresh<const W: usize, const H: usize>(
        &mut self,
        frame: &FrameBuffer<W, H>,
    ) -> Result<(), P::Error> {
        let half = H / 2;
        for row in 0..half {
            if let (Some(upper), Some(lower)) = (frame.row(row), frame.row(row + half)) {
                self.scan_row(row, upper, lower, frame.bit_depth())?;
            }
        }
        Ok(())
    }

    /// Scan one row pair through every bit plane
    pub fn scan_row(
        &mut self,
        row: usize,
        upper: &[Levels],
        lower: &[Levels],
        bit_depth: u8,
    ) -> Result<(), P::Error> {
        for plane in 0..bit_depth {
            self.shift_plane(upper, lower, plane)?;

            self.pins.oe.set_high()?;
            self.select_row(row)?;
            self.pins.lat.set_high()?;
            self.pins.lat.set_low()?;
            self.pins.oe.set_low()?;

            self.delay.delay_ns(self.base_on_ns << plane);
        }
        self.pins.oe.set_high()
    }

    fn shift_plane(
        &mut self,
        upper: &[Levels],
        lower: &[Levels],
        plane: u8,
    ) -> Result<(), P::Error> {
        for (top, bottom) in upper.iter().zip(lower.iter()) {
            let (r1, g1, b1) = top.plane(plane);
            let (r2, g2, b2) = bottom.plane(plane);
            self.pins.r1.set_state(PinState::from(r1))?;
            self.pins.g1.set_state(PinState::from(g1))?;
            self.pins.b1.set_state(PinState::from(b1))?;
            self.pins.r2.set_state(PinState::from(r2))?;
            self.pins.g2.set_state(PinState::from(g2))?;
            self.pins.b2.set_state(PinState::from(b2))?;
            self.pins.clk.set_high()?;
            self.pins.clk.set_low()?;
        }
        Ok(())
    }

    fn select_row(&mut self, row: usize) -> Result<(), P::Error> {
        for (bit, pin) in self.pins.addr.iter_mut().enumerate() {
            pin.set_state(PinState::from((row >> bit) & 1 == 1))?;
        }
        Ok(())
    }
}
