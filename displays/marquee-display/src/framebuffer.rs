//! Quantised frame buffer
//!
//! Pixels are stored as per-channel intensity levels packed 5:5:5 into a
//! `u16`. Only the top `bit_depth` bits of each 8-bit channel survive,
//! which is all a bit-plane scanned matrix can show anyway.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};
pub use marquee_core::config::MAX_BIT_DEPTH;

const CHANNEL_BITS: u16 = MAX_BIT_DEPTH as u16;
const CHANNEL_MASK: u16 = (1 << CHANNEL_BITS) - 1;

/// One pixel: red, green and blue levels, each below `1 << bit_depth`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Levels(u16);

impl Levels {
    pub const OFF: Levels = Levels(0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(
            ((r as u16 & CHANNEL_MASK) << (2 * CHANNEL_BITS))
                | ((g as u16 & CHANNEL_MASK) << CHANNEL_BITS)
                | (b as u16 & CHANNEL_MASK),
        )
    }

    pub const fn r(self) -> u8 {
        ((self.0 >> (2 * CHANNEL_BITS)) & CHANNEL_MASK) as u8
    }

    pub const fn g(self) -> u8 {
        ((self.0 >> CHANNEL_BITS) & CHANNEL_MASK) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 & CHANNEL_MASK) as u8
    }

    /// Whether bit `plane` is set in each channel, as (r, g, b)
    pub const fn plane(self, plane: u8) -> (bool, bool, bool) {
        (
            (self.r() >> plane) & 1 == 1,
            (self.g() >> plane) & 1 == 1,
            (self.b() >> plane) & 1 == 1,
        )
    }
}

/// `W` x `H` pixel buffer at a fixed bit depth
#[derive(Clone)]
pub struct FrameBuffer<const W: usize, const H: usize> {
    pixels: [[Levels; W]; H],
    bit_depth: u8,
}

impl<const W: usize, const H: usize> FrameBuffer<W, H> {
    /// Blank buffer; `bit_depth` is clamped to `1..=MAX_BIT_DEPTH`
    pub const fn new(bit_depth: u8) -> Self {
        let bit_depth = if bit_depth == 0 {
            1
        } else if bit_depth > MAX_BIT_DEPTH {
            MAX_BIT_DEPTH
        } else {
            bit_depth
        };
        Self {
            pixels: [[Levels::OFF; W]; H],
            bit_depth,
        }
    }

    pub const fn width(&self) -> usize {
        W
    }

    pub const fn height(&self) -> usize {
        H
    }

    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    /// Reduce an 8-bit color to this buffer's levels
    pub fn quantize(&self, color: Rgb888) -> Levels {
        let shift = 8 - self.bit_depth;
        Levels::new(color.r() >> shift, color.g() >> shift, color.b() >> shift)
    }

    /// Turn every pixel off
    pub fn blank(&mut self) {
        for row in self.pixels.iter_mut() {
            row.fill(Levels::OFF);
        }
    }

    /// Set one pixel; coordinates outside the buffer are ignored
    pub fn set(&mut self, x: usize, y: usize, color: Rgb888) {
        let levels = self.quantize(color);
        if let Some(px) = self.pixels.get_mut(y).and_then(|row| row.get_mut(x)) {
            *px = levels;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Levels> {
        self.pixels.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn row(&self, y: usize) -> Option<&[Levels; W]> {
        self.pixels.get(y)
    }

    /// Copy another buffer's pixels and depth
    pub fn copy_from(&mut self, other: &Self) {
        self.pixels.copy_from_slice(&other.pixels);
        self.bit_depth = other.bit_depth;
    }

    /// Number of lit pixels
    pub fn lit(&self) -> usize {
        self.pixels
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&px| px != Levels::OFF)
            .count()
    }
}

impl<const W: usize, const H: usize> OriginDimensions for FrameBuffer<W, H> {
    fn size(&self) -> Size {
        Size::new(W as u32, H as u32)
    }
}

impl<const W: usize, const H: usize> DrawTarget for FrameBuffer<W, H> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= 0 && coord.y >= 0 {
                self.set(coord.x as usize, coord.y as usize, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let levels = self.quantize(color);
        for row in self.pixels.iter_mut() {
            row.fill(levels);
        }
        Ok(())
    }
}
