//! Label rasteriser
//!
//! Draws each line of a snapshot as one text label in the line's color.
//! Labels share a left edge and are spaced a fixed pitch apart, vertically
//! centered on their line position.

use embedded_graphics::mono_font::ascii::FONT_6X12;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::{DrawTarget, Point};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;
use marquee_core::config::DisplayConfig;
use marquee_core::{Rgb, Snapshot};

/// Where line labels go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LabelLayout {
    pub origin_x: i32,
    pub first_line_y: i32,
    pub line_pitch: i32,
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self {
            origin_x: 0,
            first_line_y: 8,
            line_pitch: 12,
        }
    }
}

impl LabelLayout {
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            origin_x: config.origin_x,
            first_line_y: config.first_line_y,
            line_pitch: config.line_pitch,
        }
    }

    /// Anchor of line `index`: left edge, vertical middle
    ///
    /// Saturates instead of overflowing; a saturated anchor lands off the
    /// panel and draws nothing.
    pub fn position(&self, index: usize) -> Point {
        let index = i32::try_from(index).unwrap_or(i32::MAX);
        Point::new(
            self.origin_x,
            self.first_line_y
                .saturating_add(self.line_pitch.saturating_mul(index)),
        )
    }
}

fn to_rgb888(color: Rgb) -> Rgb888 {
    Rgb888::new(color.r(), color.g(), color.b())
}

/// Draws snapshots onto any RGB draw target
#[derive(Clone, Copy)]
pub struct LabelRenderer {
    layout: LabelLayout,
    font: &'static MonoFont<'static>,
}

impl LabelRenderer {
    pub fn new(layout: LabelLayout) -> Self {
        Self {
            layout,
            font: &FONT_6X12,
        }
    }

    pub fn layout(&self) -> &LabelLayout {
        &self.layout
    }

    /// Clear `target` and draw every non-empty line
    pub fn draw<D>(&self, snapshot: &Snapshot, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        target.clear(Rgb888::BLACK)?;
        for (index, slot) in snapshot.iter() {
            if slot.text().is_empty() {
                continue;
            }
            let style = MonoTextStyle::new(self.font, to_rgb888(slot.color()));
            Text::with_baseline(slot.text(), self.layout.position(index), style, Baseline::Middle)
                .draw(target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::{FrameBuffer, Levels};
    use marquee_core::{LineModel, LineSlot, LINE_COUNT};

    fn snapshot(slots: [LineSlot; LINE_COUNT]) -> Snapshot {
        LineModel::new(slots).snapshot()
    }

    fn lit_rows<const W: usize, const H: usize>(
        fb: &FrameBuffer<W, H>,
    ) -> core::ops::RangeInclusive<usize> {
        let rows: Vec<usize> = (0..H)
            .filter(|&y| fb.row(y).unwrap().iter().any(|&px| px != Levels::OFF))
            .collect();
        *rows.first().unwrap()..=*rows.last().unwrap()
    }

    #[test]
    fn test_default_positions() {
        let layout = LabelLayout::default();
        let ys: Vec<i32> = (0..LINE_COUNT).map(|i| layout.position(i).y).collect();
        assert_eq!(ys, [8, 20, 32, 44, 56]);
        assert!((0..LINE_COUNT).all(|i| layout.position(i).x == 0));
    }

    #[test]
    fn test_empty_lines_draw_nothing() {
        let mut fb = FrameBuffer::<64, 64>::new(2);
        let renderer = LabelRenderer::new(LabelLayout::default());
        let empty = core::array::from_fn(|_| LineSlot::new("", Rgb::from_packed(0xffffff)));

        renderer.draw(&snapshot(empty), &mut fb).unwrap();

        assert_eq!(fb.lit(), 0);
    }

    #[test]
    fn test_label_uses_line_color_and_row() {
        let mut fb = FrameBuffer::<64, 64>::new(2);
        let renderer = LabelRenderer::new(LabelLayout::default());
        let mut slots = core::array::from_fn(|_| LineSlot::new("", Rgb::BLACK));
        slots[2] = LineSlot::new("HI", Rgb::from_packed(0xaa4400));

        renderer.draw(&snapshot(slots), &mut fb).unwrap();

        assert!(fb.lit() > 0);
        // Line 2 is centered on y = 32 with a 12 px tall font
        let rows = lit_rows(&fb);
        assert!(*rows.start() >= 26 && *rows.end() < 38, "rows {:?}", rows);
        for y in rows {
            for px in fb.row(y).unwrap().iter().filter(|&&px| px != Levels::OFF) {
                assert_eq!(*px, Levels::new(2, 1, 0));
            }
        }
    }

    #[test]
    fn test_redraw_clears_previous_text() {
        let mut fb = FrameBuffer::<64, 64>::new(2);
        let renderer = LabelRenderer::new(LabelLayout::default());
        let mut slots = core::array::from_fn(|_| LineSlot::new("", Rgb::BLACK));
        slots[0] = LineSlot::new("WIDE TEXT", Rgb::from_packed(0xffffff));
        renderer.draw(&snapshot(slots.clone()), &mut fb).unwrap();
        let wide = fb.lit();

        slots[0] = LineSlot::new("I", Rgb::from_packed(0xffffff));
        renderer.draw(&snapshot(slots), &mut fb).unwrap();

        assert!(fb.lit() < wide);
    }

    #[test]
    fn test_position_saturates() {
        let layout = LabelLayout {
            origin_x: 0,
            first_line_y: 8,
            line_pitch: i32::MAX,
        };
        assert_eq!(layout.position(0), Point::new(0, 8));
        assert_eq!(layout.position(LINE_COUNT - 1).y, i32::MAX);
        assert_eq!(layout.position(usize::MAX).y, i32::MAX);

        let upward = LabelLayout {
            line_pitch: i32::MIN,
            ..layout
        };
        assert_eq!(upward.position(4).y, i32::MIN + 8);
    }

    #[test]
    fn test_layout_from_config() {
        let mut config = DisplayConfig::default();
        config.origin_x = 4;
        config.line_pitch = 10;
        let layout = LabelLayout::from_config(&config);
        assert_eq!(layout.position(3), Point::new(4, 38));
    }
}
