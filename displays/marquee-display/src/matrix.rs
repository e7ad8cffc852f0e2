//! Matrix display
//!
//! Adapts a pixel panel to the label display interface. Lines are
//! rasterised into a local frame buffer only when they changed since the
//! last frame; the panel then receives the finished buffer.

use marquee_core::traits::{DisplayError, LabelDisplay};
use marquee_core::Snapshot;

use crate::framebuffer::FrameBuffer;
use crate::labels::LabelRenderer;

/// Panel failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError {
    /// Panel is not scanning yet
    NotRunning,
    /// Hardware fault
    Fault,
}

impl From<PanelError> for DisplayError {
    fn from(e: PanelError) -> Self {
        match e {
            PanelError::NotRunning => DisplayError::NotReady,
            PanelError::Fault => DisplayError::PanelFault,
        }
    }
}

/// Something that can show a finished frame buffer
pub trait MatrixPanel<const W: usize, const H: usize> {
    /// Take a copy of `frame` for display
    fn show(&mut self, frame: &FrameBuffer<W, H>) -> Result<(), PanelError>;
}

/// [`LabelDisplay`] on top of a [`MatrixPanel`]
pub struct MatrixDisplay<'a, P, const W: usize, const H: usize> {
    panel: P,
    frame: &'a mut FrameBuffer<W, H>,
    renderer: LabelRenderer,
    shown: Option<Snapshot>,
    rasters: u32,
}

impl<'a, P, const W: usize, const H: usize> MatrixDisplay<'a, P, W, H>
where
    P: MatrixPanel<W, H>,
{
    pub fn new(panel: P, frame: &'a mut FrameBuffer<W, H>, renderer: LabelRenderer) -> Self {
        Self {
            panel,
            frame,
            renderer,
            shown: None,
            rasters: 0,
        }
    }

    /// Number of times the lines were rasterised
    pub fn rasters(&self) -> u32 {
        self.rasters
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }
}

impl<P, const W: usize, const H: usize> LabelDisplay for MatrixDisplay<'_, P, W, H>
where
    P: MatrixPanel<W, H>,
{
    async fn present(&mut self, frame: &Snapshot) -> Result<(), DisplayError> {
        if self.shown.as_ref() == Some(frame) {
            return Ok(());
        }

        if self.renderer.draw(frame, &mut *self.frame).is_err() {
            return Err(DisplayError::Render);
        }
        self.rasters = self.rasters.wrapping_add(1);

        self.panel.show(&*self.frame)?;
        self.shown = Some(frame.clone());
        Ok(())
    }
}
