//! Display driver trait

use crate::lines::Snapshot;

/// Errors that can occur while presenting a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Panel did not accept the frame
    PanelFault,
    /// Panel is not initialized or was lost
    NotReady,
    /// Rasterizing the lines failed
    Render,
}

/// Surface that shows the current lines
///
/// A failed `present` is not retried by the caller; the display is assumed
/// unusable.
#[allow(async_fn_in_trait)]
pub trait LabelDisplay {
    /// Show `frame`, returning once the panel has taken it
    async fn present(&mut self, frame: &Snapshot) -> Result<(), DisplayError>;
}
