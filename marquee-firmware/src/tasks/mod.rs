//! Embassy tasks
//!
//! The bridge RX and label tasks run on core0's executor; the panel scan
//! loop owns core1.

pub mod bridge_rx;
pub mod label;
pub mod scan;

pub use bridge_rx::bridge_rx_task;
pub use label::label_task;
pub use scan::scan_loop;
