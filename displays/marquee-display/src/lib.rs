//! Matrix output for the Marquee label display
//!
//! - `FrameBuffer`: quantised RGB pixels, an embedded-graphics draw target
//! - `LabelRenderer`: draws a snapshot of the lines as text labels
//! - `MatrixDisplay`: the core `LabelDisplay` on top of any `MatrixPanel`
//! - `Hub75`: bit-banged scan for HUB75 panels over `embedded-hal` pins
//!
//! The firmware runs the scan on its own core and implements `MatrixPanel`
//! as a hand-off into the buffer that core reads.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod framebuffer;
pub mod hub75;
pub mod labels;
pub mod matrix;

pub use framebuffer::{FrameBuffer, Levels, MAX_BIT_DEPTH};
pub use hub75::{Hub75, Hub75Pins};
pub use labels::{LabelLayout, LabelRenderer};
pub use matrix::{MatrixDisplay, MatrixPanel, PanelError};
