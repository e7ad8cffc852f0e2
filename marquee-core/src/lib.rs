//! Board-agnostic label logic for the Marquee matrix display
//!
//! Everything between the feed and the panel that does not depend on
//! specific hardware lives here:
//!
//! - Character folding and the named color table
//! - The shared line model
//! - Topic routing of feed updates onto lines
//! - Feed and render tasks and the scheduler that runs them together
//! - Collaborator traits (feed client, display, clock)
//! - Configuration types and the boot-time parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod charmap;
pub mod color;
pub mod config;
pub mod feed;
pub mod lines;
pub mod render;
pub mod router;
pub mod scheduler;
pub mod traits;

pub use charmap::CharMap;
pub use color::{ColorTable, Rgb};
pub use lines::{LineModel, LineSlot, LineStore, Snapshot, LINE_COUNT};
pub use router::{RouteError, RouteOutcome, TopicRouter};
pub use scheduler::Scheduler;
