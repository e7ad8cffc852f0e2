//! Collaborator traits
//!
//! These traits define the interface between the label logic and the
//! board-specific network link, display hardware and time source.

pub mod clock;
pub mod display;
pub mod feed;

pub use clock::Clock;
pub use display::{DisplayError, LabelDisplay};
pub use feed::{FeedClient, FeedError};
