//! Marquee link protocol
//!
//! Two wire-level concerns live here:
//!
//! - The UART link between the RP2040 and the network co-processor (the
//!   "bridge"), which owns Wi-Fi, TLS and the MQTT session. The bridge
//!   forwards every publish it receives on the subscribed filter.
//! - The topic grammar that maps an MQTT topic onto a display line.
//!
//! # Frame format
//!
//! ```text
//! ┌──────┬─────┬──────┬─────────────┬──────┐
//! │ SYNC │ LEN │ TYPE │ PAYLOAD     │ CRC8 │
//! │ 1B   │ 1B  │ 1B   │ 0–250B      │ 1B   │
//! └──────┴─────┴──────┴─────────────┴──────┘
//! ```
//!
//! CRC8 uses polynomial 0x07 over LEN, TYPE and PAYLOAD.

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;
pub mod publish;
pub mod topic;

pub use frame::{Frame, FrameDecoder, FrameError, FRAME_SYNC, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{BridgeEvent, HostMessage};
pub use publish::{Publish, MAX_MESSAGE_LEN, MAX_TOPIC_LEN};
pub use topic::{Route, TopicError, TopicTarget, UpdateKind};
