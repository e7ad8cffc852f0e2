//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use marquee_protocol::BridgeEvent;

/// Channel capacity for bridge events
const BRIDGE_CHANNEL_SIZE: usize = 8;

/// Events decoded from the bridge UART, consumed by the feed client
pub static BRIDGE_EVENTS: Channel<CriticalSectionRawMutex, BridgeEvent, BRIDGE_CHANNEL_SIZE> =
    Channel::new();
