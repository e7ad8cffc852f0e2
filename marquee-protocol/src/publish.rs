//! Inbound publish carried from the bridge to the display controller

use heapless::String;

use crate::frame::{FrameError, MAX_PAYLOAD_SIZE};

/// Maximum topic length in bytes
///
/// A publish frame spends one byte on the topic length, so every topic a
/// frame can carry fits.
pub const MAX_TOPIC_LEN: usize = MAX_PAYLOAD_SIZE - 1;

/// Maximum message payload length in bytes
///
/// Same bound as the topic: any payload a decodable frame carries fits.
pub const MAX_MESSAGE_LEN: usize = MAX_PAYLOAD_SIZE - 1;

/// One message received on the subscribed feed
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Publish {
    pub topic: String<MAX_TOPIC_LEN>,
    pub payload: String<MAX_MESSAGE_LEN>,
}

impl Publish {
    /// Copy a topic/payload pair, failing if either exceeds its capacity
    pub fn new(topic: &str, payload: &str) -> Result<Self, FrameError> {
        let mut publish = Self {
            topic: String::new(),
            payload: String::new(),
        };
        publish
            .topic
            .push_str(topic)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        publish
            .payload
            .push_str(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(publish)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}
