//! Configuration type definitions
//!
//! Startup configuration for the device. Values are read once at boot and
//! never change while running.

use heapless::String;
use marquee_protocol::MAX_TOPIC_LEN;

use crate::lines::{default_slots, LineSlot, LINE_COUNT};

/// Maximum SSID length (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum length of passwords and user names
pub const MAX_SECRET_LEN: usize = 64;

/// Maximum broker host name length
pub const MAX_HOST_LEN: usize = 64;

/// Highest supported bits per color channel
pub const MAX_BIT_DEPTH: u8 = 5;

/// Wireless network credentials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkConfig {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_SECRET_LEN>,
}

/// Broker session settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BrokerConfig {
    pub host: String<MAX_HOST_LEN>,
    pub port: u16,
    /// Empty for anonymous sessions
    pub username: String<MAX_SECRET_LEN>,
    pub password: String<MAX_SECRET_LEN>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 1883,
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Feed polling and reconnect behaviour
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FeedConfig {
    /// Subscription filter
    pub topic: String<MAX_TOPIC_LEN>,
    /// Longest a single poll may wait for a message
    pub poll_timeout_ms: u32,
    /// First reconnect delay after a failed connect
    pub retry_initial_ms: u32,
    /// Reconnect delay ceiling
    pub retry_max_ms: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        let mut topic = String::new();
        // Fits: the literal is far below MAX_TOPIC_LEN
        let _ = topic.push_str("home/display/#");
        Self {
            topic,
            poll_timeout_ms: 1000,
            retry_initial_ms: 500,
            retry_max_ms: 30_000,
        }
    }
}

/// Panel geometry, color depth, pacing and label placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    pub width: u16,
    pub height: u16,
    /// Bits per color channel (1..=5)
    pub bit_depth: u8,
    /// Pacing rate
    pub target_fps: u32,
    /// Slowest acceptable frame rate
    pub min_fps: u32,
    /// Left edge of every label
    pub origin_x: i32,
    /// Vertical center of line 0
    pub first_line_y: i32,
    /// Distance between line centers
    pub line_pitch: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 64,
            bit_depth: 2,
            target_fps: 60,
            min_fps: 30,
            origin_x: 0,
            first_line_y: 8,
            line_pitch: 12,
        }
    }
}

/// Configuration consistency errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A frame rate is zero or the floor is above the target
    FrameRate,
    /// Bit depth outside 1..=5
    BitDepth,
    /// Retry delays are zero or the initial delay exceeds the ceiling
    RetryDelay,
    /// Poll timeout is zero
    PollTimeout,
    /// Subscription filter is empty
    EmptyTopic,
    /// Width or height is zero
    Geometry,
    /// Label origin off the panel or line pitch outside 1..=height
    Layout,
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MarqueeConfig {
    pub network: NetworkConfig,
    pub broker: BrokerConfig,
    pub feed: FeedConfig,
    pub display: DisplayConfig,
    /// Boot contents of every line
    pub lines: [LineSlot; LINE_COUNT],
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            broker: BrokerConfig::default(),
            feed: FeedConfig::default(),
            display: DisplayConfig::default(),
            lines: default_slots(),
        }
    }
}

impl MarqueeConfig {
    /// Check cross-field constraints the parser cannot see line by line
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.display;
        if d.width == 0 || d.height == 0 {
            return Err(ConfigError::Geometry);
        }
        let (width, height) = (i32::from(d.width), i32::from(d.height));
        if !(0..width).contains(&d.origin_x)
            || !(0..height).contains(&d.first_line_y)
            || !(1..=height).contains(&d.line_pitch)
        {
            return Err(ConfigError::Layout);
        }
        if d.bit_depth == 0 || d.bit_depth > MAX_BIT_DEPTH {
            return Err(ConfigError::BitDepth);
        }
        if d.target_fps == 0 || d.min_fps == 0 || d.min_fps > d.target_fps {
            return Err(ConfigError::FrameRate);
        }

        let f = &self.feed;
        if f.topic.is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        if f.poll_timeout_ms == 0 {
            return Err(ConfigError::PollTimeout);
        }
        if f.retry_initial_ms == 0 || f.retry_initial_ms > f.retry_max_ms {
            return Err(ConfigError::RetryDelay);
        }
        Ok(())
    }
}
