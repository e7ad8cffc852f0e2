//! Message types for the bridge link
//!
//! - Host → Bridge: network join, broker session, subscription, heartbeat
//! - Bridge → Host: link state, session acks, forwarded publishes
//!
//! String fields are prefixed with a one-byte length, except the last field
//! of a message which runs to the end of the payload.

use heapless::Vec;

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};
use crate::publish::Publish;

// Message type IDs: Host → Bridge
pub const MSG_JOIN: u8 = 0x10;
pub const MSG_CONNECT: u8 = 0x11;
pub const MSG_SUBSCRIBE: u8 = 0x12;
pub const MSG_PING: u8 = 0x13;

// Message type IDs: Bridge → Host
pub const MSG_LINK_UP: u8 = 0x80;
pub const MSG_LINK_DOWN: u8 = 0x81;
pub const MSG_CONNACK: u8 = 0x82;
pub const MSG_SUBACK: u8 = 0x83;
pub const MSG_PUBLISH: u8 = 0x84;
pub const MSG_PONG: u8 = 0x85;

/// CONNACK code for an accepted session
pub const CONNACK_ACCEPTED: u8 = 0;

struct PayloadWriter {
    buf: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl PayloadWriter {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, FrameError> {
        self.buf
            .extend_from_slice(bytes)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(self)
    }

    fn u8(&mut self, value: u8) -> Result<&mut Self, FrameError> {
        self.bytes(&[value])
    }

    fn u16(&mut self, value: u16) -> Result<&mut Self, FrameError> {
        self.bytes(&value.to_be_bytes())
    }

    fn prefixed(&mut self, s: &str) -> Result<&mut Self, FrameError> {
        let len = u8::try_from(s.len()).map_err(|_| FrameError::PayloadTooLarge)?;
        self.u8(len)?.bytes(s.as_bytes())
    }

    fn tail(&mut self, s: &str) -> Result<&mut Self, FrameError> {
        self.bytes(s.as_bytes())
    }

    fn finish(&self, msg_type: u8) -> Result<Frame, FrameError> {
        Frame::new(msg_type, &self.buf)
    }
}

struct PayloadReader<'a> {
    rest: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    fn new(payload: &'a [u8]) -> Self {
        Self { rest: payload }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], FrameError> {
        if self.rest.len() < n {
            return Err(FrameError::InvalidPayload);
        }
        let (head, tail) = self.rest.split_at(n);
        self.rest = tail;
        Ok(head)
    }

    fn u8(&mut self) -> Result<u8, FrameError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, FrameError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn prefixed(&mut self) -> Result<&'a str, FrameError> {
        let len = self.u8()? as usize;
        let bytes = self.take(len)?;
        core::str::from_utf8(bytes).map_err(|_| FrameError::InvalidPayload)
    }

    fn tail(&mut self) -> Result<&'a str, FrameError> {
        let bytes = self.take(self.rest.len())?;
        core::str::from_utf8(bytes).map_err(|_| FrameError::InvalidPayload)
    }

    fn end(&self) -> Result<(), FrameError> {
        if self.rest.is_empty() {
            Ok(())
        } else {
            Err(FrameError::InvalidPayload)
        }
    }
}

/// Messages from the display controller to the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostMessage<'a> {
    /// Join the wireless network
    Join { ssid: &'a str, password: &'a str },
    /// Open a broker session
    Connect {
        host: &'a str,
        port: u16,
        username: &'a str,
        password: &'a str,
    },
    /// Subscribe to a topic filter
    Subscribe { filter: &'a str },
    /// Heartbeat request
    Ping,
}

impl<'a> HostMessage<'a> {
    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let mut w = PayloadWriter::new();
        match *self {
            HostMessage::Join { ssid, password } => {
                w.prefixed(ssid)?.tail(password)?.finish(MSG_JOIN)
            }
            HostMessage::Connect {
                host,
                port,
                username,
                password,
            } => w
                .u16(port)?
                .prefixed(host)?
                .prefixed(username)?
                .tail(password)?
                .finish(MSG_CONNECT),
            HostMessage::Subscribe { filter } => w.tail(filter)?.finish(MSG_SUBSCRIBE),
            HostMessage::Ping => Ok(Frame::empty(MSG_PING)),
        }
    }

    /// Parse a host message (bridge side of the link)
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        let mut r = PayloadReader::new(&frame.payload);
        let msg = match frame.msg_type {
            MSG_JOIN => HostMessage::Join {
                ssid: r.prefixed()?,
                password: r.tail()?,
            },
            MSG_CONNECT => HostMessage::Connect {
                port: r.u16()?,
                host: r.prefixed()?,
                username: r.prefixed()?,
                password: r.tail()?,
            },
            MSG_SUBSCRIBE => HostMessage::Subscribe { filter: r.tail()? },
            MSG_PING => HostMessage::Ping,
            other => return Err(FrameError::UnknownType(other)),
        };
        r.end()?;
        Ok(msg)
    }
}

/// Events reported by the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeEvent {
    /// Wireless network joined
    LinkUp,
    /// Network or broker connection lost
    LinkDown { reason: u8 },
    /// Broker session result, [`CONNACK_ACCEPTED`] on success
    ConnAck { code: u8 },
    /// Subscription acknowledged
    SubAck,
    /// Message received on the subscribed filter
    Publish(Publish),
    /// Heartbeat response
    Pong,
}

impl BridgeEvent {
    /// Parse an event from a bridge-originated frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        let mut r = PayloadReader::new(&frame.payload);
        let event = match frame.msg_type {
            MSG_LINK_UP => BridgeEvent::LinkUp,
            MSG_LINK_DOWN => BridgeEvent::LinkDown { reason: r.u8()? },
            MSG_CONNACK => BridgeEvent::ConnAck { code: r.u8()? },
            MSG_SUBACK => BridgeEvent::SubAck,
            MSG_PUBLISH => {
                let topic = r.prefixed()?;
                let payload = r.tail()?;
                BridgeEvent::Publish(Publish::new(topic, payload)?)
            }
            MSG_PONG => BridgeEvent::Pong,
            other => return Err(FrameError::UnknownType(other)),
        };
        r.end()?;
        Ok(event)
    }

    /// Encode this event into a frame (bridge side of the link)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let mut w = PayloadWriter::new();
        match self {
            BridgeEvent::LinkUp => Ok(Frame::empty(MSG_LINK_UP)),
            BridgeEvent::LinkDown { reason } => w.u8(*reason)?.finish(MSG_LINK_DOWN),
            BridgeEvent::ConnAck { code } => w.u8(*code)?.finish(MSG_CONNACK),
            BridgeEvent::SubAck => Ok(Frame::empty(MSG_SUBACK)),
            BridgeEvent::Publish(publish) => w
                .prefixed(publish.topic())?
                .tail(publish.payload())?
                .finish(MSG_PUBLISH),
            BridgeEvent::Pong => Ok(Frame::empty(MSG_PONG)),
        }
    }
}
