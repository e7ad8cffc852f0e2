//! Feed client backed by the network bridge
//!
//! The bridge co-processor owns Wi-Fi and the MQTT session. This side only
//! asks it to join, connect and subscribe, then receives forwarded publishes
//! from the RX task through [`BRIDGE_EVENTS`].

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embassy_time::{with_deadline, with_timeout, Duration, Instant};
use embedded_io_async::Write;

use marquee_core::config::{BrokerConfig, NetworkConfig};
use marquee_core::traits::{FeedClient, FeedError};
use marquee_protocol::messages::CONNACK_ACCEPTED;
use marquee_protocol::{BridgeEvent, HostMessage, Publish, MAX_FRAME_SIZE};

use crate::channels::BRIDGE_EVENTS;

/// How long each handshake step may take
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Idle polls without any sign of life before the link is declared dead
const MAX_MISSED_PONGS: u8 = 3;

/// Which handshake reply we are waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
enum Step {
    Join,
    Connect,
    Subscribe,
}

pub struct BridgeFeed {
    tx: BufferedUartTx,
    network: &'static NetworkConfig,
    broker: &'static BrokerConfig,
    /// A ping is outstanding
    pinged: bool,
    missed_pongs: u8,
}

impl BridgeFeed {
    pub fn new(
        tx: BufferedUartTx,
        network: &'static NetworkConfig,
        broker: &'static BrokerConfig,
    ) -> Self {
        Self {
            tx,
            network,
            broker,
            pinged: false,
            missed_pongs: 0,
        }
    }

    async fn send(&mut self, msg: &HostMessage<'_>) -> Result<(), FeedError> {
        let frame = msg.to_frame().map_err(|e| {
            error!("Cannot encode {:?}: {:?}", msg, e);
            FeedError::Protocol
        })?;

        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = frame.encode(&mut buf).map_err(|_| FeedError::Protocol)?;
        self.tx.write_all(&buf[..len]).await.map_err(|e| {
            warn!("Bridge UART write failed: {:?}", e);
            FeedError::ConnectionLost
        })
    }

    /// Wait for the reply to `step`, skipping unrelated events
    async fn expect(&mut self, step: Step) -> Result<(), FeedError> {
        let deadline = Instant::now() + HANDSHAKE_TIMEOUT;
        loop {
            let event = with_deadline(deadline, BRIDGE_EVENTS.receive())
                .await
                .map_err(|_| {
                    warn!("Bridge handshake timed out at {:?}", step);
                    FeedError::Timeout
                })?;

            match (step, event) {
                (_, BridgeEvent::LinkDown { reason }) => {
                    warn!("Bridge link down during {:?} (reason {})", step, reason);
                    return Err(FeedError::ConnectionLost);
                }
                (Step::Join, BridgeEvent::LinkUp) => return Ok(()),
                (Step::Connect, BridgeEvent::ConnAck { code }) if code == CONNACK_ACCEPTED => {
                    return Ok(())
                }
                (Step::Connect, BridgeEvent::ConnAck { code }) => {
                    return Err(FeedError::Refused(code));
                }
                (Step::Subscribe, BridgeEvent::SubAck) => return Ok(()),
                (_, other) => debug!("Ignoring {:?} while waiting for {:?}", other, step),
            }
        }
    }

    /// Discard whatever the previous session left queued
    fn drain(&mut self) {
        let mut stale = 0u32;
        while BRIDGE_EVENTS.try_receive().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            debug!("Dropped {} stale bridge events", stale);
        }
    }

    /// Probe the link after an idle poll
    async fn heartbeat(&mut self) -> Result<(), FeedError> {
        if self.pinged {
            self.missed_pongs += 1;
            if self.missed_pongs >= MAX_MISSED_PONGS {
                warn!("Bridge silent for {} polls", self.missed_pongs);
                return Err(FeedError::ConnectionLost);
            }
        }
        self.pinged = true;
        self.send(&HostMessage::Ping).await
    }

    fn alive(&mut self) {
        self.pinged = false;
        self.missed_pongs = 0;
    }
}

impl FeedClient for BridgeFeed {
    async fn connect(&mut self, filter: &str) -> Result<(), FeedError> {
        let (network, broker) = (self.network, self.broker);
        self.drain();
        self.alive();

        self.send(&HostMessage::Join {
            ssid: &network.ssid,
            password: &network.password,
        })
        .await?;
        self.expect(Step::Join).await?;
        info!("Bridge joined {}", network.ssid.as_str());

        self.send(&HostMessage::Connect {
            host: &broker.host,
            port: broker.port,
            username: &broker.username,
            password: &broker.password,
        })
        .await?;
        self.expect(Step::Connect).await?;
        info!("Broker {}:{} accepted session", broker.host.as_str(), broker.port);

        self.send(&HostMessage::Subscribe { filter }).await?;
        self.expect(Step::Subscribe).await
    }

    async fn poll(&mut self, timeout_ms: u32) -> Result<Option<Publish>, FeedError> {
        let timeout = Duration::from_millis(u64::from(timeout_ms));
        let Ok(event) = with_timeout(timeout, BRIDGE_EVENTS.receive()).await else {
            self.heartbeat().await?;
            return Ok(None);
        };

        self.alive();
        match event {
            BridgeEvent::Publish(publish) => Ok(Some(publish)),
            BridgeEvent::Pong => {
                trace!("PONG received");
                Ok(None)
            }
            BridgeEvent::LinkDown { reason } => {
                warn!("Bridge link down (reason {})", reason);
                Err(FeedError::ConnectionLost)
            }
            other => {
                warn!("Unexpected bridge event {:?}", other);
                Err(FeedError::Protocol)
            }
        }
    }
}
