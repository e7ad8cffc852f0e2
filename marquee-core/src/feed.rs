//! Feed task
//!
//! Keeps the feed session alive and hands every received message to the
//! router. Each call to [`FeedTask::step`] is one bounded turn that ends by
//! yielding, so the render task always gets a chance to run between
//! messages.

use core::convert::Infallible;

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::config::FeedConfig;
use crate::router::{RouteOutcome, TopicRouter};
use crate::traits::{FeedClient, FeedError};

/// Exponential reconnect delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    initial_ms: u32,
    max_ms: u32,
    current_ms: u32,
}

impl Backoff {
    pub const fn new(initial_ms: u32, max_ms: u32) -> Self {
        Self {
            initial_ms,
            max_ms,
            current_ms: 0,
        }
    }

    /// Delay to wait before the next attempt, 0 if none
    pub fn pending_ms(&self) -> u32 {
        self.current_ms
    }

    /// Record a failed attempt and return the new delay
    pub fn fail(&mut self) -> u32 {
        self.current_ms = if self.current_ms == 0 {
            self.initial_ms
        } else {
            self.current_ms.saturating_mul(2)
        }
        .min(self.max_ms);
        self.current_ms
    }

    pub fn reset(&mut self) {
        self.current_ms = 0;
    }
}

/// Result of one feed turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedTurn {
    /// Session established
    Connected,
    /// Connect attempt failed
    ConnectFailed(FeedError),
    /// Poll returned a message; `None` if the router rejected it
    Message(Option<RouteOutcome>),
    /// Poll timed out with nothing to deliver
    Idle,
    /// Session lost; reconnect on the next turn
    Disconnected(FeedError),
    /// Bad data on a live session, skipped
    Skipped,
}

/// Polls a [`FeedClient`] and routes what it delivers
pub struct FeedTask<'a, F, D, M>
where
    F: FeedClient,
    D: DelayNs,
    M: RawMutex,
{
    client: F,
    router: TopicRouter<'a, M>,
    delay: D,
    config: FeedConfig,
    backoff: Backoff,
    connected: bool,
}

impl<'a, F, D, M> FeedTask<'a, F, D, M>
where
    F: FeedClient,
    D: DelayNs,
    M: RawMutex,
{
    pub fn new(client: F, router: TopicRouter<'a, M>, delay: D, config: FeedConfig) -> Self {
        let backoff = Backoff::new(config.retry_initial_ms, config.retry_max_ms);
        Self {
            client,
            router,
            delay,
            config,
            backoff,
            connected: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    pub fn client(&self) -> &F {
        &self.client
    }

    /// One bounded turn: connect or poll once, then yield
    pub async fn step(&mut self) -> FeedTurn {
        let turn = if self.connected {
            self.poll_once().await
        } else {
            self.connect_once().await
        };
        yield_now().await;
        turn
    }

    /// Run forever
    pub async fn run(&mut self) -> Infallible {
        loop {
            self.step().await;
        }
    }

    async fn connect_once(&mut self) -> FeedTurn {
        let wait = self.backoff.pending_ms();
        if wait > 0 {
            debug!("Reconnecting in {} ms", wait);
            self.delay.delay_ms(wait).await;
        }

        match self.client.connect(&self.config.topic).await {
            Ok(()) => {
                info!("Feed connected, subscribed to {}", self.config.topic.as_str());
                self.backoff.reset();
                self.connected = true;
                FeedTurn::Connected
            }
            Err(e) => {
                let next = self.backoff.fail();
                warn!("Feed connect failed: {:?}, next attempt in {} ms", e, next);
                FeedTurn::ConnectFailed(e)
            }
        }
    }

    async fn poll_once(&mut self) -> FeedTurn {
        match self.client.poll(self.config.poll_timeout_ms).await {
            Ok(Some(publish)) => FeedTurn::Message(self.router.handle(&publish)),
            Ok(None) => FeedTurn::Idle,
            Err(e) if e.is_transient() => {
                warn!("Feed connection lost: {:?}", e);
                self.connected = false;
                FeedTurn::Disconnected(e)
            }
            Err(e) => {
                error!("Feed protocol error on {}: {:?}", self.config.topic.as_str(), e);
                FeedTurn::Skipped
            }
        }
    }
}
