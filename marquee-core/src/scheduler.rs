//! Scheduler
//!
//! Runs the feed and render tasks side by side on one executor. Both tasks
//! suspend at least once per turn, so neither can starve the other, and
//! every access to the shared lines happens inside a synchronous closure.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::feed::FeedTask;
use crate::render::RenderTask;
use crate::traits::{Clock, DisplayError, FeedClient, LabelDisplay};

/// Owns both tasks and drives them together
pub struct Scheduler<'a, F, FD, D, C, RD, M>
where
    F: FeedClient,
    FD: DelayNs,
    D: LabelDisplay,
    C: Clock,
    RD: DelayNs,
    M: RawMutex,
{
    feed: FeedTask<'a, F, FD, M>,
    render: RenderTask<'a, D, C, RD, M>,
}

impl<'a, F, FD, D, C, RD, M> Scheduler<'a, F, FD, D, C, RD, M>
where
    F: FeedClient,
    FD: DelayNs,
    D: LabelDisplay,
    C: Clock,
    RD: DelayNs,
    M: RawMutex,
{
    pub fn new(feed: FeedTask<'a, F, FD, M>, render: RenderTask<'a, D, C, RD, M>) -> Self {
        Self { feed, render }
    }

    pub fn feed(&self) -> &FeedTask<'a, F, FD, M> {
        &self.feed
    }

    pub fn render(&self) -> &RenderTask<'a, D, C, RD, M> {
        &self.render
    }

    /// Run both tasks until the display fails
    ///
    /// The feed task never finishes, so the only way out is a fatal
    /// display error, which is returned.
    pub async fn run(&mut self) -> DisplayError {
        match select(self.feed.run(), self.render.run()).await {
            Either::First(never) => match never {},
            Either::Second(Ok(never)) => match never {},
            Either::Second(Err(e)) => {
                error!("Render task stopped: {:?}", e);
                e
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DisplayConfig, FeedConfig};
    use crate::lines::{LineModel, LineStore, LINE_COUNT};
    use crate::render::tests::{RecordingDisplay, SimClock, SimDelay};
    use crate::router::TopicRouter;
    use crate::traits::FeedError;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use marquee_protocol::Publish;

    /// Feed that always has a message ready and costs simulated time
    struct FloodClient<'c> {
        clock: &'c SimClock,
        cost_us: u64,
        sent: usize,
    }

    impl FeedClient for FloodClient<'_> {
        async fn connect(&mut self, _filter: &str) -> Result<(), FeedError> {
            Ok(())
        }

        async fn poll(&mut self, _timeout_ms: u32) -> Result<Option<Publish>, FeedError> {
            self.clock.advance(self.cost_us);
            let line = self.sent % LINE_COUNT;
            let topic = format!("home/display/text/{}", line);
            let payload = format!("msg {}", self.sent);
            self.sent += 1;
            Ok(Some(Publish::new(&topic, &payload).unwrap()))
        }
    }

    /// Feed that delivers a fixed list, then stays idle
    struct ListClient {
        pending: Vec<Publish>,
    }

    impl FeedClient for ListClient {
        async fn connect(&mut self, _filter: &str) -> Result<(), FeedError> {
            Ok(())
        }

        async fn poll(&mut self, _timeout_ms: u32) -> Result<Option<Publish>, FeedError> {
            if self.pending.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.pending.remove(0)))
            }
        }
    }

    #[test]
    fn test_frame_floor_holds_under_saturated_feed() {
        let clock = SimClock::default();
        let lines: LineStore<NoopRawMutex> = LineStore::new(LineModel::default());
        let client = FloodClient {
            clock: &clock,
            cost_us: 5_000,
            sent: 0,
        };
        let feed = FeedTask::new(
            client,
            TopicRouter::standard(&lines),
            SimDelay { clock: &clock },
            FeedConfig::default(),
        );
        let mut display = RecordingDisplay::new(&clock, 2_000);
        display.fail_after = Some(200);
        let render = RenderTask::new(
            display,
            &lines,
            &clock,
            SimDelay { clock: &clock },
            &DisplayConfig::default(),
        );
        let mut scheduler = Scheduler::new(feed, render);

        let err = block_on(scheduler.run());

        assert_eq!(err, DisplayError::NotReady);
        let stats = scheduler.render().stats();
        assert_eq!(stats.frames, 200);
        assert_eq!(stats.overruns, 0);
        assert!(stats.max_interval_us <= 33_333, "max interval {}", stats.max_interval_us);
        // The feed kept flowing too
        assert!(scheduler.feed().client().sent >= 150);
    }

    #[test]
    fn test_updates_to_all_lines_become_visible() {
        let clock = SimClock::default();
        let lines: LineStore<NoopRawMutex> = LineStore::new(LineModel::default());
        let pending = (0..LINE_COUNT)
            .flat_map(|i| {
                [
                    Publish::new(&format!("home/display/text/{}", i), &format!("line {}", i))
                        .unwrap(),
                    Publish::new(&format!("home/display/color/{}", i), "GREEN").unwrap(),
                ]
            })
            .collect();
        let feed = FeedTask::new(
            ListClient { pending },
            TopicRouter::standard(&lines),
            SimDelay { clock: &clock },
            FeedConfig::default(),
        );
        let mut display = RecordingDisplay::new(&clock, 1_000);
        display.fail_after = Some(20);
        let render = RenderTask::new(
            display,
            &lines,
            &clock,
            SimDelay { clock: &clock },
            &DisplayConfig::default(),
        );
        let mut scheduler = Scheduler::new(feed, render);

        block_on(scheduler.run());

        let frames = &scheduler.render().display().frames;
        // Rendering interleaved with the updates rather than waiting for them
        assert!(frames.first().unwrap().get(LINE_COUNT - 1).unwrap().text().is_empty());
        let last = frames.last().unwrap();
        for (i, slot) in last.iter() {
            assert_eq!(slot.text(), format!("line {}", i));
            assert_eq!(slot.color().packed(), 0x00ff00);
        }
    }

    #[test]
    fn test_display_failure_ends_run() {
        let clock = SimClock::default();
        let lines: LineStore<NoopRawMutex> = LineStore::new(LineModel::default());
        let feed = FeedTask::new(
            ListClient { pending: Vec::new() },
            TopicRouter::standard(&lines),
            SimDelay { clock: &clock },
            FeedConfig::default(),
        );
        let mut display = RecordingDisplay::new(&clock, 0);
        display.fail_after = Some(0);
        let render = RenderTask::new(
            display,
            &lines,
            &clock,
            SimDelay { clock: &clock },
            &DisplayConfig::default(),
        );
        let mut scheduler = Scheduler::new(feed, render);

        assert_eq!(block_on(scheduler.run()), DisplayError::NotReady);
        assert_eq!(scheduler.render().stats().frames, 0);
    }
}
