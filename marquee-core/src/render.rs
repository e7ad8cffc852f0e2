//! Render task
//!
//! Presents a snapshot of the lines once per frame. Frames are paced to the
//! target rate; the interval between two presentations is also checked
//! against a floor rate, and a frame that comes too late is counted but
//! never treated as an error.

use core::convert::Infallible;

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::config::DisplayConfig;
use crate::lines::LineStore;
use crate::traits::{Clock, DisplayError, LabelDisplay};

const MICROS_PER_SECOND: u64 = 1_000_000;

/// Presentation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameStats {
    /// Frames presented
    pub frames: u32,
    /// Intervals longer than the floor allows
    pub overruns: u32,
    /// Longest interval seen between two presentations
    pub max_interval_us: u64,
}

/// Frame timing bookkeeping
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval_us: u64,
    floor_us: u64,
    last_us: Option<u64>,
    stats: FrameStats,
}

impl FramePacer {
    /// Pace at `target_fps`, flag intervals slower than `min_fps`
    pub fn new(target_fps: u32, min_fps: u32) -> Self {
        Self {
            interval_us: MICROS_PER_SECOND / u64::from(target_fps.max(1)),
            floor_us: MICROS_PER_SECOND / u64::from(min_fps.max(1)),
            last_us: None,
            stats: FrameStats::default(),
        }
    }

    pub fn interval_us(&self) -> u64 {
        self.interval_us
    }

    pub fn floor_us(&self) -> u64 {
        self.floor_us
    }

    /// Record a presentation at `now_us`
    ///
    /// Returns the interval since the previous one if it exceeded the floor.
    pub fn record(&mut self, now_us: u64) -> Option<u64> {
        self.stats.frames = self.stats.frames.saturating_add(1);
        let last = self.last_us.replace(now_us)?;

        let interval = now_us.saturating_sub(last);
        self.stats.max_interval_us = self.stats.max_interval_us.max(interval);
        if interval > self.floor_us {
            self.stats.overruns = self.stats.overruns.saturating_add(1);
            Some(interval)
        } else {
            None
        }
    }

    /// Time left until the next frame is due
    pub fn remaining(&self, now_us: u64) -> u64 {
        match self.last_us {
            Some(last) => (last + self.interval_us).saturating_sub(now_us),
            None => 0,
        }
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}

/// Keeps a [`LabelDisplay`] showing the current lines
pub struct RenderTask<'a, D, C, Dl, M>
where
    D: LabelDisplay,
    C: Clock,
    Dl: DelayNs,
    M: RawMutex,
{
    display: D,
    lines: &'a LineStore<M>,
    clock: C,
    delay: Dl,
    pacer: FramePacer,
}

impl<'a, D, C, Dl, M> RenderTask<'a, D, C, Dl, M>
where
    D: LabelDisplay,
    C: Clock,
    Dl: DelayNs,
    M: RawMutex,
{
    pub fn new(
        display: D,
        lines: &'a LineStore<M>,
        clock: C,
        delay: Dl,
        config: &DisplayConfig,
    ) -> Self {
        Self {
            display,
            lines,
            clock,
            delay,
            pacer: FramePacer::new(config.target_fps, config.min_fps),
        }
    }

    pub fn stats(&self) -> FrameStats {
        self.pacer.stats()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Present one frame, then wait for the next slot or yield
    pub async fn frame(&mut self) -> Result<(), DisplayError> {
        let started = self.clock.now_micros();
        let snapshot = self.lines.snapshot();
        if let Err(e) = self.display.present(&snapshot).await {
            error!("Display present failed: {:?}", e);
            return Err(e);
        }

        // Intervals are measured between presentation starts
        if let Some(interval) = self.pacer.record(started) {
            warn!(
                "Frame interval {} us exceeds floor of {} us",
                interval,
                self.pacer.floor_us()
            );
        }

        let wait = self.pacer.remaining(self.clock.now_micros());
        if wait > 0 {
            self.delay
                .delay_us(u32::try_from(wait).unwrap_or(u32::MAX))
                .await;
        } else {
            yield_now().await;
        }
        Ok(())
    }

    /// Render until the display fails
    pub async fn run(&mut self) -> Result<Infallible, DisplayError> {
        loop {
            self.frame().await?;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::lines::{LineModel, Snapshot};
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    /// Simulated monotonic clock
    #[derive(Default)]
    pub(crate) struct SimClock {
        now: Cell<u64>,
    }

    impl SimClock {
        pub(crate) fn advance(&self, us: u64) {
            self.now.set(self.now.get() + us);
        }
    }

    impl Clock for SimClock {
        fn now_micros(&self) -> u64 {
            self.now.get()
        }
    }

    /// Delay that advances the simulated clock, then suspends once
    pub(crate) struct SimDelay<'c> {
        pub(crate) clock: &'c SimClock,
    }

    impl DelayNs for SimDelay<'_> {
        async fn delay_ns(&mut self, ns: u32) {
            self.clock.advance(u64::from(ns).div_ceil(1000));
            yield_now().await;
        }

        async fn delay_us(&mut self, us: u32) {
            self.clock.advance(u64::from(us));
            yield_now().await;
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.clock.advance(u64::from(ms) * 1000);
            yield_now().await;
        }
    }

    /// Display that records frames and takes simulated time to present
    pub(crate) struct RecordingDisplay<'c> {
        pub(crate) clock: &'c SimClock,
        pub(crate) cost_us: u64,
        pub(crate) frames: Vec<Snapshot>,
        /// Fail with `NotReady` once this many frames were shown
        pub(crate) fail_after: Option<usize>,
    }

    impl<'c> RecordingDisplay<'c> {
        pub(crate) fn new(clock: &'c SimClock, cost_us: u64) -> Self {
            Self {
                clock,
                cost_us,
                frames: Vec::new(),
                fail_after: None,
            }
        }
    }

    impl LabelDisplay for RecordingDisplay<'_> {
        async fn present(&mut self, frame: &Snapshot) -> Result<(), DisplayError> {
            if self.fail_after.is_some_and(|n| self.frames.len() >= n) {
                return Err(DisplayError::NotReady);
            }
            self.clock.advance(self.cost_us);
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    #[test]
    fn test_pacer_intervals() {
        let pacer = FramePacer::new(60, 30);
        assert_eq!(pacer.interval_us(), 16_666);
        assert_eq!(pacer.floor_us(), 33_333);
    }

    #[test]
    fn test_pacer_counts_overruns() {
        let mut pacer = FramePacer::new(60, 30);
        assert_eq!(pacer.record(0), None);
        assert_eq!(pacer.record(16_000), None);
        assert_eq!(pacer.record(60_000), Some(44_000));
        assert_eq!(pacer.record(70_000), None);

        let stats = pacer.stats();
        assert_eq!(stats.frames, 4);
        assert_eq!(stats.overruns, 1);
        assert_eq!(stats.max_interval_us, 44_000);
    }

    #[test]
    fn test_pacer_remaining() {
        let mut pacer = FramePacer::new(50, 25);
        assert_eq!(pacer.remaining(123), 0);
        pacer.record(1_000);
        assert_eq!(pacer.remaining(5_000), 16_000);
        assert_eq!(pacer.remaining(30_000), 0);
    }

    #[test]
    fn test_frames_paced_to_target() {
        let clock = SimClock::default();
        let lines: LineStore<NoopRawMutex> = LineStore::new(LineModel::default());
        let display = RecordingDisplay::new(&clock, 2_000);
        let mut render = RenderTask::new(
            display,
            &lines,
            &clock,
            SimDelay { clock: &clock },
            &DisplayConfig::default(),
        );

        block_on(async {
            for _ in 0..10 {
                render.frame().await.unwrap();
            }
        });

        let stats = render.stats();
        assert_eq!(stats.frames, 10);
        assert_eq!(stats.overruns, 0);
        assert!(stats.max_interval_us <= 16_667);
        assert!(clock.now_micros() >= 9 * 16_666);
    }

    #[test]
    fn test_slow_display_is_not_fatal() {
        let clock = SimClock::default();
        let lines: LineStore<NoopRawMutex> = LineStore::new(LineModel::default());
        let display = RecordingDisplay::new(&clock, 50_000);
        let mut render = RenderTask::new(
            display,
            &lines,
            &clock,
            SimDelay { clock: &clock },
            &DisplayConfig::default(),
        );

        block_on(async {
            for _ in 0..5 {
                render.frame().await.unwrap();
            }
        });

        let stats = render.stats();
        assert_eq!(stats.frames, 5);
        assert_eq!(stats.overruns, 4);
        assert_eq!(stats.max_interval_us, 50_000);
    }

    #[test]
    fn test_present_error_is_returned() {
        let clock = SimClock::default();
        let lines: LineStore<NoopRawMutex> = LineStore::new(LineModel::default());
        let mut display = RecordingDisplay::new(&clock, 1_000);
        display.fail_after = Some(3);
        let mut render = RenderTask::new(
            display,
            &lines,
            &clock,
            SimDelay { clock: &clock },
            &DisplayConfig::default(),
        );

        let result = block_on(render.run());

        assert_eq!(result.err(), Some(DisplayError::NotReady));
        assert_eq!(render.display().frames.len(), 3);
        assert_eq!(render.stats().frames, 3);
    }

    #[test]
    fn test_frame_shows_current_lines() {
        let clock = SimClock::default();
        let lines: LineStore<NoopRawMutex> = LineStore::new(LineModel::default());
        let display = RecordingDisplay::new(&clock, 0);
        let mut render = RenderTask::new(
            display,
            &lines,
            &clock,
            SimDelay { clock: &clock },
            &DisplayConfig::default(),
        );

        block_on(render.frame()).unwrap();
        lines.update(|m| m.set_color(2, crate::color::Rgb::BLACK));
        block_on(render.frame()).unwrap();

        let frames = &render.display().frames;
        assert_eq!(frames.len(), 2);
        assert_ne!(frames[0], frames[1]);
        assert_eq!(frames[1].get(2).unwrap().color(), crate::color::Rgb::BLACK);
    }
}
