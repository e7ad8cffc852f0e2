//! Label task
//!
//! Owns the line model and runs the feed and render tasks together on the
//! core0 executor. Returns only if the display fails, which halts the
//! firmware.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::Delay;

use marquee_core::config::MarqueeConfig;
use marquee_core::feed::FeedTask;
use marquee_core::render::RenderTask;
use marquee_core::{LineModel, LineStore, Scheduler, TopicRouter};
use marquee_display::{LabelLayout, LabelRenderer, MatrixDisplay};

use crate::bridge::BridgeFeed;
use crate::clock::EmbassyClock;
use crate::shared_frame::{PanelFrame, SharedFrame};

#[embassy_executor::task]
pub async fn label_task(
    config: &'static MarqueeConfig,
    tx: BufferedUartTx,
    frame: &'static mut PanelFrame,
) {
    info!("Label task started");

    // Router and renderer share one executor, so no cross-core locking
    let lines: LineStore<NoopRawMutex> = LineStore::new(LineModel::new(config.lines.clone()));

    let client = BridgeFeed::new(tx, &config.network, &config.broker);
    let feed = FeedTask::new(
        client,
        TopicRouter::standard(&lines),
        Delay,
        config.feed.clone(),
    );

    let renderer = LabelRenderer::new(LabelLayout::from_config(&config.display));
    let display = MatrixDisplay::new(SharedFrame, frame, renderer);
    let render = RenderTask::new(display, &lines, EmbassyClock, Delay, &config.display);

    let mut scheduler = Scheduler::new(feed, render);
    let err = scheduler.run().await;

    let stats = scheduler.render().stats();
    error!(
        "Display failed after {} frames ({} overruns): {:?}",
        stats.frames, stats.overruns, err
    );
    defmt::panic!("display failure: {:?}", err);
}
