//! Topic router
//!
//! Turns one inbound (topic, payload) pair into at most one line mutation.
//! Text payloads are folded through the [`CharMap`]; color payloads are
//! matched verbatim against the [`ColorTable`]. Invalid updates leave every
//! line untouched.

use embassy_sync::blocking_mutex::raw::RawMutex;
use marquee_protocol::topic::{self, Route, TopicError, UpdateKind};
use marquee_protocol::Publish;

use crate::charmap::CharMap;
use crate::color::{ColorTable, Rgb};
use crate::lines::{LineStore, LineText, LINE_COUNT};

/// Reasons an update was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RouteError {
    /// Topic does not follow `<prefix>/<kind>/<index>`
    MalformedTopic,
    /// Color name not in the table
    UnknownColor,
    /// Line index not below [`LINE_COUNT`]
    IndexOutOfRange,
}

impl From<TopicError> for RouteError {
    fn from(e: TopicError) -> Self {
        match e {
            TopicError::Malformed => RouteError::MalformedTopic,
            TopicError::IndexOutOfRange => RouteError::IndexOutOfRange,
        }
    }
}

/// What an accepted update did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RouteOutcome {
    /// Line text replaced; `truncated` if the text did not fit
    Text { line: usize, truncated: bool },
    /// Line color replaced
    Color { line: usize, color: Rgb },
    /// Topic kind not handled here
    Ignored,
}

/// Applies feed updates to the shared lines
pub struct TopicRouter<'a, M: RawMutex> {
    lines: &'a LineStore<M>,
    chars: CharMap,
    colors: ColorTable,
}

impl<'a, M: RawMutex> TopicRouter<'a, M> {
    pub fn new(lines: &'a LineStore<M>, chars: CharMap, colors: ColorTable) -> Self {
        Self {
            lines,
            chars,
            colors,
        }
    }

    /// Router with the built-in character and color tables
    pub fn standard(lines: &'a LineStore<M>) -> Self {
        Self::new(lines, CharMap::standard(), ColorTable::standard())
    }

    /// Apply one update
    pub fn route(&self, topic: &str, payload: &str) -> Result<RouteOutcome, RouteError> {
        let target = match topic::parse(topic, LINE_COUNT)? {
            Route::Update(target) => target,
            Route::Unrecognized => return Ok(RouteOutcome::Ignored),
        };
        let line = target.line;

        match target.kind {
            UpdateKind::Text => {
                // Normalize before taking the store so the write is one step
                let mut text = LineText::new();
                let truncated = self.chars.normalize_into(payload, &mut text);
                if !self.lines.update(|model| model.set_text(line, text)) {
                    return Err(RouteError::IndexOutOfRange);
                }
                Ok(RouteOutcome::Text { line, truncated })
            }
            UpdateKind::Color => {
                let color = self.colors.get(payload).ok_or(RouteError::UnknownColor)?;
                if !self.lines.update(|model| model.set_color(line, color)) {
                    return Err(RouteError::IndexOutOfRange);
                }
                Ok(RouteOutcome::Color { line, color })
            }
        }
    }

    /// Apply one update and log the result; errors stop here
    pub fn handle(&self, publish: &Publish) -> Option<RouteOutcome> {
        let topic = publish.topic();
        let payload = publish.payload();

        match self.route(topic, payload) {
            Ok(RouteOutcome::Ignored) => {
                trace!("Ignoring topic {}", topic);
                Some(RouteOutcome::Ignored)
            }
            Ok(outcome @ RouteOutcome::Text { line, truncated }) => {
                info!("Updating line {} to: {}", line, payload);
                if truncated {
                    warn!("Line {} text truncated to {} bytes", line, crate::lines::MAX_TEXT_LEN);
                }
                Some(outcome)
            }
            Ok(outcome @ RouteOutcome::Color { line, color }) => {
                info!("Updating line {} color to {} ({=u32:#x})", line, payload, color.packed());
                Some(outcome)
            }
            Err(RouteError::UnknownColor) => {
                warn!("Color {} not found in color table ({})", payload, topic);
                None
            }
            Err(e) => {
                warn!("Rejected update on {}: {:?}", topic, e);
                None
            }
        }
    }
}
