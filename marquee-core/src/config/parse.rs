//! Minimal TOML reader for the device configuration
//!
//! Handles only the subset `marquee.toml` needs, without allocating:
//!
//! - `[section]` and `[section.sub]` headers
//! - `key = value` with quoted strings or integers
//! - String escapes `\"`, `\\`, `\n`, `\t`
//! - Comments (# ...), whole-line or trailing
//!
//! Unknown keys are skipped so newer files still load on older firmware.
//! Unknown sections are rejected; they usually mean a typo.

use heapless::String;

use super::types::MarqueeConfig;
use crate::charmap::CharMap;
use crate::color::ColorTable;
use crate::lines::{LineText, LINE_COUNT, MAX_TEXT_LEN};

/// Longest color name accepted in `[line.<n>]`
const MAX_COLOR_NAME_LEN: usize = 16;

/// What went wrong on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Neither a header nor `key = value`
    Syntax,
    /// Header names no known section
    UnknownSection,
    /// `[line.<n>]` with `n` not a line index
    LineIndex,
    /// Value has the wrong type or is badly quoted
    InvalidValue,
    /// String does not fit its field
    TooLong,
    /// Color name not in the color table
    UnknownColor,
}

/// Parse failure with its 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Network,
    Broker,
    Feed,
    Display,
    Line(usize),
}

/// Parse configuration text, starting from the defaults
pub fn parse_config(input: &str) -> Result<MarqueeConfig, ParseError> {
    let mut config = MarqueeConfig::default();
    let mut section = Section::Root;

    for (number, raw) in input.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        let header = line.strip_prefix('[').and_then(|l| l.strip_suffix(']'));
        let result = if let Some(header) = header {
            parse_section_header(header).map(|s| section = s)
        } else {
            match split_key_value(line) {
                Some((key, value)) => apply_value(section, key, value, &mut config),
                None => Err(ParseErrorKind::Syntax),
            }
        };

        result.map_err(|kind| ParseError {
            line: number + 1,
            kind,
        })?;
    }

    Ok(config)
}

/// Parse a header body like "display" or "line.2"
fn parse_section_header(header: &str) -> Result<Section, ParseErrorKind> {
    let header = header.trim();

    if let Some((kind, name)) = header.split_once('.') {
        return match kind.trim() {
            "line" => {
                let index: usize = name.trim().parse().map_err(|_| ParseErrorKind::LineIndex)?;
                if index < LINE_COUNT {
                    Ok(Section::Line(index))
                } else {
                    Err(ParseErrorKind::LineIndex)
                }
            }
            _ => Err(ParseErrorKind::UnknownSection),
        };
    }

    match header {
        "network" => Ok(Section::Network),
        "broker" => Ok(Section::Broker),
        "feed" => Ok(Section::Feed),
        "display" => Ok(Section::Display),
        _ => Err(ParseErrorKind::UnknownSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut MarqueeConfig,
) -> Result<(), ParseErrorKind> {
    match section {
        Section::Root => {}
        Section::Network => match key {
            "ssid" => config.network.ssid = parse_string(value)?,
            "password" => config.network.password = parse_string(value)?,
            _ => {}
        },
        Section::Broker => match key {
            "host" => config.broker.host = parse_string(value)?,
            "port" => config.broker.port = parse_int(value)?,
            "username" => config.broker.username = parse_string(value)?,
            "password" => config.broker.password = parse_string(value)?,
            _ => {}
        },
        Section::Feed => match key {
            "topic" => config.feed.topic = parse_string(value)?,
            "poll_timeout_ms" => config.feed.poll_timeout_ms = parse_int(value)?,
            "retry_initial_ms" => config.feed.retry_initial_ms = parse_int(value)?,
            "retry_max_ms" => config.feed.retry_max_ms = parse_int(value)?,
            _ => {}
        },
        Section::Display => {
            let d = &mut config.display;
            match key {
                "width" => d.width = parse_int(value)?,
                "height" => d.height = parse_int(value)?,
                "bit_depth" => d.bit_depth = parse_int(value)?,
                "target_fps" => d.target_fps = parse_int(value)?,
                "min_fps" => d.min_fps = parse_int(value)?,
                "origin_x" => d.origin_x = parse_int(value)?,
                "first_line_y" => d.first_line_y = parse_int(value)?,
                "line_pitch" => d.line_pitch = parse_int(value)?,
                _ => {}
            }
        }
        Section::Line(index) => match key {
            "text" => {
                let raw: String<MAX_TEXT_LEN> = parse_string(value)?;
                // Boot text goes through the same folding as feed text
                let text: LineText = CharMap::standard().normalize(&raw);
                config.lines[index].set_text(text);
            }
            "color" => {
                let name: String<MAX_COLOR_NAME_LEN> =
                    parse_string(value).map_err(|e| match e {
                        ParseErrorKind::TooLong => ParseErrorKind::UnknownColor,
                        other => other,
                    })?;
                let color = ColorTable::standard()
                    .get(&name)
                    .ok_or(ParseErrorKind::UnknownColor)?;
                config.lines[index].set_color(color);
            }
            _ => {}
        },
    }
    Ok(())
}

/// Cut a trailing comment, ignoring `#` inside strings
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Split "key = value"
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Parse a quoted string, resolving escapes
fn parse_string<const N: usize>(value: &str) -> Result<String<N>, ParseErrorKind> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseErrorKind::InvalidValue)?;

    let mut out = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        let c = match c {
            '\\' => match chars.next() {
                Some('"') => '"',
                Some('\\') => '\\',
                Some('n') => '\n',
                Some('t') => '\t',
                _ => return Err(ParseErrorKind::InvalidValue),
            },
            '"' => return Err(ParseErrorKind::InvalidValue),
            c => c,
        };
        out.push(c).map_err(|_| ParseErrorKind::TooLong)?;
    }
    Ok(out)
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseErrorKind> {
    value.parse().map_err(|_| ParseErrorKind::InvalidValue)
}
