//! Topic grammar
//!
//! Only the last two topic levels are significant:
//!
//! ```text
//! <prefix>/text/<index>    set the text of line <index>
//! <prefix>/color/<index>   set the color of line <index>
//! ```
//!
//! `<index>` is a base-10 non-negative integer. Any other kind is left for
//! future use and is reported as [`Route::Unrecognized`], not as an error.

/// Topic level separator
pub const TOPIC_SEPARATOR: char = '/';

const KIND_TEXT: &str = "text";
const KIND_COLOR: &str = "color";

/// Which field of a line an update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateKind {
    Text,
    Color,
}

/// A resolved update destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TopicTarget {
    pub kind: UpdateKind,
    pub line: usize,
}

/// Result of matching a topic against the grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route {
    Update(TopicTarget),
    Unrecognized,
}

/// Topic grammar violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TopicError {
    /// Fewer than two levels, or the index level is not a decimal number
    Malformed,
    /// Index is a number but not below the line count
    IndexOutOfRange,
}

/// Resolve `topic` against a display with `line_count` lines
pub fn parse(topic: &str, line_count: usize) -> Result<Route, TopicError> {
    let mut levels = topic.rsplitn(3, TOPIC_SEPARATOR);
    let index = levels.next().unwrap_or("");
    let kind = match levels.next() {
        Some(kind) => kind,
        None => return Err(TopicError::Malformed),
    };

    let kind = match kind {
        KIND_TEXT => UpdateKind::Text,
        KIND_COLOR => UpdateKind::Color,
        _ => return Ok(Route::Unrecognized),
    };

    let line = parse_index(index, line_count)?;
    Ok(Route::Update(TopicTarget { kind, line }))
}

fn parse_index(index: &str, line_count: usize) -> Result<usize, TopicError> {
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TopicError::Malformed);
    }
    // All digits, so a parse failure can only be overflow
    match index.parse::<usize>() {
        Ok(line) if line < line_count => Ok(line),
        _ => Err(TopicError::IndexOutOfRange),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(kind: UpdateKind, line: usize) -> Result<Route, TopicError> {
        Ok(Route::Update(TopicTarget { kind, line }))
    }

    #[test]
    fn test_text_and_color_topics() {
        assert_eq!(parse("home/display/text/2", 5), update(UpdateKind::Text, 2));
        assert_eq!(parse("home/display/color/0", 5), update(UpdateKind::Color, 0));
        assert_eq!(parse("text/4", 5), update(UpdateKind::Text, 4));
    }

    #[test]
    fn test_leading_zeros_allowed() {
        assert_eq!(parse("a/text/003", 5), update(UpdateKind::Text, 3));
    }

    #[test]
    fn test_index_out_of_range() {
        assert_eq!(parse("home/display/text/5", 5), Err(TopicError::IndexOutOfRange));
        assert_eq!(
            parse("home/display/color/99999999999999999999999", 5),
            Err(TopicError::IndexOutOfRange)
        );
    }

    #[test]
    fn test_malformed_index() {
        assert_eq!(parse("home/display/text/x", 5), Err(TopicError::Malformed));
        assert_eq!(parse("home/display/text/-1", 5), Err(TopicError::Malformed));
        assert_eq!(parse("home/display/text/+1", 5), Err(TopicError::Malformed));
        assert_eq!(parse("home/display/color/", 5), Err(TopicError::Malformed));
    }

    #[test]
    fn test_single_level_is_malformed() {
        assert_eq!(parse("text", 5), Err(TopicError::Malformed));
        assert_eq!(parse("", 5), Err(TopicError::Malformed));
    }

    #[test]
    fn test_unrecognized_kinds() {
        assert_eq!(parse("home/display/line_0", 5), Ok(Route::Unrecognized));
        assert_eq!(parse("home/display/brightness/1", 5), Ok(Route::Unrecognized));
        // Kind matching is case-sensitive
        assert_eq!(parse("home/display/TEXT/1", 5), Ok(Route::Unrecognized));
    }
}
