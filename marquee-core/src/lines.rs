//! Display line state
//!
//! The display shows a fixed set of lines, each with its own text and
//! color. Lines are created once at boot and mutated in place; a line's
//! index is its position in the model and never changes.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::String;

use crate::color::Rgb;

/// Number of lines on the display
pub const LINE_COUNT: usize = 5;

/// Maximum text length per line in bytes
pub const MAX_TEXT_LEN: usize = 64;

/// Text buffer for one line
pub type LineText = String<MAX_TEXT_LEN>;

/// Text shown on line 0 until the first update arrives
pub const DEFAULT_BANNER: &str = "Marquee";

const RED1: Rgb = Rgb::from_packed(0xaa0000);
const ORANGE1: Rgb = Rgb::from_packed(0xaa4400);

/// Boot colors per line
pub const DEFAULT_COLORS: [Rgb; LINE_COUNT] = [RED1, ORANGE1, ORANGE1, ORANGE1, RED1];

/// One renderable line
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineSlot {
    text: LineText,
    color: Rgb,
}

impl LineSlot {
    /// Create a line; text beyond [`MAX_TEXT_LEN`] is dropped at a char boundary
    pub fn new(text: &str, color: Rgb) -> Self {
        let mut slot = Self {
            text: String::new(),
            color,
        };
        for c in text.chars() {
            if slot.text.push(c).is_err() {
                break;
            }
        }
        slot
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Replace the whole text
    pub fn set_text(&mut self, text: LineText) {
        self.text = text;
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }
}

/// Boot state: banner on line 0, other lines empty
pub fn default_slots() -> [LineSlot; LINE_COUNT] {
    core::array::from_fn(|i| {
        let text = if i == 0 { DEFAULT_BANNER } else { "" };
        LineSlot::new(text, DEFAULT_COLORS[i])
    })
}

/// All display lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineModel {
    slots: [LineSlot; LINE_COUNT],
}

impl Default for LineModel {
    fn default() -> Self {
        Self::new(default_slots())
    }
}

impl LineModel {
    pub const fn new(slots: [LineSlot; LINE_COUNT]) -> Self {
        Self { slots }
    }

    pub fn slot(&self, index: usize) -> Option<&LineSlot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut LineSlot> {
        self.slots.get_mut(index)
    }

    /// Replace the text of line `index`; false if there is no such line
    pub fn set_text(&mut self, index: usize, text: LineText) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.set_text(text);
                true
            }
            None => false,
        }
    }

    /// Replace the color of line `index`; false if there is no such line
    pub fn set_color(&mut self, index: usize, color: Rgb) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.set_color(color);
                true
            }
            None => false,
        }
    }

    /// Shallow copy of every line, for rendering
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            slots: self.slots.clone(),
        }
    }
}

/// Read-only copy of the lines taken at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    slots: [LineSlot; LINE_COUNT],
}

impl Snapshot {
    pub fn get(&self, index: usize) -> Option<&LineSlot> {
        self.slots.get(index)
    }

    /// Lines with their indices, top to bottom
    pub fn iter(&self) -> impl Iterator<Item = (usize, &LineSlot)> {
        self.slots.iter().enumerate()
    }

    pub const fn len(&self) -> usize {
        LINE_COUNT
    }

    pub const fn is_empty(&self) -> bool {
        LINE_COUNT == 0
    }
}

/// Shared owner of the [`LineModel`]
///
/// The router writes and the render task reads through short synchronous
/// closures. A closure cannot await, so no task ever observes a line
/// half-written. Closures must not call back into the same store.
pub struct LineStore<M: RawMutex> {
    inner: Mutex<M, RefCell<LineModel>>,
}

impl<M: RawMutex> LineStore<M> {
    pub const fn new(model: LineModel) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(model)),
        }
    }

    /// Mutate the model
    pub fn update<R>(&self, f: impl FnOnce(&mut LineModel) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Inspect the model
    pub fn read<R>(&self, f: impl FnOnce(&LineModel) -> R) -> R {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    pub fn snapshot(&self) -> Snapshot {
        self.read(LineModel::snapshot)
    }
}
