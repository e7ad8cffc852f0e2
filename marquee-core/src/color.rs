//! Named line colors
//!
//! Color updates carry a symbolic name that must match a table entry
//! exactly (case-sensitive). Values are packed 0xRRGGBB.

/// Packed 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb(u32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x000000);

    /// Build from a packed 0xRRGGBB value; the top byte is discarded
    pub const fn from_packed(value: u32) -> Self {
        Self(value & 0x00FF_FFFF)
    }

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn packed(self) -> u32 {
        self.0
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }
}

/// Built-in palette, tuned for a low bit-depth LED matrix
static PALETTE: &[(&str, Rgb)] = &[
    ("RED", Rgb::from_packed(0xff0000)),
    ("RED1", Rgb::from_packed(0xaa0000)),
    ("RED2", Rgb::from_packed(0x880000)),
    ("RED3", Rgb::from_packed(0x440000)),
    ("ORANGE", Rgb::from_packed(0xffaa00)),
    ("ORANGE1", Rgb::from_packed(0xaa4400)),
    ("ORANGE2", Rgb::from_packed(0x884400)),
    ("ORANGE3", Rgb::from_packed(0x444400)),
    ("YELLOW", Rgb::from_packed(0xffff00)),
    ("GREEN", Rgb::from_packed(0x00ff00)),
    ("GREEN1", Rgb::from_packed(0x00aa00)),
    ("GREEN2", Rgb::from_packed(0x008800)),
    ("GREEN3", Rgb::from_packed(0x004400)),
    ("BLUE", Rgb::from_packed(0x0000ff)),
    ("BLUE1", Rgb::from_packed(0x0000aa)),
    ("BLUE2", Rgb::from_packed(0x000088)),
    ("BLUE3", Rgb::from_packed(0x000044)),
    ("PURPLE", Rgb::from_packed(0xff00ff)),
    ("PURPLE1", Rgb::from_packed(0xaa00aa)),
    ("PURPLE2", Rgb::from_packed(0x880088)),
    ("PURPLE3", Rgb::from_packed(0x440044)),
    ("WHITE", Rgb::from_packed(0xffffff)),
];

/// Immutable name → color table
#[derive(Debug, Clone, Copy)]
pub struct ColorTable {
    entries: &'static [(&'static str, Rgb)],
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ColorTable {
    pub const fn standard() -> Self {
        Self { entries: PALETTE }
    }

    pub const fn from_entries(entries: &'static [(&'static str, Rgb)]) -> Self {
        Self { entries }
    }

    /// Look up a color by exact name
    pub fn get(&self, name: &str) -> Option<Rgb> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, rgb)| rgb)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn entries(&self) -> &'static [(&'static str, Rgb)] {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let table = ColorTable::standard();
        assert_eq!(table.get("ORANGE1"), Some(Rgb::from_packed(0xaa4400)));
        assert_eq!(table.get("RED1").map(Rgb::packed), Some(0xaa0000));
        assert_eq!(table.get("WHITE"), Some(Rgb::new(0xff, 0xff, 0xff)));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let table = ColorTable::standard();
        assert!(table.get("red1").is_none());
        assert!(table.get("Red1").is_none());
        assert!(table.get(" RED1").is_none());
        assert!(!table.contains("MAGENTA"));
    }

    #[test]
    fn test_channels() {
        let c = Rgb::from_packed(0xaa4400);
        assert_eq!((c.r(), c.g(), c.b()), (0xaa, 0x44, 0x00));
        assert_eq!(Rgb::from_packed(0xff12_3456).packed(), 0x123456);
    }

    #[test]
    fn test_names_unique() {
        let entries = ColorTable::standard().entries();
        for (i, (a, _)) in entries.iter().enumerate() {
            assert!(entries[i + 1..].iter().all(|(b, _)| a != b), "duplicate {}", a);
        }
    }
}
