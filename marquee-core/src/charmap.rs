//! Character substitution for the matrix font
//!
//! The matrix renders with an ASCII-only bitmap font, so accented and
//! typographic characters arriving from the feed are folded onto their
//! closest ASCII glyph before they reach a line. Mapping is strictly one
//! character to one character, and every target is ASCII, so normalizing
//! twice gives the same result as normalizing once.

use heapless::String;

/// Default substitution table, sorted by source character
static ACCENT_MAP: &[(char, char)] = &[
    ('\u{00A0}', ' '), ('\u{00AB}', '"'), ('\u{00B4}', '\''), ('\u{00BB}', '"'),
    ('À', 'A'), ('Á', 'A'),
    ('Â', 'A'), ('Ã', 'A'), ('Ä', 'A'), ('Å', 'A'), ('Ç', 'C'), ('È', 'E'),
    ('É', 'E'), ('Ê', 'E'), ('Ë', 'E'), ('Ì', 'I'), ('Í', 'I'), ('Î', 'I'),
    ('Ï', 'I'), ('Ð', 'D'), ('Ñ', 'N'), ('Ò', 'O'), ('Ó', 'O'), ('Ô', 'O'),
    ('Õ', 'O'), ('Ö', 'O'), ('×', 'x'), ('Ø', 'O'), ('Ù', 'U'), ('Ú', 'U'),
    ('Û', 'U'), ('Ü', 'U'), ('Ý', 'Y'), ('à', 'a'), ('á', 'a'), ('â', 'a'),
    ('ã', 'a'), ('ä', 'a'), ('å', 'a'), ('ç', 'c'), ('è', 'e'), ('é', 'e'),
    ('ê', 'e'), ('ë', 'e'), ('ì', 'i'), ('í', 'i'), ('î', 'i'), ('ï', 'i'),
    ('ð', 'd'), ('ñ', 'n'), ('ò', 'o'), ('ó', 'o'), ('ô', 'o'), ('õ', 'o'),
    ('ö', 'o'), ('ø', 'o'), ('ù', 'u'), ('ú', 'u'), ('û', 'u'), ('ü', 'u'),
    ('ý', 'y'), ('ÿ', 'y'), ('Ā', 'A'), ('ā', 'a'), ('Ă', 'A'), ('ă', 'a'),
    ('Ą', 'A'), ('ą', 'a'), ('Ć', 'C'), ('ć', 'c'), ('Ĉ', 'C'), ('ĉ', 'c'),
    ('Ċ', 'C'), ('ċ', 'c'), ('Č', 'C'), ('č', 'c'), ('Ď', 'D'), ('ď', 'd'),
    ('Đ', 'D'), ('đ', 'd'), ('Ē', 'E'), ('ē', 'e'), ('Ĕ', 'E'), ('ĕ', 'e'),
    ('Ė', 'E'), ('ė', 'e'), ('Ę', 'E'), ('ę', 'e'), ('Ě', 'E'), ('ě', 'e'),
    ('Ĝ', 'G'), ('ĝ', 'g'), ('Ğ', 'G'), ('ğ', 'g'), ('Ġ', 'G'), ('ġ', 'g'),
    ('Ģ', 'G'), ('ģ', 'g'), ('Ĥ', 'H'), ('ĥ', 'h'), ('Ħ', 'H'), ('ħ', 'h'),
    ('Ĩ', 'I'), ('ĩ', 'i'), ('Ī', 'I'), ('ī', 'i'), ('Ĭ', 'I'), ('ĭ', 'i'),
    ('Į', 'I'), ('į', 'i'), ('İ', 'I'), ('ı', 'i'), ('Ĳ', 'I'), ('ĳ', 'i'),
    ('Ĵ', 'J'), ('ĵ', 'j'), ('Ķ', 'K'), ('ķ', 'k'), ('Ĺ', 'L'), ('ĺ', 'l'),
    ('Ļ', 'L'), ('ļ', 'l'), ('Ľ', 'L'), ('ľ', 'l'), ('Ŀ', 'L'), ('ŀ', 'l'),
    ('Ł', 'L'), ('ł', 'l'), ('Ń', 'N'), ('ń', 'n'), ('Ņ', 'N'), ('ņ', 'n'),
    ('Ň', 'N'), ('ň', 'n'), ('Ō', 'O'), ('ō', 'o'), ('Ŏ', 'O'), ('ŏ', 'o'),
    ('Ő', 'O'), ('ő', 'o'), ('Ŕ', 'R'), ('ŕ', 'r'), ('Ŗ', 'R'), ('ŗ', 'r'),
    ('Ř', 'R'), ('ř', 'r'), ('Ś', 'S'), ('ś', 's'), ('Ŝ', 'S'), ('ŝ', 's'),
    ('Ş', 'S'), ('ş', 's'), ('Š', 'S'), ('š', 's'), ('Ţ', 'T'), ('ţ', 't'),
    ('Ť', 'T'), ('ť', 't'), ('Ũ', 'U'), ('ũ', 'u'), ('Ū', 'U'), ('ū', 'u'),
    ('Ŭ', 'U'), ('ŭ', 'u'), ('Ů', 'U'), ('ů', 'u'), ('Ű', 'U'), ('ű', 'u'),
    ('Ų', 'U'), ('ų', 'u'), ('Ŵ', 'W'), ('ŵ', 'w'), ('Ŷ', 'Y'), ('ŷ', 'y'),
    ('Ÿ', 'Y'), ('Ź', 'Z'), ('ź', 'z'), ('Ż', 'Z'), ('ż', 'z'), ('Ž', 'Z'),
    ('ž', 'z'), ('ſ', 's'),
    ('\u{2010}', '-'), ('\u{2011}', '-'), ('\u{2012}', '-'), ('\u{2013}', '-'),
    ('\u{2014}', '-'), ('\u{2018}', '\''), ('\u{2019}', '\''), ('\u{201A}', ','),
    ('\u{201C}', '"'), ('\u{201D}', '"'),
    ('\u{201E}', '"'), ('\u{2022}', '*'), ('\u{2032}', '\''), ('\u{2033}', '"'),
];

/// Immutable character substitution table
#[derive(Debug, Clone, Copy)]
pub struct CharMap {
    entries: &'static [(char, char)],
}

impl Default for CharMap {
    fn default() -> Self {
        Self::standard()
    }
}

impl CharMap {
    /// The built-in accent folding table
    pub const fn standard() -> Self {
        Self {
            entries: ACCENT_MAP,
        }
    }

    /// Build a map from a custom table
    ///
    /// `entries` must be sorted by source character.
    pub const fn from_sorted(entries: &'static [(char, char)]) -> Self {
        Self { entries }
    }

    /// Replacement for `c`, if it has one
    pub fn get(&self, c: char) -> Option<char> {
        self.entries
            .binary_search_by_key(&c, |&(from, _)| from)
            .ok()
            .map(|i| self.entries[i].1)
    }

    /// `c` after substitution (identity when unmapped)
    pub fn map_char(&self, c: char) -> char {
        self.get(c).unwrap_or(c)
    }

    /// All (source, replacement) pairs
    pub fn entries(&self) -> &'static [(char, char)] {
        self.entries
    }

    /// Normalize `input` into `out`, replacing its contents
    ///
    /// Stops at the last character that fits; returns `true` if the input
    /// had to be truncated.
    pub fn normalize_into<const N: usize>(&self, input: &str, out: &mut String<N>) -> bool {
        out.clear();
        for c in input.chars() {
            if out.push(self.map_char(c)).is_err() {
                return true;
            }
        }
        false
    }

    /// Normalize `input` into a new string, truncating at capacity
    pub fn normalize<const N: usize>(&self, input: &str) -> String<N> {
        let mut out = String::new();
        self.normalize_into(input, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MAP: CharMap = CharMap::standard();

    #[test]
    fn test_table_sorted_and_unique() {
        for pair in ACCENT_MAP.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{:?} !< {:?}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn test_targets_are_ascii_and_not_keys() {
        for &(from, to) in ACCENT_MAP {
            assert!(to.is_ascii(), "{:?} maps to non-ASCII {:?}", from, to);
            assert!(MAP.get(to).is_none());
        }
    }

    #[test]
    fn test_cafe() {
        let out: String<16> = MAP.normalize("Café");
        assert_eq!(out.as_str(), "Cafe");
    }

    #[test]
    fn test_mixed_text() {
        let out: String<64> = MAP.normalize("Zürich – “Kraków” Ångström");
        assert_eq!(out.as_str(), "Zurich - \"Krakow\" Angstrom");
    }

    #[test]
    fn test_unmapped_passthrough() {
        let out: String<16> = MAP.normalize("日本 ok");
        assert_eq!(out.as_str(), "日本 ok");
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        let mut out: String<4> = String::new();
        // "ab" + a 3-byte char does not fit in 4 bytes after "ab"
        assert!(MAP.normalize_into("ab日c", &mut out));
        assert_eq!(out.as_str(), "ab");

        assert!(!MAP.normalize_into("abcd", &mut out));
        assert_eq!(out.as_str(), "abcd");
    }

    #[test]
    fn test_custom_map() {
        static ONLY_E: &[(char, char)] = &[('é', 'e')];
        let map = CharMap::from_sorted(ONLY_E);
        let out: String<16> = map.normalize("Café à");
        assert_eq!(out.as_str(), "Cafe à");
    }

    fn mapped_char() -> impl Strategy<Value = char> {
        proptest::sample::select(ACCENT_MAP).prop_map(|(from, _)| from)
    }

    fn unmapped_char() -> impl Strategy<Value = char> {
        any::<char>().prop_filter("mapped", |c| MAP.get(*c).is_none())
    }

    proptest! {
        #[test]
        fn prop_mapped_chars_replaced(
            prefix in "[a-z ]{0,8}",
            c in mapped_char(),
            suffix in "[a-z ]{0,8}",
        ) {
            let mut input = std::string::String::new();
            input.push_str(&prefix);
            input.push(c);
            input.push_str(&suffix);
            input.push(c);

            let out: String<128> = MAP.normalize(&input);
            let expected: std::string::String = input.chars().map(|ch| MAP.map_char(ch)).collect();
            prop_assert_eq!(out.as_str(), expected.as_str());
            prop_assert!(!out.contains(c));
            prop_assert_eq!(out.chars().count(), input.chars().count());
        }

        #[test]
        fn prop_unmapped_identity(c in unmapped_char()) {
            prop_assert_eq!(MAP.map_char(c), c);
        }

        #[test]
        fn prop_idempotent(input in "\\PC{0,40}") {
            let once: String<256> = MAP.normalize(&input);
            let twice: String<256> = MAP.normalize(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
