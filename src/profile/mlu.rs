//! Multilocalized unicode objects.

use std::collections::HashMap;
use std::fmt;

/// Packs a two-letter ISO code; missing letters become zero.
fn str_to_16(s: &str) -> u16 {
    let bytes = s.as_bytes();
    let hi = bytes.first().copied().unwrap_or(0) as u16;
    let lo = bytes.get(1).copied().unwrap_or(0) as u16;
    (hi << 8) | lo
}

fn str_from_16(n: u16) -> String {
    String::from_utf8_lossy(&[(n >> 8) as u8, n as u8]).into()
}

type Lang = u16;
type Country = u16;

/// A multilocalized unicode object.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Mlu {
    entries: HashMap<(Lang, Country), String>,
}

impl Mlu {
    /// Creates a new MLU.
    pub fn new() -> Mlu {
        Mlu {
            entries: HashMap::new(),
        }
    }

    /// Creates an MLU with a single entry that has no language or country.
    pub fn from_text(text: &str) -> Mlu {
        let mut mlu = Mlu::new();
        mlu.insert_raw(0, 0, text.into());
        mlu
    }

    /// Inserts an entry.
    pub fn insert(&mut self, lang: &str, country: &str, string: String) {
        self.insert_raw(str_to_16(lang), str_to_16(country), string);
    }

    /// Inserts a raw entry.
    pub fn insert_raw(&mut self, lang: u16, country: u16, string: String) {
        self.entries.insert((lang, country), string);
    }

    /// Returns an entry.
    pub fn get(&self, lang: &str, country: &str) -> Option<&str> {
        self.get_raw(str_to_16(lang), str_to_16(country))
    }

    /// Returns an entry.
    pub fn get_raw(&self, lang: u16, country: u16) -> Option<&str> {
        self.entries.get(&(lang, country)).map(|x| &**x)
    }

    /// Returns the text that best fits when no locale is requested.
    ///
    /// Prefers en-US, then the entry without a locale, then any entry.
    pub fn text(&self) -> Option<&str> {
        self.get("en", "US")
            .or_else(|| self.get_raw(0, 0))
            .or_else(|| self.entries.values().next().map(|x| &**x))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Mlu {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Mlu {{")?;
        for (k, v) in &self.entries {
            write!(f, " ({}-{}): {:?}", str_from_16(k.0), str_from_16(k.1), v)?;
        }
        write!(f, " }}")
    }
}

#[test]
fn locale_lookup() {
    let mut mlu = Mlu::from_text("fallback");
    assert_eq!(mlu.text(), Some("fallback"));

    mlu.insert("en", "US", "color".into());
    mlu.insert("de", "DE", "Farbe".into());
    assert_eq!(mlu.text(), Some("color"));
    assert_eq!(mlu.get("de", "DE"), Some("Farbe"));
    assert_eq!(mlu.get("x", ""), None);
    assert_eq!(mlu.len(), 3);
}
