//! Named color lists.
//!
//! Also used to carry the colorant tables of device links.

use crate::pipeline::MAX_STAGE_CHANNELS;

/// A single named color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedColor {
    pub name: String,
    /// PCS value in the 16-bit Lab encoding.
    pub pcs: [u16; 3],
    /// One entry per colorant of the owning list.
    pub device_colorant: Vec<u16>,
}

/// An ordered list of named colors sharing a prefix, suffix and colorant count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamedColorList {
    pub prefix: String,
    pub suffix: String,
    colorant_count: usize,
    colors: Vec<NamedColor>,
}

impl NamedColorList {
    /// Creates an empty list.
    ///
    /// The colorant count is capped at [`MAX_STAGE_CHANNELS`].
    pub fn new(colorant_count: usize, prefix: &str, suffix: &str) -> Self {
        NamedColorList {
            prefix: prefix.into(),
            suffix: suffix.into(),
            colorant_count: colorant_count.min(MAX_STAGE_CHANNELS),
            colors: Vec::new(),
        }
    }

    pub fn colorant_count(&self) -> usize {
        self.colorant_count
    }

    /// Changes the colorant count, zero-padding or truncating every color.
    pub fn set_colorant_count(&mut self, count: usize) {
        let count = count.min(MAX_STAGE_CHANNELS);
        self.colorant_count = count;
        for color in &mut self.colors {
            color.device_colorant.resize(count, 0);
        }
    }

    /// Appends a color.
    ///
    /// Missing colorants are filled with zero and extra ones are dropped.
    pub fn push(&mut self, name: &str, pcs: [u16; 3], colorant: &[u16]) {
        let mut device_colorant = vec![0; self.colorant_count];
        for (out, value) in device_colorant.iter_mut().zip(colorant) {
            *out = *value;
        }

        self.colors.push(NamedColor {
            name: name.into(),
            pcs,
            device_colorant,
        });
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NamedColor> {
        self.colors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedColor> {
        self.colors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut NamedColor> {
        self.colors.iter_mut()
    }
}

#[test]
fn colorants_are_padded() {
    let mut list = NamedColorList::new(3, "PANTONE ", " C");
    list.push("Orange 021", [40000, 50000, 52000], &[0, 30000]);
    list.push("Reflex Blue", [10000, 34000, 14000], &[65535, 50000, 0, 12]);

    assert_eq!(list.len(), 2);
    assert_eq!(list.get(0).unwrap().device_colorant, vec![0, 30000, 0]);
    assert_eq!(list.get(1).unwrap().device_colorant, vec![65535, 50000, 0]);

    list.set_colorant_count(4);
    assert_eq!(list.get(1).unwrap().device_colorant, vec![65535, 50000, 0, 0]);
}
