//! Profile sequence descriptions.

use super::mlu::Mlu;
use super::Technology;

/// Describes one profile in the chain a device link was built from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileSequenceItem {
    /// Device manufacturer signature.
    pub device_mfg: u32,
    /// Device model signature.
    pub device_model: u32,
    pub attributes: u64,
    pub technology: Option<Technology>,
    pub manufacturer: Mlu,
    pub model: Mlu,
}

impl ProfileSequenceItem {
    /// Creates an entry with the given descriptions and no signatures.
    pub fn new(manufacturer: &str, model: &str) -> Self {
        ProfileSequenceItem {
            manufacturer: Mlu::from_text(manufacturer),
            model: Mlu::from_text(model),
            ..Default::default()
        }
    }
}
