//! Color profiles.

use crate::color::{CxyY, Cxyz, D50};
use crate::fixed::s15f16;
use crate::named::NamedColorList;
use crate::pipeline::Pipeline;
use crate::tone_curve::ToneCurve;
use cgmath::Matrix3;
use mlu::Mlu;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;
pub use sequence::ProfileSequenceItem;
pub use types::*;

mod constructors;
pub mod mlu;
mod sequence;
mod types;

/// Data stored in an ICC tag.
#[derive(Debug, Clone, PartialEq)]
pub enum IccTagData {
    /// This tag points to another tag.
    Linked(u32),
    /// This tag contains a value.
    Value(IccValue),
}

type RawTag = u32;

/// Data values found in ICC profiles.
#[derive(Debug, Clone, PartialEq)]
pub enum IccValue {
    /// XYZType
    Cxyz(Cxyz),
    /// chromaticityType
    Chromaticity(CxyY, CxyY, CxyY),
    /// s15Fixed16ArrayType
    S15Fixed16Array(Vec<s15f16>),
    /// multiLocalizedUnicodeType
    Mlu(Mlu),
    /// curveType or parametricCurveType
    Curve(ToneCurve),
    /// Any of the LUT types
    Pipeline(Pipeline),
    /// namedColor2Type
    NamedColorList(NamedColorList),
    /// colorantTableType
    ColorantTable(NamedColorList),
    /// profileSequenceDescType
    ProfileSequence(Vec<ProfileSequenceItem>),
}

impl IccValue {
    pub fn as_pipeline(&self) -> Option<&Pipeline> {
        match self {
            IccValue::Pipeline(pipeline) => Some(pipeline),
            _ => None,
        }
    }
}

/// An ICC color profile.
#[derive(Clone, PartialEq)]
pub struct IccProfile {
    pub created: time::OffsetDateTime,
    /// BCD-encoded version as stored in the header.
    pub version: u32,
    pub device_class: ProfileClass,
    pub color_space: ColorSpace,
    pub pcs: ColorSpace,
    pub rendering_intent: Intent,
    pub tags: HashMap<RawTag, IccTagData>,
}

impl IccProfile {
    /// Creates a new empty profile.
    pub fn new(device_class: ProfileClass, color_space: ColorSpace) -> Self {
        IccProfile {
            created: time::OffsetDateTime::now_utc(),
            version: 0x02100000, // default version
            device_class,
            color_space,
            pcs: ColorSpace::XYZ,
            rendering_intent: Intent::Perceptual,
            tags: HashMap::new(),
        }
    }

    /// Returns the major and minor version.
    pub fn version(&self) -> (u32, u32) {
        fn bcd_digits(n: u32) -> u32 {
            format!("{:x}", n).parse().unwrap_or(0)
        }

        let major = bcd_digits(self.version >> 24);
        let minor = bcd_digits((self.version >> 20) & 0xF);

        (major, minor)
    }

    /// Sets the major and minor version.
    ///
    /// The header has two BCD digits for the major version and one for the minor version, so
    /// larger values are clamped to 99 and 9.
    pub fn set_version(&mut self, major: u32, minor: u32) {
        fn to_bcd(n: u32) -> u32 {
            u32::from_str_radix(&format!("{}", n), 16).unwrap_or(0)
        }

        if major > 99 || minor > 9 {
            warn!(major, minor, "profile version clamped to the header range");
        }
        let major = major.min(99);
        let minor = minor.min(9);

        self.version = ((to_bcd(major) & 0xFF) << 24) | ((to_bcd(minor) & 0xF) << 20);
    }

    fn get_tag_recursively(&self, key: RawTag, depth: usize) -> Option<&IccValue> {
        if depth > 30 {
            return None;
        }

        self.tags.get(&key).and_then(|data| match data {
            IccTagData::Linked(key) => self.get_tag_recursively(*key, depth + 1),
            IccTagData::Value(value) => Some(value),
        })
    }

    /// Returns the value of the given tag if it’s available. Follows linked tags.
    pub fn get_tag(&self, key: IccTag) -> Option<&IccValue> {
        self.get_tag_recursively(key.into(), 0)
    }

    /// Returns the raw tag entry without following links.
    pub fn tag_data(&self, key: IccTag) -> Option<&IccTagData> {
        self.tags.get(&key.into())
    }

    pub fn contains_tag(&self, key: IccTag) -> bool {
        self.tags.contains_key(&key.into())
    }

    /// Inserts a tag.
    pub fn insert_tag(&mut self, key: IccTag, value: IccValue) {
        self.tags.insert(key.into(), IccTagData::Value(value));
    }

    /// Inserts a linked tag.
    pub fn link_tag(&mut self, key: IccTag, link_to: IccTag) {
        self.tags.insert(key.into(), IccTagData::Linked(link_to.into()));
    }

    /// Returns the profile description, if any.
    pub fn description(&self) -> Option<&str> {
        match self.get_tag(IccTag::ProfileDescription) {
            Some(IccValue::Mlu(mlu)) => mlu.text(),
            _ => None,
        }
    }

    /// Returns the media white point, or D50 if there is none.
    pub fn media_white_point(&self) -> Cxyz {
        match self.get_tag(IccTag::MediaWhitePoint) {
            Some(IccValue::Cxyz(wp)) => *wp,
            _ => D50,
        }
    }

    /// Returns the chromatic adaptation matrix if the profile has one.
    pub fn adaptation_matrix(&self) -> Option<Matrix3<f64>> {
        match self.get_tag(IccTag::ChromaticAdaptation) {
            Some(IccValue::S15Fixed16Array(values)) if values.len() == 9 => Some(Matrix3::from([
                [values[0].into(), values[1].into(), values[2].into()],
                [values[3].into(), values[4].into(), values[5].into()],
                [values[6].into(), values[7].into(), values[8].into()],
            ])),
            _ => None,
        }
    }
}

impl fmt::Debug for IccProfile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (major, minor) = self.version();
        write!(
            f,
            "Profile {{ created: {}, {:?}, version {}.{}, class: {:?}, pcs {:?}, {:?} intent",
            self.created,
            self.color_space,
            major,
            minor,
            self.device_class,
            self.pcs,
            self.rendering_intent
        )?;
        for (k, v) in &self.tags {
            write!(f, ", {:?}: ", DebugFmtTag(*k))?;
            match v {
                IccTagData::Value(val) => write!(f, "{:?}", val)?,
                IccTagData::Linked(tag) => write!(f, "(-> {:?})", DebugFmtTag(*tag))?,
            }
        }
        write!(f, " }}")
    }
}

struct DebugFmtTag(u32);
impl fmt::Debug for DebugFmtTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.0.to_be_bytes();
        if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            write!(f, "{}", String::from_utf8_lossy(&bytes))
        } else {
            write!(
                f,
                "({:02x} {:02x} {:02x} {:02x})",
                bytes[0], bytes[1], bytes[2], bytes[3]
            )
        }
    }
}

#[test]
fn version_is_bcd() {
    let mut profile = IccProfile::new(ProfileClass::Link, ColorSpace::RGB);
    assert_eq!(profile.version(), (2, 1));

    profile.set_version(4, 3);
    assert_eq!(profile.version, 0x04300000);
    assert_eq!(profile.version(), (4, 3));

    profile.set_version(4, 10);
    assert_eq!(profile.version(), (4, 9));
    profile.set_version(120, 2);
    assert_eq!(profile.version(), (99, 2));
}

#[test]
fn linked_tags_resolve() {
    let mut profile = IccProfile::new(ProfileClass::Display, ColorSpace::RGB);
    profile.insert_tag(IccTag::RedTRC, IccValue::Curve(ToneCurve::new_gamma(2.2)));
    profile.link_tag(IccTag::GreenTRC, IccTag::RedTRC);

    assert_eq!(
        profile.tag_data(IccTag::GreenTRC),
        Some(&IccTagData::Linked(IccTag::RedTRC.into()))
    );
    assert_eq!(
        profile.get_tag(IccTag::GreenTRC),
        Some(&IccValue::Curve(ToneCurve::new_gamma(2.2)))
    );
    assert!(profile.get_tag(IccTag::BlueTRC).is_none());

    // cycles end instead of recursing forever
    profile.link_tag(IccTag::BlueTRC, IccTag::BlueTRC);
    assert!(profile.get_tag(IccTag::BlueTRC).is_none());
}
