use crate::adjust::{Bchsw, InkLimiter};
use crate::color::build_rgb_to_xyz_transfer_matrix;
use crate::color::{CxyY, Cxyz, D50};
use crate::error::{ProfileError, Result};
use crate::fixed::s15f16;
use crate::grid::Grid;
use crate::pipeline::{Pipeline, PipelineStage};
use crate::profile::mlu::Mlu;
use crate::profile::{
    ColorSpace, IccProfile, IccTag, IccValue, Intent, ProfileClass, ProfileSequenceItem,
};
use crate::tone_curve::ToneCurve;
use std::convert::TryFrom;

/// Manufacturer text of the profile sequence entries written by built-in device links.
const SEQUENCE_MANUFACTURER: &str = "iccsynth";

/// Rec. 709 primaries.
const REC709_PRIMARIES: (CxyY, CxyY, CxyY) = (
    CxyY {
        x: 0.6400,
        y: 0.3300,
        Y: 1.0,
    },
    CxyY {
        x: 0.3000,
        y: 0.6000,
        Y: 1.0,
    },
    CxyY {
        x: 0.1500,
        y: 0.0600,
        Y: 1.0,
    },
);

impl IccProfile {
    /// Writes the description and copyright tags.
    pub(crate) fn set_description(&mut self, description: &str) {
        let mut desc_mlu = Mlu::new();
        let mut copyright = Mlu::new();

        desc_mlu.insert("en", "US", description.into());
        copyright.insert("en", "US", "No copyright, use freely".into());

        self.insert_tag(IccTag::ProfileDescription, IccValue::Mlu(desc_mlu));
        self.insert_tag(IccTag::Copyright, IccValue::Mlu(copyright));
    }

    /// Writes a profile sequence with a single entry describing this profile.
    fn set_sequence_description(&mut self, model: &str) {
        let item = ProfileSequenceItem::new(SEQUENCE_MANUFACTURER, model);
        self.insert_tag(IccTag::ProfileSequenceDesc, IccValue::ProfileSequence(vec![item]));
    }

    /// Creates a matrix-shaper RGB display profile.
    ///
    /// - With a white point, the media white point is D50 and a chromatic adaptation tag maps the
    ///   white point to D50.
    /// - With a white point and primaries, colorant tags are written.
    /// - With primaries, a chromaticity tag is written.
    /// - With transfer functions, TRC tags are written. Passing the same curve (by reference) for
    ///   several channels links their tags to the red one instead of storing the curve again.
    ///
    /// # Examples
    /// ```
    /// # use iccsynth::{IccProfile, ToneCurve};
    /// # use iccsynth::profile::{IccTag, IccTagData};
    /// let gamma = ToneCurve::new_gamma(2.2);
    /// let profile = IccProfile::new_rgb(None, None, Some([&gamma, &gamma, &gamma])).unwrap();
    ///
    /// assert_eq!(
    ///     profile.tag_data(IccTag::BlueTRC),
    ///     Some(&IccTagData::Linked(IccTag::RedTRC.into())),
    /// );
    /// ```
    pub fn new_rgb(
        white_point: Option<CxyY>,
        primaries: Option<(CxyY, CxyY, CxyY)>,
        transfer: Option<[&ToneCurve; 3]>,
    ) -> Result<Self> {
        let mut profile = IccProfile::new(ProfileClass::Display, ColorSpace::RGB);
        profile.set_version(4, 3);
        profile.pcs = ColorSpace::XYZ;
        profile.rendering_intent = Intent::Perceptual;
        profile.set_description("RGB built-in");

        if let Some(white_point) = white_point {
            profile.insert_tag(IccTag::MediaWhitePoint, IccValue::Cxyz(D50));

            let chad = Cxyz::from(white_point)
                .adaptation_matrix(D50, None)
                .ok_or(ProfileError::SingularMatrix)?;

            let mut chad_vec = Vec::with_capacity(9);
            for i in 0..3 {
                for j in 0..3 {
                    chad_vec.push(s15f16::try_from(chad[i][j])?);
                }
            }

            // this is a v4 tag but many CMS understand and read it regardless
            profile.insert_tag(
                IccTag::ChromaticAdaptation,
                IccValue::S15Fixed16Array(chad_vec),
            );

            if let Some(primaries) = primaries {
                let max_white = CxyY {
                    x: white_point.x,
                    y: white_point.y,
                    Y: 1.,
                };

                let m_colorants = build_rgb_to_xyz_transfer_matrix(max_white, primaries)
                    .ok_or(ProfileError::SingularMatrix)?;

                let colorant = |i: usize| Cxyz {
                    x: m_colorants[0][i],
                    y: m_colorants[1][i],
                    z: m_colorants[2][i],
                };
                profile.insert_tag(IccTag::RedColorant, IccValue::Cxyz(colorant(0)));
                profile.insert_tag(IccTag::GreenColorant, IccValue::Cxyz(colorant(1)));
                profile.insert_tag(IccTag::BlueColorant, IccValue::Cxyz(colorant(2)));
            }
        }

        if let Some([red, green, blue]) = transfer {
            profile.insert_tag(IccTag::RedTRC, IccValue::Curve(red.clone()));

            if std::ptr::eq(green, red) {
                profile.link_tag(IccTag::GreenTRC, IccTag::RedTRC);
            } else {
                profile.insert_tag(IccTag::GreenTRC, IccValue::Curve(green.clone()));
            }

            if std::ptr::eq(blue, red) {
                profile.link_tag(IccTag::BlueTRC, IccTag::RedTRC);
            } else {
                profile.insert_tag(IccTag::BlueTRC, IccValue::Curve(blue.clone()));
            }
        }

        if let Some(primaries) = primaries {
            profile.insert_tag(
                IccTag::Chromaticity,
                IccValue::Chromaticity(primaries.0, primaries.1, primaries.2),
            );
        }

        Ok(profile)
    }

    /// Creates a gray display profile.
    pub fn new_gray(white_point: Option<CxyY>, transfer: Option<&ToneCurve>) -> Self {
        let mut profile = IccProfile::new(ProfileClass::Display, ColorSpace::Gray);
        profile.set_version(4, 3);
        profile.pcs = ColorSpace::XYZ;
        profile.rendering_intent = Intent::Perceptual;
        profile.set_description("gray built-in");

        if let Some(white_point) = white_point {
            profile.insert_tag(IccTag::MediaWhitePoint, IccValue::Cxyz(white_point.into()));
        }

        if let Some(curve) = transfer {
            profile.insert_tag(IccTag::GrayTRC, IccValue::Curve(curve.clone()));
        }

        profile
    }

    /// Creates a device link that applies one tone curve per channel.
    ///
    /// There must be exactly one curve per channel of the color space.
    pub fn new_linearization_link(color_space: ColorSpace, curves: &[ToneCurve]) -> Result<Self> {
        let channels = color_space.channels();
        if curves.len() != channels {
            return Err(ProfileError::CurveCount {
                expected: channels,
                found: curves.len(),
            });
        }

        let mut profile = IccProfile::new(ProfileClass::Link, color_space);
        profile.set_version(4, 3);
        profile.pcs = color_space;
        profile.rendering_intent = Intent::Perceptual;

        let mut lut = Pipeline::with_channels(channels, channels);
        lut.prepend_stage(PipelineStage::new_curve_set(curves.to_vec()))?;

        profile.set_description("Linearization built-in");
        profile.insert_tag(IccTag::AToB0, IccValue::Pipeline(lut));
        profile.set_sequence_description("Linearization built-in");

        Ok(profile)
    }

    /// Creates a CMYK device link that limits the total ink coverage to `limit` percent.
    ///
    /// Limits outside 0..400 are clamped.
    pub fn new_ink_limiting_link(color_space: ColorSpace, limit: f64) -> Result<Self> {
        if color_space != ColorSpace::CMYK {
            return Err(ProfileError::UnsupportedColorSpace {
                found: color_space,
                expected: "CMYK",
            });
        }

        let limiter = InkLimiter::new(limit);
        let channels = color_space.channels();

        let mut profile = IccProfile::new(ProfileClass::Link, color_space);
        profile.set_version(4, 3);
        profile.pcs = color_space;
        profile.rendering_intent = Intent::Perceptual;

        let clut = Grid::sample_uniform(17, channels, channels, |input, output| {
            limiter.sample(input, output)
        })?;

        let mut lut = Pipeline::with_channels(channels, channels);
        lut.prepend_stage(PipelineStage::new_ident_curve_set(channels))?;
        lut.append_stage(PipelineStage::new_clut(clut))?;
        lut.append_stage(PipelineStage::new_ident_curve_set(channels))?;

        profile.set_description("ink-limiting built-in");
        profile.insert_tag(IccTag::AToB0, IccValue::Pipeline(lut));
        profile.set_sequence_description("ink-limiting built-in");

        Ok(profile)
    }

    /// Creates a version 2 Lab identity profile.
    ///
    /// The white point defaults to D50.
    pub fn new_lab2(white_point: Option<CxyY>) -> Result<Self> {
        let white_point = white_point.unwrap_or_else(|| D50.into());
        let mut profile = Self::new_rgb(Some(white_point), None, None)?;
        profile.set_version(2, 1);

        profile.device_class = ProfileClass::Abstract;
        profile.color_space = ColorSpace::Lab;
        profile.pcs = ColorSpace::Lab;

        profile.set_description("Lab identity built-in");

        // An identity LUT is all we need
        let mut lut = Pipeline::with_channels(3, 3);
        lut.prepend_stage(PipelineStage::new_identity_clut(3)?)?;
        profile.insert_tag(IccTag::AToB0, IccValue::Pipeline(lut));

        Ok(profile)
    }

    /// Creates a version 4 Lab identity profile.
    ///
    /// The white point defaults to D50.
    pub fn new_lab4(white_point: Option<CxyY>) -> Result<Self> {
        let white_point = white_point.unwrap_or_else(|| D50.into());
        let mut profile = Self::new_rgb(Some(white_point), None, None)?;
        profile.set_version(4, 3);

        profile.device_class = ProfileClass::Abstract;
        profile.color_space = ColorSpace::Lab;
        profile.pcs = ColorSpace::Lab;

        profile.set_description("Lab identity built-in");

        let mut lut = Pipeline::with_channels(3, 3);
        lut.prepend_stage(PipelineStage::new_ident_curve_set(3))?;
        profile.insert_tag(IccTag::AToB0, IccValue::Pipeline(lut));

        Ok(profile)
    }

    /// Creates an XYZ identity profile.
    pub fn new_xyz() -> Result<Self> {
        let mut profile = Self::new_rgb(Some(D50.into()), None, None)?;
        profile.set_version(4, 3);

        profile.device_class = ProfileClass::Abstract;
        profile.color_space = ColorSpace::XYZ;
        profile.pcs = ColorSpace::XYZ;

        profile.set_description("XYZ identity built-in");

        let mut lut = Pipeline::with_channels(3, 3);
        lut.prepend_stage(PipelineStage::new_ident_curve_set(3))?;
        profile.insert_tag(IccTag::AToB0, IccValue::Pipeline(lut));

        Ok(profile)
    }

    /// Creates a new sRGB profile.
    pub fn new_srgb() -> Result<Self> {
        let d65 = CxyY {
            x: 0.3127,
            y: 0.3290,
            Y: 1.0,
        };
        let curve = ToneCurve::new_srgb();

        let mut profile = Self::new_rgb(
            Some(d65),
            Some(REC709_PRIMARIES),
            Some([&curve, &curve, &curve]),
        )?;
        profile.set_description("sRGB built-in");

        Ok(profile)
    }

    /// Creates an abstract Lab profile that adjusts brightness, contrast, hue and saturation, and
    /// optionally moves the white point between two color temperatures.
    ///
    /// # Examples
    /// ```
    /// # use iccsynth::IccProfile;
    /// # use iccsynth::adjust::Bchsw;
    /// let warmer = Bchsw {
    ///     grid_points: 17,
    ///     temp_src: 6504.,
    ///     temp_dest: 5000.,
    ///     ..Bchsw::default()
    /// };
    /// let profile = IccProfile::new_bchsw_abstract(&warmer).unwrap();
    /// assert_eq!(profile.description(), Some("BCHS built-in"));
    /// ```
    pub fn new_bchsw_abstract(params: &Bchsw) -> Result<Self> {
        let sampler = params.sampler();

        let mut profile = IccProfile::new(ProfileClass::Abstract, ColorSpace::Lab);
        profile.pcs = ColorSpace::Lab;
        profile.rendering_intent = Intent::Perceptual;

        let clut = Grid::sample_uniform(sampler.grid_points(), 3, 3, |input, output| {
            sampler.sample(input, output)
        })?;

        let mut lut = Pipeline::with_channels(3, 3);
        lut.append_stage(PipelineStage::new_clut(clut))?;

        profile.set_description("BCHS built-in");
        profile.insert_tag(IccTag::MediaWhitePoint, IccValue::Cxyz(D50));
        profile.insert_tag(IccTag::AToB0, IccValue::Pipeline(lut));

        Ok(profile)
    }

    /// Creates an output profile that maps every Lab color to gray 0.
    ///
    /// Useful as the proofing target of a gamut check.
    pub fn new_null() -> Result<Self> {
        let mut profile = IccProfile::new(ProfileClass::Output, ColorSpace::Gray);
        profile.set_version(4, 3);
        profile.set_description("NULL profile built-in");
        profile.pcs = ColorSpace::Lab;

        let zero = ToneCurve::new_table(vec![0, 0]);

        let mut lut = Pipeline::with_channels(3, 1);
        lut.append_stage(PipelineStage::new_curve_set(vec![zero.clone(); 3]))?;
        // picks L*
        lut.append_stage(PipelineStage::new_matrix(1, vec![1., 0., 0.], None))?;
        lut.append_stage(PipelineStage::new_curve_set(vec![zero]))?;

        profile.insert_tag(IccTag::BToA0, IccValue::Pipeline(lut));
        profile.insert_tag(IccTag::MediaWhitePoint, IccValue::Cxyz(D50));

        Ok(profile)
    }
}

#[cfg(test)]
use crate::color::D65;

#[test]
fn create_profile_sanity_check() {
    IccProfile::new_srgb().unwrap();
    IccProfile::new_lab2(None).unwrap();
    IccProfile::new_lab4(Some(D65.into())).unwrap();
    IccProfile::new_xyz().unwrap();
    IccProfile::new_null().unwrap();
    IccProfile::new_gray(Some(D50.into()), Some(&ToneCurve::new_gamma(2.2)));
}

#[test]
fn rgb_tags_follow_arguments() {
    let bare = IccProfile::new_rgb(None, None, None).unwrap();
    assert!(!bare.contains_tag(IccTag::MediaWhitePoint));
    assert!(!bare.contains_tag(IccTag::ChromaticAdaptation));
    assert!(bare.contains_tag(IccTag::ProfileDescription));
    assert!(bare.contains_tag(IccTag::Copyright));

    // primaries without a white point: chromaticity but no colorants
    let no_white = IccProfile::new_rgb(None, Some(REC709_PRIMARIES), None).unwrap();
    assert!(no_white.contains_tag(IccTag::Chromaticity));
    assert!(!no_white.contains_tag(IccTag::RedColorant));

    let a = ToneCurve::new_gamma(2.2);
    let b = ToneCurve::new_gamma(2.2);
    let split = IccProfile::new_rgb(Some(D65.into()), None, Some([&a, &b, &a])).unwrap();
    assert!(matches!(
        split.tag_data(IccTag::GreenTRC),
        Some(crate::profile::IccTagData::Value(_))
    ));
    assert!(matches!(
        split.tag_data(IccTag::BlueTRC),
        Some(crate::profile::IccTagData::Linked(_))
    ));
}

#[test]
fn srgb_colorants() {
    let srgb = IccProfile::new_srgb().unwrap();
    assert_eq!(srgb.version(), (4, 3));
    assert_eq!(srgb.description(), Some("sRGB built-in"));
    assert_eq!(srgb.media_white_point(), D50);

    // the colorants sum to the D50 white point
    let mut sum = Cxyz::default();
    for tag in [IccTag::RedColorant, IccTag::GreenColorant, IccTag::BlueColorant] {
        match srgb.get_tag(tag) {
            Some(IccValue::Cxyz(c)) => {
                sum.x += c.x;
                sum.y += c.y;
                sum.z += c.z;
            }
            other => panic!("unexpected colorant {:?}", other),
        }
    }
    assert!((sum.x - D50.x).abs() < 1e-3);
    assert!((sum.y - D50.y).abs() < 1e-3);
    assert!((sum.z - D50.z).abs() < 1e-3);

    // red X from the usual D50-adapted sRGB matrix
    match srgb.get_tag(IccTag::RedColorant) {
        Some(IccValue::Cxyz(red)) => assert!((red.x - 0.4361).abs() < 1e-3),
        other => panic!("unexpected colorant {:?}", other),
    }
}

#[test]
fn identity_profiles() {
    let lab2 = IccProfile::new_lab2(None).unwrap();
    assert_eq!(lab2.version(), (2, 1));
    assert_eq!(lab2.device_class, ProfileClass::Abstract);
    assert_eq!((lab2.color_space, lab2.pcs), (ColorSpace::Lab, ColorSpace::Lab));
    assert_eq!(lab2.description(), Some("Lab identity built-in"));

    let lut = lab2.get_tag(IccTag::AToB0).and_then(IccValue::as_pipeline).unwrap();
    let mut out = [0.; 3];
    lut.transform(&[0.25, 0.5, 0.75], &mut out);
    for (a, b) in out.iter().zip(&[0.25, 0.5, 0.75]) {
        assert!((a - b).abs() < 1e-9);
    }

    let xyz = IccProfile::new_xyz().unwrap();
    assert_eq!(xyz.version(), (4, 3));
    assert_eq!((xyz.color_space, xyz.pcs), (ColorSpace::XYZ, ColorSpace::XYZ));
    assert_eq!(xyz.description(), Some("XYZ identity built-in"));
}

#[test]
fn null_profile_outputs_zero() {
    let null = IccProfile::new_null().unwrap();
    assert_eq!(null.device_class, ProfileClass::Output);
    assert_eq!((null.color_space, null.pcs), (ColorSpace::Gray, ColorSpace::Lab));
    assert!(!null.contains_tag(IccTag::AToB0));

    let lut = null.get_tag(IccTag::BToA0).and_then(IccValue::as_pipeline).unwrap();
    assert_eq!((lut.input_channels(), lut.output_channels()), (3, 1));

    let mut out = [1.];
    lut.transform(&[0.7, 0.2, 0.9], &mut out);
    assert_eq!(out, [0.]);
}

#[test]
fn device_links_carry_sequence() {
    let curves = vec![ToneCurve::new_gamma(1.8); 3];
    let link = IccProfile::new_linearization_link(ColorSpace::RGB, &curves).unwrap();
    assert_eq!(link.device_class, ProfileClass::Link);
    assert_eq!((link.color_space, link.pcs), (ColorSpace::RGB, ColorSpace::RGB));

    match link.get_tag(IccTag::ProfileSequenceDesc) {
        Some(IccValue::ProfileSequence(seq)) => {
            assert_eq!(seq.len(), 1);
            assert_eq!(seq[0].model.text(), Some("Linearization built-in"));
        }
        other => panic!("unexpected sequence {:?}", other),
    }

    let err = IccProfile::new_linearization_link(ColorSpace::CMYK, &curves).unwrap_err();
    assert_eq!(err.kind(), crate::error::ErrorKind::DomainError);
}
