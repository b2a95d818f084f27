//! Baking transforms into device link profiles.

use crate::encoding::{find_encoding, AllowedEncoding};
use crate::error::{ProfileError, Result};
use crate::fixed::s15f16;
use crate::named::NamedColorList;
use crate::pipeline::{Pipeline, PipelineStage, StageKernel, StageType};
use crate::profile::{ColorSpace, IccProfile, IccTag, IccValue, ProfileClass};
use crate::transform::Transform;
use std::convert::TryFrom;
use tracing::{debug, warn};

/// Options for [`transform_to_device_link`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceLinkOptions {
    /// Profile version as (major, minor). Versions below 4 select the version 2 LUT layouts and
    /// the legacy Lab encoding.
    pub version: (u32, u32),
    /// Derives the device class from the color spaces. Otherwise the profile is always a link.
    pub guess_device_class: bool,
    /// Skips straight to resampling the transform into a lookup table.
    pub force_clut: bool,
    /// Marks the stored pipeline for 8-bit precision.
    pub save_as_8_bits: bool,
    /// Grid points per axis when resampling. Derived from the channel count if unset.
    pub grid_points: Option<usize>,
}

impl Default for DeviceLinkOptions {
    fn default() -> Self {
        DeviceLinkOptions {
            version: (4, 3),
            guess_device_class: true,
            force_clut: false,
            save_as_8_bits: false,
            grid_points: None,
        }
    }
}

/// Grid resolution used when the caller does not pick one.
fn reasonable_grid_points(channels: usize) -> usize {
    match channels {
        c if c > 4 => 7,
        4 => 17,
        _ => 33,
    }
}

/// Picks the device class and header color spaces for a transform from `entry` to `exit`.
fn device_class_for(
    entry: ColorSpace,
    exit: ColorSpace,
    guess: bool,
) -> (ProfileClass, ColorSpace, ColorSpace) {
    if !guess {
        return (ProfileClass::Link, entry, exit);
    }

    match (entry.is_pcs(), exit.is_pcs()) {
        (true, true) => (ProfileClass::Abstract, entry, exit),
        // output profiles are stored in the PCS -> device direction
        (true, false) => (ProfileClass::Output, exit, entry),
        (false, true) => (ProfileClass::Input, entry, exit),
        (false, false) => (ProfileClass::Link, entry, exit),
    }
}

/// Checks that every matrix coefficient survives the s15Fixed16 encoding.
fn check_matrices(pipeline: &Pipeline) -> Result<()> {
    for stage in pipeline.stages() {
        if let StageKernel::Matrix { matrix, offset, .. } = &stage.kernel {
            for value in matrix.iter().chain(offset.iter().flatten()) {
                s15f16::try_from(*value)?;
            }
        }
    }
    Ok(())
}

/// Index passed to the named color lookup, which only addresses 16 bits.
fn lookup_index(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}

fn named_color_device_link(transform: &Transform, list: &NamedColorList) -> Result<IccProfile> {
    let mut profile = IccProfile::new(ProfileClass::NamedColor, transform.exit_color_space());
    profile.pcs = ColorSpace::Lab;
    profile.set_description("Named color devicelink");

    let output_channels = transform.pipeline().output_channels();
    let mut colors = list.clone();
    colors.set_colorant_count(output_channels);

    let addressable = usize::from(u16::MAX) + 1;
    if colors.len() > addressable {
        warn!(
            colors = colors.len(),
            "named colors past index 65535 take the colorants of color 65535"
        );
    }

    for (index, color) in colors.iter_mut().enumerate() {
        transform.eval_16(&[lookup_index(index)], &mut color.device_colorant);
    }

    debug!(
        colors = colors.len(),
        channels = output_channels,
        "re-evaluated named colors"
    );

    profile.insert_tag(IccTag::NamedColor2, IccValue::NamedColorList(colors));
    Ok(profile)
}

/// Bakes a transform into a single profile.
///
/// Transforms that start with a named color lookup become named color profiles. Everything else
/// becomes a profile with one LUT tag (`BToA0` for output profiles, `AToB0` otherwise) whose
/// pipeline is stored in one of the [allowed layouts](crate::encoding::ALLOWED_ENCODINGS):
///
/// 1. the pipeline as is,
/// 2. the optimized pipeline,
/// 3. the pipeline resampled into a lookup table between identity curves.
///
/// With `force_clut` only the last one is tried.
///
/// # Examples
/// ```
/// # use iccsynth::{DeviceLinkOptions, ToneCurve};
/// # use iccsynth::pipeline::{Pipeline, PipelineStage};
/// # use iccsynth::profile::{ColorSpace, IccTag, Intent, ProfileClass};
/// # use iccsynth::transform::Transform;
/// let mut pipeline = Pipeline::new();
/// pipeline
///     .append_stage(PipelineStage::new_curve_set(vec![ToneCurve::new_gamma(1.8); 3]))
///     .unwrap();
///
/// let transform =
///     Transform::new(pipeline, ColorSpace::RGB, ColorSpace::RGB, Intent::Perceptual).unwrap();
/// let profile = transform.to_device_link(&DeviceLinkOptions::default()).unwrap();
///
/// assert_eq!(profile.device_class, ProfileClass::Link);
/// assert_eq!(profile.version(), (4, 3));
/// assert!(profile.contains_tag(IccTag::AToB0));
/// ```
pub fn transform_to_device_link(
    transform: &Transform,
    options: &DeviceLinkOptions,
) -> Result<IccProfile> {
    if let Some(list) = transform.named_color_list() {
        return named_color_device_link(transform, list);
    }

    let (major, minor) = options.version;
    let is_v4 = major >= 4;
    let entry = transform.entry_color_space();
    let exit = transform.exit_color_space();

    let mut lut = transform.pipeline().clone();

    if entry == ColorSpace::Lab && !is_v4 {
        lut.prepend_stage(PipelineStage::new_labv2_to_v4_curves())?;
    }
    if exit == ColorSpace::Lab && !is_v4 {
        lut.append_stage(PipelineStage::new_labv4_to_v2())?;
    }

    let (device_class, color_space, pcs) =
        device_class_for(entry, exit, options.guess_device_class);

    let mut profile = IccProfile::new(device_class, color_space);
    profile.pcs = pcs;
    profile.set_version(major, minor);

    let destination = if device_class == ProfileClass::Output {
        IccTag::BToA0
    } else {
        IccTag::AToB0
    };

    let mut encoding: Option<&AllowedEncoding> = None;

    // a forced table skips straight to resampling
    if !options.force_clut {
        encoding = find_encoding(&lut, is_v4, destination);
        if encoding.is_some() {
            debug!(tier = 1, "pipeline stored as is");
        } else {
            lut.optimize();
            encoding = find_encoding(&lut, is_v4, destination);
            if encoding.is_some() {
                debug!(tier = 2, stages = lut.stages().len(), "optimized pipeline stored");
            }
        }
    }

    if encoding.is_none() {
        let points = options
            .grid_points
            .unwrap_or_else(|| reasonable_grid_points(lut.input_channels()));
        lut.resample_into_clut(points)?;

        let first_is_curves = lut.stages().first().map(|s| s.ty) == Some(StageType::CurveSet);
        if !first_is_curves {
            lut.prepend_stage(PipelineStage::new_ident_curve_set(entry.channels()))?;
        }
        let last_is_curves = lut.stages().last().map(|s| s.ty) == Some(StageType::CurveSet);
        if !last_is_curves {
            lut.append_stage(PipelineStage::new_ident_curve_set(exit.channels()))?;
        }

        encoding = find_encoding(&lut, is_v4, destination);
        if encoding.is_some() {
            debug!(tier = 3, points, "pipeline resampled into a lookup table");
        }
    }

    let encoding = encoding.ok_or(ProfileError::EncodingImpossible {
        version_major: major,
        stages: lut.stages().len(),
    })?;

    check_matrices(&lut)?;

    let shape: Vec<StageType> = lut.stage_types().collect();
    debug!(
        class = ?device_class,
        tag = ?destination,
        lut_type = ?encoding.lut_type,
        shape = ?shape,
        "encoded device link"
    );

    if options.save_as_8_bits {
        lut.set_save_as_8_bits(true);
    }

    profile.set_description("devicelink");
    profile.insert_tag(destination, IccValue::Pipeline(lut));

    if let Some(colorants) = transform.input_colorants() {
        profile.insert_tag(IccTag::ColorantTable, IccValue::ColorantTable(colorants.clone()));
    }
    if let Some(colorants) = transform.output_colorants() {
        profile.insert_tag(
            IccTag::ColorantTableOut,
            IccValue::ColorantTable(colorants.clone()),
        );
    }

    if device_class == ProfileClass::Link {
        if let Some(sequence) = transform.sequence() {
            profile.insert_tag(
                IccTag::ProfileSequenceDesc,
                IccValue::ProfileSequence(sequence.to_vec()),
            );
        }
    }

    let white_point = if device_class == ProfileClass::Input {
        transform.entry_white_point()
    } else {
        transform.exit_white_point()
    };
    profile.insert_tag(IccTag::MediaWhitePoint, IccValue::Cxyz(white_point));

    profile.rendering_intent = transform.rendering_intent();

    Ok(profile)
}

#[test]
fn grid_points_by_channels() {
    assert_eq!(reasonable_grid_points(1), 33);
    assert_eq!(reasonable_grid_points(3), 33);
    assert_eq!(reasonable_grid_points(4), 17);
    assert_eq!(reasonable_grid_points(5), 7);
    assert_eq!(reasonable_grid_points(15), 7);
}

#[test]
fn lookup_indices_saturate() {
    assert_eq!(lookup_index(0), 0);
    assert_eq!(lookup_index(65535), 65535);
    assert_eq!(lookup_index(65536), 65535);
    assert_eq!(lookup_index(1 << 20), 65535);
}

#[test]
fn device_classes() {
    use ColorSpace::*;

    assert_eq!(device_class_for(Lab, XYZ, true), (ProfileClass::Abstract, Lab, XYZ));
    assert_eq!(device_class_for(Lab, CMYK, true), (ProfileClass::Output, CMYK, Lab));
    assert_eq!(device_class_for(RGB, XYZ, true), (ProfileClass::Input, RGB, XYZ));
    assert_eq!(device_class_for(RGB, CMYK, true), (ProfileClass::Link, RGB, CMYK));
    assert_eq!(device_class_for(Lab, CMYK, false), (ProfileClass::Link, Lab, CMYK));
}

#[test]
fn unrepresentable_matrix_is_rejected() {
    use crate::error::ErrorKind;
    use crate::profile::Intent;

    let mut pipeline = Pipeline::new();
    pipeline
        .append_stage(PipelineStage::new_ident_curve_set(3))
        .unwrap();
    pipeline
        .append_stage(PipelineStage::new_matrix(
            3,
            vec![1e6, 0., 0., 0., 1., 0., 0., 0., 1.],
            None,
        ))
        .unwrap();
    pipeline
        .append_stage(PipelineStage::new_ident_curve_set(3))
        .unwrap();

    let transform =
        Transform::new(pipeline, ColorSpace::RGB, ColorSpace::XYZ, Intent::Perceptual).unwrap();
    let err = transform
        .to_device_link(&DeviceLinkOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PartialConstructionAbort);
}
