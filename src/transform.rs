//! Color transforms.

use crate::color::{Cxyz, D50};
use crate::device_link::{transform_to_device_link, DeviceLinkOptions};
use crate::error::{ProfileError, Result};
use crate::named::NamedColorList;
use crate::pipeline::{Pipeline, StageKernel};
use crate::profile::{ColorSpace, IccProfile, Intent, ProfileSequenceItem};

/// A color transform: a pipeline together with what it converts from and to.
///
/// Transforms are usually the result of linking profiles. They can be baked into a device link
/// with [`Transform::to_device_link`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pipeline: Pipeline,
    entry_color_space: ColorSpace,
    exit_color_space: ColorSpace,
    rendering_intent: Intent,
    entry_white_point: Cxyz,
    exit_white_point: Cxyz,
    input_colorants: Option<NamedColorList>,
    output_colorants: Option<NamedColorList>,
    sequence: Option<Vec<ProfileSequenceItem>>,
}

impl Transform {
    /// Creates a transform with D50 white points.
    ///
    /// The pipeline must have as many output channels as the exit color space. The same goes for
    /// input channels and the entry color space, unless the pipeline starts with a named color
    /// lookup (which always takes a single color index).
    pub fn new(
        pipeline: Pipeline,
        entry_color_space: ColorSpace,
        exit_color_space: ColorSpace,
        rendering_intent: Intent,
    ) -> Result<Self> {
        let starts_with_named = matches!(
            pipeline.stages().first().map(|stage| &stage.kernel),
            Some(StageKernel::NamedColor { .. })
        );

        if !starts_with_named && entry_color_space.channels() != pipeline.input_channels() {
            return Err(ProfileError::ChannelMismatch {
                space: entry_color_space,
                expected: entry_color_space.channels(),
                found: pipeline.input_channels(),
            });
        }
        if exit_color_space.channels() != pipeline.output_channels() {
            return Err(ProfileError::ChannelMismatch {
                space: exit_color_space,
                expected: exit_color_space.channels(),
                found: pipeline.output_channels(),
            });
        }

        Ok(Transform {
            pipeline,
            entry_color_space,
            exit_color_space,
            rendering_intent,
            entry_white_point: D50,
            exit_white_point: D50,
            input_colorants: None,
            output_colorants: None,
            sequence: None,
        })
    }

    /// Sets the media white points of the source and destination.
    pub fn with_white_points(mut self, entry: Cxyz, exit: Cxyz) -> Self {
        self.entry_white_point = entry;
        self.exit_white_point = exit;
        self
    }

    /// Sets the colorant table of the source.
    pub fn with_input_colorants(mut self, colorants: NamedColorList) -> Self {
        self.input_colorants = Some(colorants);
        self
    }

    /// Sets the colorant table of the destination.
    pub fn with_output_colorants(mut self, colorants: NamedColorList) -> Self {
        self.output_colorants = Some(colorants);
        self
    }

    /// Sets the descriptions of the profiles this transform was linked from.
    pub fn with_sequence(mut self, sequence: Vec<ProfileSequenceItem>) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn entry_color_space(&self) -> ColorSpace {
        self.entry_color_space
    }

    pub fn exit_color_space(&self) -> ColorSpace {
        self.exit_color_space
    }

    pub fn rendering_intent(&self) -> Intent {
        self.rendering_intent
    }

    pub fn entry_white_point(&self) -> Cxyz {
        self.entry_white_point
    }

    pub fn exit_white_point(&self) -> Cxyz {
        self.exit_white_point
    }

    pub fn input_colorants(&self) -> Option<&NamedColorList> {
        self.input_colorants.as_ref()
    }

    pub fn output_colorants(&self) -> Option<&NamedColorList> {
        self.output_colorants.as_ref()
    }

    pub fn sequence(&self) -> Option<&[ProfileSequenceItem]> {
        self.sequence.as_deref()
    }

    /// Returns the named color list if the pipeline starts with a named color lookup.
    pub fn named_color_list(&self) -> Option<&NamedColorList> {
        match self.pipeline.stages().first().map(|stage| &stage.kernel) {
            Some(StageKernel::NamedColor { list, .. }) => Some(list),
            _ => None,
        }
    }

    /// Transforms a 16-bit color.
    pub fn eval_16(&self, input: &[u16], output: &mut [u16]) {
        self.pipeline.transform_16(input, output)
    }

    /// Bakes this transform into a device link profile.
    ///
    /// See [`transform_to_device_link`].
    pub fn to_device_link(&self, options: &DeviceLinkOptions) -> Result<IccProfile> {
        transform_to_device_link(self, options)
    }
}

#[cfg(test)]
use crate::pipeline::PipelineStage;

#[test]
fn channel_counts_are_checked() {
    let mut pipeline = Pipeline::new();
    pipeline
        .append_stage(PipelineStage::new_ident_curve_set(3))
        .unwrap();

    let intent = Intent::Perceptual;
    assert!(Transform::new(pipeline.clone(), ColorSpace::RGB, ColorSpace::Lab, intent).is_ok());

    let err =
        Transform::new(pipeline.clone(), ColorSpace::CMYK, ColorSpace::RGB, intent).unwrap_err();
    assert_eq!(
        err,
        ProfileError::ChannelMismatch {
            space: ColorSpace::CMYK,
            expected: 4,
            found: 3,
        }
    );

    assert!(Transform::new(pipeline, ColorSpace::RGB, ColorSpace::Gray, intent).is_err());
}

#[test]
fn named_color_pipelines_take_an_index() {
    let mut list = NamedColorList::new(3, "pre", "suf");
    list.push("teal", [20000, 30000, 40000], &[0, 32768, 32768]);

    let mut pipeline = Pipeline::new();
    pipeline
        .append_stage(PipelineStage::new_named_color(list.clone(), false))
        .unwrap();

    let transform =
        Transform::new(pipeline, ColorSpace::RGB, ColorSpace::RGB, Intent::Perceptual).unwrap();
    assert_eq!(transform.named_color_list(), Some(&list));

    let mut out = [0; 3];
    transform.eval_16(&[0], &mut out);
    assert_eq!(out, [0, 32768, 32768]);
}
