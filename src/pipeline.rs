//! Color transform pipelines.

use crate::color::{CLab, Cxyz, D50};
use crate::grid::{Grid, GridError};
use crate::named::NamedColorList;
use crate::tone_curve::ToneCurve;
use crate::util::quick_saturate_word;
use std::f64;
use thiserror::Error;

/// Maximum amount of color channels the pipeline evaluator can handle.
pub const MAX_STAGE_CHANNELS: usize = 32;

/// Stage types.
///
/// The discriminants are the four-character signatures Little CMS uses for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageType {
    /// `cvst`
    CurveSet = 0x63767374,
    /// `matf`
    Matrix = 0x6D617466,
    /// `clut`
    CLut = 0x636C7574,

    /// (non-ICC) `l2x `
    ///
    /// Converts between PCS; 3 inputs & 3 outputs.
    Xyz2Lab = 0x6C327820,
    /// (non-ICC) `x2l `
    ///
    /// Converts between PCS; 3 inputs & 3 outputs.
    Lab2Xyz = 0x78326C20,
    /// (non-ICC) `ncl `
    NamedColor = 0x6E636C20,
    /// (non-ICC) `2 4 `
    LabV2toV4 = 0x32203420,
    /// (non-ICC) `4 2 `
    LabV4toV2 = 0x34203220,

    /// (non-ICC) `idn `
    ///
    /// Copies input to output.
    Identity = 0x69646E20,
}

/// The inner function of a pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageKernel {
    /// Copies input to output.
    ///
    /// The parameter indicates the number of channels.
    Identity(usize),
    /// Applies a set of tone curves.
    ///
    /// The number of tone curves is the number of input and output channels.
    CurveSet(Vec<ToneCurve>),
    /// Applies a matrix and an optional offset.
    ///
    /// The number of columns is the number of inputs, and the number of rows the number of outputs.
    Matrix {
        rows: usize,
        matrix: Vec<f64>,
        offset: Option<Vec<f64>>,
    },
    /// Interpolates in a color lookup table.
    CLut(Grid),
    /// Converts XYZ to L\*a\*b\*.
    ///
    /// This kernel always has 3 input and 3 output channels.
    Xyz2Lab,
    /// Converts L\*a\*b\* to XYZ.
    ///
    /// This kernel always has 3 input and 3 output channels.
    Lab2Xyz,
    /// Looks up a color index in a named color list.
    ///
    /// Outputs either the PCS value or the device colorants of the color.
    NamedColor { list: NamedColorList, use_pcs: bool },
}

impl StageKernel {
    /// Returns the number of input channels.
    pub fn input_channels(&self) -> usize {
        match self {
            Self::Identity(n) => *n,
            Self::CurveSet(c) => c.len(),
            Self::Matrix { rows, matrix, .. } => matrix.len() / rows,
            Self::CLut(grid) => grid.input_channels(),
            Self::Xyz2Lab | Self::Lab2Xyz => 3,
            Self::NamedColor { .. } => 1,
        }
    }

    /// Returns the number of output channels.
    pub fn output_channels(&self) -> usize {
        match self {
            Self::Identity(n) => *n,
            Self::CurveSet(c) => c.len(),
            Self::Matrix { rows, .. } => *rows,
            Self::CLut(grid) => grid.output_channels(),
            Self::Xyz2Lab | Self::Lab2Xyz => 3,
            Self::NamedColor { use_pcs: true, .. } => 3,
            Self::NamedColor { list, .. } => list.colorant_count(),
        }
    }

    /// The stage type this kernel implements when nothing more specific applies.
    fn natural_type(&self) -> StageType {
        match self {
            Self::Identity(_) => StageType::Identity,
            Self::CurveSet(_) => StageType::CurveSet,
            Self::Matrix { .. } => StageType::Matrix,
            Self::CLut(_) => StageType::CLut,
            Self::Xyz2Lab => StageType::Xyz2Lab,
            Self::Lab2Xyz => StageType::Lab2Xyz,
            Self::NamedColor { .. } => StageType::NamedColor,
        }
    }

    /// Transforms a color.
    pub fn transform(&self, input: &[f64], output: &mut [f64]) {
        match self {
            Self::Identity(n) => {
                output[..*n].copy_from_slice(&input[..*n]);
            }
            Self::CurveSet(c) => {
                for (i, curve) in c.iter().enumerate() {
                    output[i] = curve.eval(input[i]).unwrap_or(f64::NAN);
                }
            }
            Self::Matrix {
                rows,
                matrix,
                offset,
            } => {
                let in_channels = matrix.len() / *rows;
                let out_channels = *rows;
                for i in 0..out_channels {
                    let mut value = 0.;
                    for j in 0..in_channels {
                        value += input[j] * matrix[rows * j + i];
                    }
                    if let Some(offset) = offset {
                        value += offset[i];
                    }
                    output[i] = value;
                }
            }
            Self::CLut(grid) => grid.eval(input, output),
            Self::Xyz2Lab => {
                // From 0..1.0 to XYZ
                let xyz = Cxyz {
                    x: input[0] * Cxyz::MAX_ENCODABLE,
                    y: input[1] * Cxyz::MAX_ENCODABLE,
                    z: input[2] * Cxyz::MAX_ENCODABLE,
                };

                let lab = xyz.into_lab(D50);

                // From V4 Lab to 0..1.0
                output[0] = lab.l / 100.;
                output[1] = (lab.a + 128.) / 255.;
                output[2] = (lab.b + 128.) / 255.;
            }
            Self::Lab2Xyz => {
                // V4 rules
                let lab = CLab {
                    l: input[0] * 100.,
                    a: input[1] * 255. - 128.,
                    b: input[2] * 255. - 128.,
                };

                let xyz = lab.into_xyz(D50);

                output[0] = xyz.x / Cxyz::MAX_ENCODABLE;
                output[1] = xyz.y / Cxyz::MAX_ENCODABLE;
                output[2] = xyz.z / Cxyz::MAX_ENCODABLE;
            }
            Self::NamedColor { list, use_pcs } => {
                let index = quick_saturate_word(input[0] * 65535.) as usize;
                let channels = self.output_channels();

                match list.get(index) {
                    Some(color) if *use_pcs => {
                        for (out, value) in output.iter_mut().zip(&color.pcs) {
                            *out = *value as f64 / 65535.;
                        }
                    }
                    Some(color) => {
                        for (out, value) in output.iter_mut().zip(&color.device_colorant) {
                            *out = *value as f64 / 65535.;
                        }
                    }
                    // unknown index
                    None => {
                        for out in &mut output[..channels] {
                            *out = 0.;
                        }
                    }
                }
            }
        }
    }

    fn can_merge_with(&self, other: &StageKernel) -> bool {
        matches!(
            (self, other),
            (StageKernel::Matrix { .. }, StageKernel::Matrix { .. })
                | (StageKernel::Xyz2Lab, StageKernel::Lab2Xyz)
                | (StageKernel::Lab2Xyz, StageKernel::Xyz2Lab)
                | (StageKernel::CurveSet(_), StageKernel::CurveSet(_))
        )
    }

    /// Merges `other` (which comes after this kernel) into this kernel.
    ///
    /// Returns false and leaves this kernel untouched if the two can't be merged.
    fn merge_with(&mut self, other: &StageKernel) -> bool {
        match (self, other) {
            (
                StageKernel::Matrix {
                    rows: rows_a,
                    matrix: matrix_a,
                    offset: offset_a,
                },
                StageKernel::Matrix {
                    rows: rows_b,
                    matrix: matrix_b,
                    offset: offset_b,
                },
            ) => {
                // result_b = (matrix_b * matrix_a) * in_color + (matrix_b * offset_a + offset_b)
                if matrix_b.len() / *rows_b != *rows_a {
                    return false;
                }

                let out_cols = matrix_a.len() / *rows_a;
                let out_rows = *rows_b;
                let mut out_matrix = Vec::with_capacity(out_cols * out_rows);

                for i in 0..out_cols {
                    for j in 0..out_rows {
                        let mut value = 0.;
                        for k in 0..*rows_a {
                            value += matrix_b[*rows_b * k + j] * matrix_a[*rows_a * i + k];
                        }
                        out_matrix.push(value);
                    }
                }

                let mut out_offset = Vec::with_capacity(out_rows);
                for i in 0..out_rows {
                    let mut off_value = offset_b.as_ref().map_or(0., |off| off[i]);
                    for j in 0..*rows_a {
                        off_value += matrix_b[*rows_b * j + i]
                            * offset_a.as_ref().map_or(0., |off| off[j]);
                    }
                    out_offset.push(off_value);
                }

                let out_offset = if out_offset.iter().any(|x| *x != 0.) {
                    Some(out_offset)
                } else {
                    None
                };

                *rows_a = out_rows;
                *matrix_a = out_matrix;
                *offset_a = out_offset;
                true
            }
            a @ (StageKernel::Xyz2Lab, StageKernel::Lab2Xyz)
            | a @ (StageKernel::Lab2Xyz, StageKernel::Xyz2Lab) => {
                // these cancel each other out
                *a.0 = StageKernel::Identity(3);
                true
            }
            (StageKernel::CurveSet(curves_a), StageKernel::CurveSet(curves_b)) => {
                if curves_a.len() != curves_b.len() {
                    return false;
                }
                for (curve, next) in curves_a.iter_mut().zip(curves_b) {
                    *curve = next.compose_with_approx(curve);
                }
                true
            }
            _ => false,
        }
    }

    pub fn is_identity(&self) -> bool {
        match self {
            StageKernel::Identity(_) => true,
            StageKernel::Matrix {
                rows,
                matrix,
                offset,
            } => {
                let cols = matrix.len() / rows;
                if *rows != cols {
                    return false;
                }
                for i in 0..cols {
                    for j in 0..*rows {
                        let ident_value = if i == j { 1. } else { 0. };
                        if matrix[i * rows + j] != ident_value {
                            return false;
                        }
                    }
                }
                offset
                    .as_ref()
                    .map_or(true, |offset| offset.iter().all(|x| *x == 0.))
            }
            StageKernel::CurveSet(curves) => curves.iter().all(ToneCurve::is_identity),
            _ => false,
        }
    }
}

/// A pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStage {
    /// The stage type. This is an arbitrary tag only loosely related to the kernel.
    /// Mainly, the kernel should implement the function of what this type purports this stage to
    /// be.
    pub ty: StageType,
    /// The kernel.
    pub kernel: StageKernel,
}

impl PipelineStage {
    fn from_kernel(kernel: StageKernel) -> Self {
        PipelineStage {
            ty: kernel.natural_type(),
            kernel,
        }
    }

    pub fn new_identity(channels: usize) -> Self {
        Self::from_kernel(StageKernel::Identity(channels))
    }

    /// Creates a new CurveSet pipeline stage.
    pub fn new_curve_set(curves: Vec<ToneCurve>) -> Self {
        Self::from_kernel(StageKernel::CurveSet(curves))
    }

    /// Creates a new CurveSet pipeline stage with `y = x` tone curves.
    pub fn new_ident_curve_set(channels: usize) -> Self {
        Self::new_curve_set(vec![ToneCurve::new_gamma(1.); channels])
    }

    /// Creates a new matrix stage.
    ///
    /// The matrix should be column-major, like in the following 3×3 example:
    ///
    /// ```text
    ///  ⎡0 3 6⎤   ⎡in[0]⎤   ⎡out[0]⎤
    ///  ⎢1 4 7⎥ * ⎢in[1]⎥ = ⎢out[1]⎥
    ///  ⎣2 5 8⎦   ⎣in[2]⎦   ⎣out[2]⎦
    /// ```
    ///
    /// The number of columns corresponds to the number of input channels, and the number of
    /// rows to the number of output channels.
    pub fn new_matrix(rows: usize, matrix: Vec<f64>, offset: Option<Vec<f64>>) -> Self {
        Self::from_kernel(StageKernel::Matrix {
            rows,
            matrix,
            offset,
        })
    }

    /// Creates a new lookup table stage.
    pub fn new_clut(grid: Grid) -> Self {
        Self::from_kernel(StageKernel::CLut(grid))
    }

    /// Creates a 2-point lookup table that maps every input to itself.
    pub fn new_identity_clut(channels: usize) -> Result<Self, GridError> {
        let grid = Grid::sample_uniform(2, channels, channels, |input, output| {
            output.copy_from_slice(input);
            true
        })?;
        Ok(Self::new_clut(grid))
    }

    /// Creates a new stage that converts 16-bit Lab V2 to Lab V4 using tone curves.
    pub fn new_labv2_to_v4_curves() -> PipelineStage {
        // 257 steps of 0x101 plus a saturated end point
        let mut table: Vec<u16> = (0..257u32).map(|i| ((i * 0xFFFF + 0x80) >> 8) as u16).collect();
        table.push(0xFFFF);

        let mut stage = Self::new_curve_set(vec![ToneCurve::new_table(table); 3]);
        stage.ty = StageType::LabV2toV4;
        stage
    }

    /// Creates a new stage that converts Lab V4 to Lab V2.
    pub fn new_labv4_to_v2() -> PipelineStage {
        const V4_TO_V2: f64 = 65280. / 65535.;

        let mut stage = Self::new_matrix(
            3,
            vec![V4_TO_V2, 0., 0., 0., V4_TO_V2, 0., 0., 0., V4_TO_V2],
            None,
        );
        stage.ty = StageType::LabV4toV2;
        stage
    }

    /// Creates a new stage that converts XYZ to Lab.
    pub fn new_xyz_to_lab() -> PipelineStage {
        Self::from_kernel(StageKernel::Xyz2Lab)
    }

    /// Creates a new stage that converts Lab to XYZ.
    pub fn new_lab_to_xyz() -> PipelineStage {
        Self::from_kernel(StageKernel::Lab2Xyz)
    }

    /// Creates a stage that maps a color index (scaled to 0..1 by 65535) to a named color.
    ///
    /// With `use_pcs` the stage outputs the PCS value of the color, otherwise its device
    /// colorants.
    pub fn new_named_color(list: NamedColorList, use_pcs: bool) -> PipelineStage {
        Self::from_kernel(StageKernel::NamedColor { list, use_pcs })
    }

    /// Returns the number of input channels of this stage.
    pub fn input_channels(&self) -> usize {
        self.kernel.input_channels()
    }

    /// Returns the number of output channels of this stage.
    pub fn output_channels(&self) -> usize {
        self.kernel.output_channels()
    }

    /// Transforms a color using the kernel.
    pub fn transform(&self, input: &[f64], output: &mut [f64]) {
        self.kernel.transform(input, output)
    }

    /// Merges the following stage into this one if their kernels allow it.
    fn merge_with(&mut self, other: &PipelineStage) -> bool {
        if !self.kernel.can_merge_with(&other.kernel) || !self.kernel.merge_with(&other.kernel) {
            return false;
        }
        self.ty = self.kernel.natural_type();
        true
    }

    /// Returns true if this stage essentially has no effect.
    pub fn is_identity(&self) -> bool {
        self.kernel.is_identity()
    }
}

/// A color transform pipeline.
///
/// A pipeline can be built using `append_stage` and can transform a color using `transform`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    stages: Vec<PipelineStage>,
    input_channels: usize,
    output_channels: usize,
    save_as_8_bits: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Creates a new empty pipeline.
    pub fn new() -> Self {
        Self::with_channels(0, 0)
    }

    /// Creates a new empty pipeline with declared channel counts.
    ///
    /// The counts follow the stages once any are added.
    pub fn with_channels(input_channels: usize, output_channels: usize) -> Self {
        Pipeline {
            stages: Vec::new(),
            input_channels,
            output_channels,
            save_as_8_bits: false,
        }
    }

    /// Returns the number of input channels.
    ///
    /// # Examples
    /// ```
    /// # use iccsynth::pipeline::*;
    /// let mut pipeline = Pipeline::new();
    ///
    /// // this is a 3 by 3 matrix and hence has 3 input and 3 output channels
    /// pipeline.append_stage(PipelineStage::new_matrix(
    ///     3,
    ///     vec![1., 0., 0., 0., 1., 0., 0., 0., 1.],
    ///     None,
    /// ));
    ///
    /// assert_eq!(pipeline.input_channels(), 3);
    /// ```
    pub fn input_channels(&self) -> usize {
        self.input_channels
    }

    /// Returns the number of output channels.
    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    /// Whether tables should be stored with 8-bit precision when serialized.
    pub fn save_as_8_bits(&self) -> bool {
        self.save_as_8_bits
    }

    pub fn set_save_as_8_bits(&mut self, value: bool) {
        self.save_as_8_bits = value;
    }

    /// Updates the number of channels from the first and last stage of this pipeline.
    ///
    /// An empty pipeline keeps whatever it declared last.
    fn update_channels(&mut self) {
        if let (Some(first), Some(last)) = (self.stages.first(), self.stages.last()) {
            self.input_channels = first.input_channels();
            self.output_channels = last.output_channels();
        }
    }

    /// Returns the inner pipeline stages.
    ///
    /// # Examples
    /// ```
    /// # use iccsynth::ToneCurve;
    /// # use iccsynth::pipeline::*;
    /// let stage_a = PipelineStage::new_curve_set(vec![
    ///     ToneCurve::new_gamma(1.0),
    ///     ToneCurve::new_gamma(1.0),
    ///     ToneCurve::new_gamma(1.0),
    /// ]);
    /// let stage_b = PipelineStage::new_identity(3);
    ///
    /// let mut pipeline = Pipeline::new();
    /// pipeline.append_stage(stage_a.clone()).unwrap();
    /// pipeline.append_stage(stage_b.clone()).unwrap();
    ///
    /// let stages = pipeline.stages();
    /// assert_eq!(stages[0], stage_a);
    /// assert_eq!(stages[1], stage_b);
    /// ```
    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    /// The stage types in order.
    pub fn stage_types(&self) -> impl Iterator<Item = StageType> + '_ {
        self.stages.iter().map(|stage| stage.ty)
    }

    /// Prepends a stage.
    ///
    /// The new stage must have the same number of output channels as the first stage has input
    /// channels.
    pub fn prepend_stage(&mut self, stage: PipelineStage) -> Result<(), PipelineError> {
        let stage_output = stage.output_channels();
        let next_input = self.input_channels();

        if !self.stages.is_empty() && stage_output != next_input {
            return Err(PipelineError::ChannelMismatch(stage_output, next_input));
        }

        self.stages.insert(0, stage);
        self.update_channels();

        Ok(())
    }

    /// Appends a stage.
    ///
    /// The new stage must have the same number of input channels as the last stage has output
    /// channels.
    ///
    /// # Examples
    /// ```
    /// # use iccsynth::pipeline::*;
    /// let mut pipeline = Pipeline::new();
    ///
    /// // this stage has 1 input and 3 outputs.
    /// // an empty pipeline accepts any number of channels
    /// pipeline.append_stage(PipelineStage::new_matrix(
    ///     3,
    ///     vec![1., 2., 3.],
    ///     None,
    /// )).unwrap();
    ///
    /// // the pipeline now has 3 outputs
    /// assert_eq!(pipeline.output_channels(), 3);
    ///
    /// // this stage has 3 inputs and 1 output.
    /// pipeline.append_stage(PipelineStage::new_matrix(
    ///     1,
    ///     vec![1., 2., 3.],
    ///     None,
    /// )).unwrap();
    ///
    /// // this stage as 2 inputs and 2 outputs and cannot be added to this pipeline
    /// pipeline.append_stage(PipelineStage::new_identity(2)).unwrap_err();
    /// ```
    pub fn append_stage(&mut self, stage: PipelineStage) -> Result<(), PipelineError> {
        let prev_output = self.output_channels();
        let stage_input = stage.input_channels();

        if !self.stages.is_empty() && prev_output != stage_input {
            return Err(PipelineError::ChannelMismatch(prev_output, stage_input));
        }

        self.stages.push(stage);
        self.update_channels();

        Ok(())
    }

    /// Evaluates the pipeline for a single color.
    ///
    /// The input and output arrays should be appropriately sized:
    ///
    /// - input should be at least input_channels in size
    /// - output should be at least output_channels in size
    pub fn transform(&self, input: &[f64], output: &mut [f64]) {
        let mut phase = 0;
        let mut storage = [[0.; MAX_STAGE_CHANNELS], [0.; MAX_STAGE_CHANNELS]];

        storage[phase][..self.input_channels].copy_from_slice(&input[..self.input_channels]);

        for stage in &self.stages {
            let next_phase = phase ^ 1;

            let (a, b) = storage.split_at_mut(1);
            let (src_value, dest_value) = if next_phase == 0 { (b, a) } else { (a, b) };
            stage.transform(&src_value[0], &mut dest_value[0]);

            phase = next_phase;
        }

        output[..self.output_channels].copy_from_slice(&storage[phase][..self.output_channels]);
    }

    /// Evaluates the pipeline on 16-bit values.
    pub fn transform_16(&self, input: &[u16], output: &mut [u16]) {
        let mut float_in = [0.; MAX_STAGE_CHANNELS];
        let mut float_out = [0.; MAX_STAGE_CHANNELS];

        for (f, i) in float_in.iter_mut().zip(&input[..self.input_channels]) {
            *f = *i as f64 / 65535.;
        }
        self.transform(&float_in, &mut float_out);
        for (o, f) in output[..self.output_channels].iter_mut().zip(&float_out) {
            *o = quick_saturate_word(*f * 65535.);
        }
    }

    /// Attempts to (destructively) optimize this pipeline by merging and eliminating unnecessary
    /// stages.
    ///
    /// Adjacent matrices are multiplied, adjacent curve sets composed and XYZ/Lab conversion
    /// pairs cancelled until nothing changes. Stages with no effect are then dropped. An
    /// optimized pipeline may end up with no stages at all; it keeps its channel counts.
    ///
    /// Note that performing this action may resample tone curves. This will reduce the domain in
    /// which they are defined to a potentially smaller one.
    pub fn optimize(&mut self) {
        loop {
            let mut changed = false;

            let mut i = 0;
            while i + 1 < self.stages.len() {
                let (left, right) = self.stages.split_at_mut(i + 1);
                if left[i].merge_with(&right[0]) {
                    self.stages.remove(i + 1);
                    changed = true;
                } else {
                    i += 1;
                }
            }

            let before = self.stages.len();
            self.stages.retain(|stage| !stage.is_identity());
            changed |= self.stages.len() != before;

            if !changed {
                break;
            }
        }

        self.update_channels();
    }

    /// Replaces every stage with a single lookup table sampled from the current pipeline.
    ///
    /// `points` is the number of grid points along each input axis.
    pub fn resample_into_clut(&mut self, points: usize) -> Result<(), GridError> {
        let grid = Grid::sample_uniform(
            points,
            self.input_channels,
            self.output_channels,
            |input, output| {
                self.transform_16(input, output);
                true
            },
        )?;

        self.stages = vec![PipelineStage::new_clut(grid)];
        Ok(())
    }
}

/// Pipeline errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// Output (0) and input (1) channels do not match.
    #[error("pipeline channel mismatch: {0} output channels feeding into {1} input channels")]
    ChannelMismatch(usize, usize),
}

#[cfg(test)]
fn rgb_test_pipeline() -> Pipeline {
    let mut pipeline = Pipeline::new();
    pipeline
        .append_stage(PipelineStage::new_curve_set(vec![ToneCurve::new_gamma(2.2); 3]))
        .unwrap();
    pipeline
        .append_stage(PipelineStage::new_matrix(
            3,
            vec![0.5, 0.2, 0.1, 0.3, 0.6, 0.1, 0.1, 0.1, 0.8],
            None,
        ))
        .unwrap();
    pipeline
        .append_stage(PipelineStage::new_curve_set(vec![ToneCurve::new_gamma(1. / 2.2); 3]))
        .unwrap();
    pipeline
}

#[test]
fn optimize_preserves_results() {
    let mut pipeline = rgb_test_pipeline();
    pipeline
        .append_stage(PipelineStage::new_matrix(
            3,
            vec![1., 0., 0., 0., 1., 0., 0., 0., 1.],
            None,
        ))
        .unwrap();
    pipeline.append_stage(PipelineStage::new_xyz_to_lab()).unwrap();
    pipeline.append_stage(PipelineStage::new_lab_to_xyz()).unwrap();

    let mut optimized = pipeline.clone();
    optimized.optimize();

    let types: Vec<_> = optimized.stage_types().collect();
    assert_eq!(
        types,
        [StageType::CurveSet, StageType::Matrix, StageType::CurveSet]
    );

    let color = [0.1, 0.4, 0.7];
    let mut a = [0.; 3];
    let mut b = [0.; 3];
    pipeline.transform(&color, &mut a);
    optimized.transform(&color, &mut b);
    for i in 0..3 {
        assert!((a[i] - b[i]).abs() < 1e-5);
    }
}

#[test]
fn fully_optimized_pipeline_keeps_channels() {
    let mut pipeline = Pipeline::new();
    pipeline
        .append_stage(PipelineStage::new_ident_curve_set(4))
        .unwrap();
    pipeline
        .append_stage(PipelineStage::new_ident_curve_set(4))
        .unwrap();
    pipeline.optimize();

    assert!(pipeline.stages().is_empty());
    assert_eq!(pipeline.input_channels(), 4);
    assert_eq!(pipeline.output_channels(), 4);

    let mut out = [0.; 4];
    pipeline.transform(&[0.1, 0.2, 0.3, 0.4], &mut out);
    assert_eq!(out, [0.1, 0.2, 0.3, 0.4]);
}

#[test]
fn resampling_approximates_pipeline() {
    let mut pipeline = rgb_test_pipeline();
    let original = pipeline.clone();
    pipeline.resample_into_clut(33).unwrap();

    assert_eq!(pipeline.stages().len(), 1);
    assert_eq!(pipeline.stages()[0].ty, StageType::CLut);

    let color = [0.25, 0.5, 0.75];
    let mut a = [0.; 3];
    let mut b = [0.; 3];
    original.transform(&color, &mut a);
    pipeline.transform(&color, &mut b);
    for i in 0..3 {
        assert!((a[i] - b[i]).abs() < 1e-2);
    }
}

#[test]
fn lab_v2_to_v4_curves() {
    let stage = PipelineStage::new_labv2_to_v4_curves();
    assert_eq!(stage.ty, StageType::LabV2toV4);

    // L* = 100 in the V2 encoding is 0xFF00
    let mut out = [0.; 3];
    stage.transform(&[65280. / 65535., 0., 0.5], &mut out);
    assert!((out[0] - 1.).abs() < 1e-6);
    assert_eq!(out[1], 0.);
}

#[test]
fn named_color_lookup() {
    let mut list = NamedColorList::new(2, "", "");
    list.push("first", [1000, 2000, 3000], &[10, 20]);
    list.push("second", [4000, 5000, 6000], &[30, 40]);

    let pcs = PipelineStage::new_named_color(list.clone(), true);
    let device = PipelineStage::new_named_color(list, false);
    assert_eq!(pcs.output_channels(), 3);
    assert_eq!(device.output_channels(), 2);

    let mut out = [0.; 3];
    device.transform(&[1. / 65535.], &mut out);
    assert_eq!(quick_saturate_word(out[0] * 65535.), 30);
    assert_eq!(quick_saturate_word(out[1] * 65535.), 40);

    pcs.transform(&[5. / 65535.], &mut out);
    assert_eq!(out, [0.; 3]);
}
