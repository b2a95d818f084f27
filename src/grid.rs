//! Multi-dimensional lookup tables filled from a sampling callback.

use crate::pipeline::MAX_STAGE_CHANNELS;
use crate::util::quantize_val;
use thiserror::Error;
use tracing::trace;

/// Maximum number of input dimensions of a grid.
pub const MAX_INPUT_DIMENSIONS: usize = 15;

/// Maximum number of points along a single grid axis.
pub const MAX_GRID_POINTS: usize = 255;

/// Grid construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GridError {
    /// The requested shape is not a legal grid.
    #[error("invalid grid dimensions: {0}")]
    InvalidDimensions(&'static str),

    /// The table would not fit in memory.
    #[error("cannot allocate a grid of {points} points with {channels} output channels")]
    Allocation { points: usize, channels: usize },

    /// The sampling callback reported failure.
    #[error("sampler aborted at lattice point {index}")]
    Aborted { index: usize },
}

/// A dense N-dimensional lookup table of 16-bit samples.
///
/// Points are stored in row-major order: the last input axis varies fastest, and every point
/// holds `output_channels` consecutive samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    dimensions: Vec<usize>,
    output_channels: usize,
    table: Vec<u16>,
}

impl Grid {
    /// Fills a new grid by calling `sampler` once for every lattice point.
    ///
    /// `dimensions` holds the number of points along each input axis; the number of input
    /// channels is its length. The sampler receives the quantized input coordinates
    /// (`0..=0xFFFF` per channel) and writes `output_channels` values. Returning `false` aborts
    /// sampling and discards everything produced so far.
    ///
    /// # Examples
    /// ```
    /// # use iccsynth::grid::Grid;
    /// // a 2-point identity table for three channels
    /// let grid = Grid::sample(&[2, 2, 2], 3, |input, output| {
    ///     output.copy_from_slice(input);
    ///     true
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(grid.table().len(), 8 * 3);
    /// assert_eq!(&grid.table()[3..6], &[0, 0, 0xFFFF]);
    /// ```
    pub fn sample<F>(
        dimensions: &[usize],
        output_channels: usize,
        sampler: F,
    ) -> Result<Grid, GridError>
    where
        F: Fn(&[u16], &mut [u16]) -> bool,
    {
        let input_channels = dimensions.len();
        if input_channels == 0 || input_channels > MAX_INPUT_DIMENSIONS {
            return Err(GridError::InvalidDimensions("input channel count out of range"));
        }
        if output_channels == 0 || output_channels > MAX_STAGE_CHANNELS {
            return Err(GridError::InvalidDimensions("output channel count out of range"));
        }
        if dimensions.iter().any(|&d| d < 2 || d > MAX_GRID_POINTS) {
            return Err(GridError::InvalidDimensions("axis point count out of range"));
        }

        let points = dimensions
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or(GridError::Allocation {
                points: usize::MAX,
                channels: output_channels,
            })?;
        let len = points
            .checked_mul(output_channels)
            .ok_or(GridError::Allocation {
                points,
                channels: output_channels,
            })?;

        let mut table = Vec::new();
        table
            .try_reserve_exact(len)
            .map_err(|_| GridError::Allocation {
                points,
                channels: output_channels,
            })?;

        trace!(points, input_channels, output_channels, "sampling grid");

        let mut input = [0u16; MAX_INPUT_DIMENSIONS];
        let mut output = [0u16; MAX_STAGE_CHANNELS];

        for index in 0..points {
            let mut rest = index;
            for axis in (0..input_channels).rev() {
                let size = dimensions[axis];
                input[axis] = quantize_val(rest % size, size);
                rest /= size;
            }

            if !sampler(&input[..input_channels], &mut output[..output_channels]) {
                return Err(GridError::Aborted { index });
            }
            table.extend_from_slice(&output[..output_channels]);
        }

        Ok(Grid {
            dimensions: dimensions.to_vec(),
            output_channels,
            table,
        })
    }

    /// Convenience for grids with the same number of points along every axis.
    pub fn sample_uniform<F>(
        points: usize,
        input_channels: usize,
        output_channels: usize,
        sampler: F,
    ) -> Result<Grid, GridError>
    where
        F: Fn(&[u16], &mut [u16]) -> bool,
    {
        if input_channels > MAX_INPUT_DIMENSIONS {
            return Err(GridError::InvalidDimensions("input channel count out of range"));
        }
        let dimensions = [points; MAX_INPUT_DIMENSIONS];
        Self::sample(&dimensions[..input_channels], output_channels, sampler)
    }

    /// Points along each input axis.
    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    pub fn input_channels(&self) -> usize {
        self.dimensions.len()
    }

    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    /// The raw samples.
    pub fn table(&self) -> &[u16] {
        &self.table
    }

    /// Evaluates the grid with multilinear interpolation.
    ///
    /// Inputs and outputs are in 0..1; inputs outside that range are clamped.
    pub fn eval(&self, input: &[f64], output: &mut [f64]) {
        let n = self.dimensions.len();

        let mut base = [0usize; MAX_INPUT_DIMENSIONS];
        let mut frac = [0f64; MAX_INPUT_DIMENSIONS];
        let mut stride = [0usize; MAX_INPUT_DIMENSIONS];

        let mut unit = 1;
        for axis in (0..n).rev() {
            let size = self.dimensions[axis];
            let x = input[axis];
            let x = if x.is_nan() { 0. } else { x.max(0.).min(1.) };
            let pos = x * (size - 1) as f64;
            let lower = (pos.floor() as usize).min(size - 2);
            base[axis] = lower;
            frac[axis] = pos - lower as f64;
            stride[axis] = unit;
            unit *= size;
        }

        for value in output[..self.output_channels].iter_mut() {
            *value = 0.;
        }

        for corner in 0..(1usize << n) {
            let mut weight = 1.;
            let mut offset = 0;
            for axis in 0..n {
                let upper = corner & (1 << axis) != 0;
                let f = frac[axis];
                weight *= if upper { f } else { 1. - f };
                offset += (base[axis] + upper as usize) * stride[axis];
            }
            if weight == 0. {
                continue;
            }

            let point = &self.table[offset * self.output_channels..][..self.output_channels];
            for (value, sample) in output.iter_mut().zip(point) {
                *value += weight * *sample as f64 / 65535.;
            }
        }
    }
}

#[test]
fn last_axis_varies_fastest() {
    let grid = Grid::sample(&[2, 3], 2, |input, output| {
        output.copy_from_slice(input);
        true
    })
    .unwrap();

    assert_eq!(
        grid.table(),
        &[
            0, 0, 0, 0x8000, 0, 0xFFFF, //
            0xFFFF, 0, 0xFFFF, 0x8000, 0xFFFF, 0xFFFF,
        ]
    );
}

#[test]
fn sampling_is_deterministic() {
    let sampler = |input: &[u16], output: &mut [u16]| {
        output[0] = input[0] / 2 + input[1] / 3;
        true
    };
    let a = Grid::sample_uniform(9, 2, 1, sampler).unwrap();
    let b = Grid::sample_uniform(9, 2, 1, sampler).unwrap();
    assert_eq!(a, b);
}

#[test]
fn aborting_sampler() {
    let result = Grid::sample_uniform(3, 2, 1, |input, output| {
        output[0] = 0;
        input[0] == 0
    });
    assert_eq!(result, Err(GridError::Aborted { index: 3 }));
}

#[test]
fn invalid_shapes() {
    let ok = |_: &[u16], _: &mut [u16]| true;
    assert!(matches!(
        Grid::sample(&[1, 2], 1, ok),
        Err(GridError::InvalidDimensions(_))
    ));
    assert!(matches!(
        Grid::sample(&[256], 1, ok),
        Err(GridError::InvalidDimensions(_))
    ));
    assert!(matches!(
        Grid::sample(&[2; 16], 1, ok),
        Err(GridError::InvalidDimensions(_))
    ));
    assert!(matches!(
        Grid::sample(&[2], 33, ok),
        Err(GridError::InvalidDimensions(_))
    ));
    assert!(matches!(
        Grid::sample(&[255; 15], 32, ok),
        Err(GridError::Allocation { .. })
    ));
}

#[test]
fn eval_interpolates() {
    let grid = Grid::sample_uniform(2, 3, 3, |input, output| {
        output.copy_from_slice(input);
        true
    })
    .unwrap();

    let mut out = [0.; 3];
    grid.eval(&[0.3, 0.5, 1.], &mut out);
    assert!((out[0] - 0.3).abs() < 1e-9);
    assert!((out[1] - 0.5).abs() < 1e-9);
    assert!((out[2] - 1.).abs() < 1e-9);
}
