//! Reorientation and resizing of volumes to a fixed target shape.
//!
//! Rotation happens in the width-height plane about its center and keeps the
//! array shape, so for non-square planes the corners that rotate out of view
//! are dropped and the ones rotating in are filled with zeros. Samples that
//! fall between voxels are read from a cubic B-spline fitted to the plane.
//! Resizing is first order (linear) and maps the first and last voxel of
//! every axis onto the first and last voxel of the output, one axis at a time.

use nalgebra::{Matrix2, Vector2};
use ndarray::{s, Array3, ArrayViewMut1, Axis, Zip};
use std::cell::OnceCell;
use tracing::debug;

use crate::common::{NormalizedVolume, ResampledVolume, VolumeAxis};
use crate::config::{PreprocessConfig, TargetShape};
use crate::error::{PreprocessError, Result};

/// In-plane turn applied when `apply_fixed_reorientation` is set.
pub const FIXED_REORIENTATION_DEGREES: f64 = 90.0;

// sample coordinates this close to a voxel center are read exactly
const SNAP: f64 = 1e-9;

/// Per-axis scale between the current and the desired shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomFactors {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl ZoomFactors {
    pub fn get(&self, axis: VolumeAxis) -> f64 {
        match axis {
            VolumeAxis::Width => self.width,
            VolumeAxis::Height => self.height,
            VolumeAxis::Depth => self.depth,
        }
    }

    /// Shape obtained by scaling `current` with these factors.
    pub fn output_shape(&self, current: (usize, usize, usize)) -> TargetShape {
        let scale = |len: usize, axis| (len as f64 * self.get(axis)).round() as usize;
        TargetShape::new(
            scale(current.0, VolumeAxis::Width),
            scale(current.1, VolumeAxis::Height),
            scale(current.2, VolumeAxis::Depth),
        )
    }
}

/// Computes `desired / current` for every axis.
///
/// A factor above 1 grows that axis, below 1 shrinks it.
pub fn zoom_factors(current: (usize, usize, usize), target: TargetShape) -> Result<ZoomFactors> {
    let current = [current.0, current.1, current.2];
    let mut factors = [0.0; 3];
    for axis in VolumeAxis::ALL {
        let len = current[axis.to_usize()];
        if len == 0 {
            return Err(PreprocessError::ZeroExtent { axis });
        }
        factors[axis.to_usize()] = target.get(axis) as f64 / len as f64;
    }
    Ok(ZoomFactors {
        width: factors[0],
        height: factors[1],
        depth: factors[2],
    })
}

/// Reorients (optionally) and resizes a normalized volume to the configured shape.
pub fn resize_volume(
    volume: &NormalizedVolume,
    config: &PreprocessConfig,
) -> Result<ResampledVolume> {
    let target = config.validate()?;
    let factors = zoom_factors(volume.dim(), target)?;
    debug!(?factors, input = ?volume.dim(), "resizing volume");

    let mut img = volume.mapv(f64::from);
    if config.apply_fixed_reorientation {
        img = rotate_in_plane(&img, FIXED_REORIENTATION_DEGREES);
    }
    // lengths are derived from the factors by rounding `current * factor`,
    // which always lands on `target`
    let zoomed = zoom_linear(&img, factors.output_shape(volume.dim()));
    Ok(zoomed.mapv(|v| v as f32))
}

/// Rotates a volume by `angle_degrees` in the plane of its first two axes.
///
/// Output voxel `(i, j)` reads the input at `R * (i, j) + offset` with
/// `R = [[cos, sin], [-sin, cos]]`, where the offset keeps the plane center
/// fixed. Positions outside the input plane read 0.0. Positions between
/// voxels are interpolated with a cubic B-spline (mirror boundary), which
/// happens for a quarter turn whenever width and height differ by an odd
/// number. Multiples of 90 degrees use exact trig, so a quarter turn of a
/// square plane is a pure index permutation: `out[i, j] = in[j, n - 1 - i]`.
pub fn rotate_in_plane(volume: &Array3<f64>, angle_degrees: f64) -> Array3<f64> {
    let (width, height, depth) = volume.dim();
    let (cos, sin) = exact_cos_sin(angle_degrees);
    let rotation = Matrix2::new(cos, sin, -sin, cos);
    let center = Vector2::new((width as f64 - 1.0) / 2.0, (height as f64 - 1.0) / 2.0);
    let offset = center - rotation * center;
    // only built once a sample lands between voxels
    let coefficients = OnceCell::new();

    let mut rotated = Array3::zeros((width, height, depth));
    for i in 0..width {
        for j in 0..height {
            let src = rotation * Vector2::new(i as f64, j as f64) + offset;
            let (x, y) = match (
                SplineSample::within(src.x, width),
                SplineSample::within(src.y, height),
            ) {
                (Some(x), Some(y)) => (x, y),
                // outside the source plane
                _ => continue,
            };
            let mut lane = rotated.slice_mut(s![i, j, ..]);
            if x.is_knot() && y.is_knot() {
                lane.assign(&volume.slice(s![x.floor, y.floor, ..]));
                continue;
            }
            let spline: &Array3<f64> = coefficients.get_or_init(|| spline_coefficients(volume));
            let (xs, wx) = x.taps();
            let (ys, wy) = y.taps();
            for (&xi, &wxi) in xs.iter().zip(&wx) {
                for (&yi, &wyi) in ys.iter().zip(&wy) {
                    let weight = wxi * wyi;
                    if weight != 0.0 {
                        lane.scaled_add(weight, &spline.slice(s![xi, yi, ..]));
                    }
                }
            }
        }
    }
    rotated
}

/// Resizes a volume to `target` with linear interpolation along each axis.
///
/// Every axis of `volume` must be non-empty; [`zoom_factors`] checks this.
pub fn zoom_linear(volume: &Array3<f64>, target: TargetShape) -> Array3<f64> {
    VolumeAxis::ALL
        .iter()
        .fold(volume.to_owned(), |img, &axis| {
            let len = target.get(axis);
            if img.len_of(axis.axis()) == len {
                img
            } else {
                zoom_axis(&img, axis.axis(), len)
            }
        })
}

fn zoom_axis(volume: &Array3<f64>, axis: Axis, len: usize) -> Array3<f64> {
    let mut shape = volume.raw_dim();
    shape[axis.index()] = len;
    let mut zoomed = Array3::zeros(shape);
    for (index, sample) in grid_samples(volume.len_of(axis), len).into_iter().enumerate() {
        let lower = volume.index_axis(axis, sample.lower);
        let mut out = zoomed.index_axis_mut(axis, index);
        if sample.weight == 0.0 {
            out.assign(&lower);
        } else {
            let upper = volume.index_axis(axis, sample.upper);
            let w = sample.weight;
            Zip::from(&mut out)
                .and(&lower)
                .and(&upper)
                .for_each(|o, &lo, &hi| *o = lo + (hi - lo) * w);
        }
    }
    zoomed
}

/// Sample positions that align the end points of an input and output axis.
fn grid_samples(len_in: usize, len_out: usize) -> Vec<LinearSample> {
    let step = if len_out > 1 {
        (len_in as f64 - 1.0) / (len_out as f64 - 1.0)
    } else {
        0.0
    };
    (0..len_out)
        .map(|o| LinearSample::at(o as f64 * step, len_in))
        .collect()
}

fn exact_cos_sin(degrees: f64) -> (f64, f64) {
    let quarter_turns = degrees / 90.0;
    if quarter_turns.fract() == 0.0 {
        match (quarter_turns as i64).rem_euclid(4) {
            0 => (1.0, 0.0),
            1 => (0.0, 1.0),
            2 => (-1.0, 0.0),
            _ => (0.0, -1.0),
        }
    } else {
        let radians = degrees.to_radians();
        (radians.cos(), radians.sin())
    }
}

/// Two neighbouring voxels along one axis and the weight of the upper one.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LinearSample {
    lower: usize,
    upper: usize,
    weight: f64,
}

impl LinearSample {
    /// `coord` must lie in `[0, len - 1]` up to rounding, and `len` must be positive.
    fn at(coord: f64, len: usize) -> Self {
        let last = (len - 1) as f64;
        let coord = coord.clamp(0.0, last);
        let floor = coord.floor();
        let weight = coord - floor;
        let lower = floor as usize;
        if weight < SNAP {
            Self {
                lower,
                upper: lower,
                weight: 0.0,
            }
        } else if weight > 1.0 - SNAP {
            Self {
                lower: lower + 1,
                upper: lower + 1,
                weight: 0.0,
            }
        } else {
            Self {
                lower,
                upper: lower + 1,
                weight,
            }
        }
    }
}

// pole of the cubic B-spline interpolation filter
const SPLINE_POLE: f64 = -0.267_949_192_431_122_7; // sqrt(3) - 2

/// Cubic B-spline coefficients of every width-height plane of `volume`.
///
/// Evaluating the spline on these coefficients at a voxel center gives back
/// the voxel value. The depth axis is never sampled between voxels, so it is
/// left unfiltered.
fn spline_coefficients(volume: &Array3<f64>) -> Array3<f64> {
    let mut coefficients = volume.to_owned();
    for axis in [VolumeAxis::Width, VolumeAxis::Height] {
        for mut lane in coefficients.lanes_mut(axis.axis()) {
            spline_prefilter(&mut lane);
        }
    }
    coefficients
}

/// In-place recursive cubic B-spline prefilter with mirror-symmetric boundaries.
fn spline_prefilter(c: &mut ArrayViewMut1<f64>) {
    let n = c.len();
    if n < 2 {
        return;
    }
    let z = SPLINE_POLE;
    let gain = (1.0 - z) * (1.0 - 1.0 / z);
    c.mapv_inplace(|v| v * gain);

    // causal initialisation, mirror boundary
    let z_last = z.powi(n as i32 - 1);
    let mut z_i = z;
    let mut first = c[0] + z_last * c[n - 1];
    for i in 1..n - 1 {
        first += z_i * (c[i] + z_last * c[n - 1 - i]);
        z_i *= z;
    }
    c[0] = first / (1.0 - z_last * z_last);
    for i in 1..n {
        let previous = c[i - 1];
        c[i] += z * previous;
    }

    // anti-causal initialisation, mirror boundary
    let last = (z * c[n - 2] + c[n - 1]) * z / (z * z - 1.0);
    c[n - 1] = last;
    for i in (0..n - 1).rev() {
        let next = c[i + 1];
        let current = c[i];
        c[i] = z * (next - current);
    }
}

/// A position along one axis, split into the voxel below it and the fraction past it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SplineSample {
    floor: usize,
    fraction: f64,
    len: usize,
}

impl SplineSample {
    /// `None` when `coord` lies outside `[0, len - 1]`.
    fn within(coord: f64, len: usize) -> Option<Self> {
        if len == 0 || coord < -SNAP || coord > (len - 1) as f64 + SNAP {
            return None;
        }
        let rounded = coord.round();
        let coord = if (coord - rounded).abs() < SNAP {
            rounded
        } else {
            coord
        };
        let coord = coord.clamp(0.0, (len - 1) as f64);
        let floor = coord.floor();
        Some(Self {
            floor: floor as usize,
            fraction: coord - floor,
            len,
        })
    }

    fn is_knot(&self) -> bool {
        self.fraction == 0.0
    }

    /// The four coefficients around the sample, mirrored at the edges, and their weights.
    fn taps(&self) -> ([usize; 4], [f64; 4]) {
        let t = self.fraction;
        let u = 1.0 - t;
        let weights = [
            u * u * u / 6.0,
            (4.0 - 6.0 * t * t + 3.0 * t * t * t) / 6.0,
            (1.0 + 3.0 * t + 3.0 * t * t - 3.0 * t * t * t) / 6.0,
            t * t * t / 6.0,
        ];
        let start = self.floor as isize - 1;
        let indices = [0, 1, 2, 3].map(|k| mirror_index(start + k, self.len));
        (indices, weights)
    }
}

fn mirror_index(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let folded = index.rem_euclid(period);
    if folded >= len as isize {
        (period - folded) as usize
    } else {
        folded as usize
    }
}
