//! Min-max intensity scaling.

use tracing::warn;

use crate::common::{NormalizedVolume, Volume};
use crate::error::{PreprocessError, Result};

/// Global minimum and maximum of a volume, or `None` if it has no voxels.
///
/// A NaN voxel poisons both bounds.
pub fn intensity_range(volume: &Volume) -> Option<(f64, f64)> {
    let mut voxels = volume.iter();
    let first = *voxels.next()?;
    let range = voxels.fold((first, first), |(lo, hi), &v| {
        if lo.is_nan() || v.is_nan() {
            (f64::NAN, f64::NAN)
        } else {
            (lo.min(v), hi.max(v))
        }
    });
    Some(range)
}

/// Rescales intensities linearly so the minimum maps to 0.0 and the maximum to 1.0.
///
/// A constant volume has a zero divisor and comes back as all NaN. That is
/// left for the caller to detect; it is not treated as an error.
pub fn normalize(volume: &Volume) -> Result<NormalizedVolume> {
    let (min, max) = intensity_range(volume).ok_or(PreprocessError::EmptyVolume)?;
    let span = max - min;
    if span == 0.0 {
        warn!(value = min, "constant volume, normalized intensities will be NaN");
    }
    Ok(volume.mapv(|v| ((v - min) / span) as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, ArrayView3};

    fn bounds(volume: ArrayView3<f32>) -> (f32, f32) {
        volume
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    #[test]
    fn maps_extremes_to_unit_interval() {
        let volume = Array3::from_shape_fn((4, 5, 6), |(i, j, k)| {
            -300.0 + 17.5 * i as f64 + 3.0 * j as f64 - 2.0 * k as f64
        });
        let normalized = normalize(&volume).unwrap();
        assert_eq!(normalized.dim(), volume.dim());
        let (lo, hi) = bounds(normalized.view());
        assert_eq!(lo, 0.0);
        assert!((hi - 1.0).abs() < 1e-6);
    }

    #[test]
    fn preserves_relative_ordering() {
        let volume = Array3::from_shape_vec((1, 1, 3), vec![10.0, 20.0, 15.0]).unwrap();
        let normalized = normalize(&volume).unwrap();
        assert_eq!(normalized.as_slice().unwrap(), &[0.0, 1.0, 0.5]);
    }

    #[test]
    fn constant_volume_becomes_nan() {
        let volume = Array3::from_elem((3, 3, 3), 5.0);
        let normalized = normalize(&volume).unwrap();
        assert!(normalized.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn empty_volume_is_an_error() {
        let volume = Array3::<f64>::zeros((0, 4, 4));
        assert!(matches!(
            normalize(&volume),
            Err(PreprocessError::EmptyVolume)
        ));
    }

    #[test]
    fn nan_voxel_poisons_range() {
        let mut volume = Array3::from_shape_fn((2, 2, 2), |(i, _, _)| i as f64);
        volume[[1, 0, 1]] = f64::NAN;
        let (lo, hi) = intensity_range(&volume).unwrap();
        assert!(lo.is_nan() && hi.is_nan());
    }
}
