use ndarray::Axis;

use crate::common::{ProcessedVolume, ResampledVolume};

/// Appends a trailing channel axis of length 1: `(w, h, d)` becomes `(w, h, d, 1)`.
pub fn add_channel_axis(volume: ResampledVolume) -> ProcessedVolume {
    volume.insert_axis(Axis(3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn appends_single_trailing_axis() {
        let volume = Array3::from_shape_fn((3, 4, 5), |(i, j, k)| (i * 100 + j * 10 + k) as f32);
        let expanded = add_channel_axis(volume.clone());
        assert_eq!(expanded.shape(), &[3, 4, 5, 1]);
        for ((i, j, k), &v) in volume.indexed_iter() {
            assert_eq!(expanded[[i, j, k, 0]], v);
        }
    }

    #[test]
    fn empty_volume_keeps_its_shape() {
        let expanded = add_channel_axis(Array3::zeros((0, 2, 2)));
        assert_eq!(expanded.shape(), &[0, 2, 2, 1]);
    }
}
