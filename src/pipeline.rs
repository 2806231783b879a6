use std::path::Path;
use tracing::{debug, info, instrument};

use crate::channel::add_channel_axis;
use crate::common::{ProcessedVolume, Volume};
use crate::config::PreprocessConfig;
use crate::error::Result;
use crate::loader::load_volume;
use crate::normalize::normalize;
use crate::resample::resize_volume;

/// Runs the full pipeline on one scan with the default target shape of (128, 128, 64).
pub fn process_scan<P: AsRef<Path>>(path: P) -> Result<ProcessedVolume> {
    process_scan_with(path, &PreprocessConfig::default())
}

/// Loads, normalizes, resizes and adds a channel axis to one scan.
///
/// The first failing stage aborts the run; its error is returned unchanged.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn process_scan_with<P: AsRef<Path>>(
    path: P,
    config: &PreprocessConfig,
) -> Result<ProcessedVolume> {
    let volume = load_volume(path.as_ref())?;
    info!(shape = ?volume.dim(), "loaded scan");
    process_volume(volume, config)
}

/// The in-memory part of the pipeline, for volumes that did not come from a file.
pub fn process_volume(volume: Volume, config: &PreprocessConfig) -> Result<ProcessedVolume> {
    let normalized = normalize(&volume)?;
    drop(volume);
    debug!("normalized intensities");
    let resized = resize_volume(&normalized, config)?;
    debug!(shape = ?resized.dim(), "resized volume");
    Ok(add_channel_axis(resized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PreprocessError;
    use ndarray::Array3;

    #[test]
    fn in_memory_pipeline_produces_channel_last_volume() {
        let volume = Array3::from_shape_fn((10, 12, 6), |(i, j, k)| (i + j + k) as f64);
        let processed = process_volume(volume, &PreprocessConfig::new(8, 8, 4)).unwrap();
        assert_eq!(processed.shape(), &[8, 8, 4, 1]);
        assert!(processed.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn stage_errors_abort_the_pipeline() {
        let err = process_volume(Volume::zeros((0, 3, 3)), &PreprocessConfig::default());
        assert!(matches!(err, Err(PreprocessError::EmptyVolume)));
    }
}
