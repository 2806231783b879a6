//! Preprocessing of nifti scans for volumetric (3D CNN) models.
//!
//! A scan goes through four stages, in order:
//!
//! 1. [`loader`]: read the nifti file into a 3D `f64` array.
//! 2. [`normalize`]: min-max scale intensities into `[0, 1]` as `f32`.
//! 3. [`resample`]: turn the volume 90 degrees in its width-height plane and
//!    resize it with linear interpolation to the target shape.
//! 4. [`channel`]: append a trailing channel axis of length 1.
//!
//! ```no_run
//! let volume = scanprep::process_scan("sub-01_T1w.nii.gz")?;
//! assert_eq!(volume.shape(), &[128, 128, 64, 1]);
//! # Ok::<(), scanprep::PreprocessError>(())
//! ```

pub mod channel;
pub mod common;
pub mod config;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod resample;

pub use common::{NormalizedVolume, ProcessedVolume, ResampledVolume, Scan, Volume, VolumeAxis};
pub use config::{PreprocessConfig, TargetShape};
pub use error::{PreprocessError, Result};
pub use pipeline::{process_scan, process_scan_with, process_volume};
