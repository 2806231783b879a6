use ndarray::{Array3, Array4, Axis};
use nifti::NiftiHeader;
use std::fmt;

/// Raw intensities as read from disk, axes (width, height, depth).
pub type Volume = Array3<f64>;
/// Min-max scaled intensities, same shape as the source volume.
pub type NormalizedVolume = Array3<f32>;
/// A normalized volume resampled to the configured target shape.
pub type ResampledVolume = Array3<f32>;
/// Network input: the resampled volume with a trailing channel axis of length 1.
pub type ProcessedVolume = Array4<f32>;

// set up enums and structs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeAxis {
    Width,
    Height,
    Depth,
}

impl VolumeAxis {
    pub const ALL: [VolumeAxis; 3] = [VolumeAxis::Width, VolumeAxis::Height, VolumeAxis::Depth];

    pub fn to_usize(&self) -> usize {
        match self {
            VolumeAxis::Width => 0,
            VolumeAxis::Height => 1,
            VolumeAxis::Depth => 2,
        }
    }

    pub fn axis(&self) -> Axis {
        Axis(self.to_usize())
    }
}

impl fmt::Display for VolumeAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeAxis::Width => write!(f, "width"),
            VolumeAxis::Height => write!(f, "height"),
            VolumeAxis::Depth => write!(f, "depth"),
        }
    }
}

/// A loaded scan: the header it came with and its voxel data.
#[derive(Debug)]
pub struct Scan {
    pub header: NiftiHeader,
    pub volume: Volume,
}

impl Scan {
    pub fn new(header: NiftiHeader, volume: Volume) -> Self {
        Self { header, volume }
    }
}
