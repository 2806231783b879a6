//! Target geometry for the resampling stage.

use crate::common::VolumeAxis;
use crate::error::{PreprocessError, Result};

pub const DEFAULT_WIDTH: usize = 128;
pub const DEFAULT_HEIGHT: usize = 128;
pub const DEFAULT_DEPTH: usize = 64;

/// Output dimensions in (width, height, depth) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetShape {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl TargetShape {
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn get(&self, axis: VolumeAxis) -> usize {
        match axis {
            VolumeAxis::Width => self.width,
            VolumeAxis::Height => self.height,
            VolumeAxis::Depth => self.depth,
        }
    }

    pub fn as_array(&self) -> [usize; 3] {
        [self.width, self.height, self.depth]
    }
}

/// Settings for a single run of the pipeline.
///
/// `apply_fixed_reorientation` turns the source volume 90 degrees in its
/// width-height plane before resizing. The default matches scans stored with
/// the in-plane axes swapped relative to what the model was trained on; turn
/// it off for data that is already in the expected orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessConfig {
    pub desired_width: usize,
    pub desired_height: usize,
    pub desired_depth: usize,
    pub apply_fixed_reorientation: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            desired_width: DEFAULT_WIDTH,
            desired_height: DEFAULT_HEIGHT,
            desired_depth: DEFAULT_DEPTH,
            apply_fixed_reorientation: true,
        }
    }
}

impl PreprocessConfig {
    pub fn new(desired_width: usize, desired_height: usize, desired_depth: usize) -> Self {
        Self {
            desired_width,
            desired_height,
            desired_depth,
            ..Self::default()
        }
    }

    pub fn with_reorientation(mut self, apply: bool) -> Self {
        self.apply_fixed_reorientation = apply;
        self
    }

    pub fn target_shape(&self) -> TargetShape {
        TargetShape::new(self.desired_width, self.desired_height, self.desired_depth)
    }

    /// Checks that every target dimension is positive.
    pub fn validate(&self) -> Result<TargetShape> {
        let target = self.target_shape();
        for axis in VolumeAxis::ALL {
            if target.get(axis) == 0 {
                return Err(PreprocessError::InvalidTarget { axis });
            }
        }
        Ok(target)
    }
}
