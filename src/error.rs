use std::path::PathBuf;

use nifti::error::NiftiError;
use thiserror::Error;

use crate::common::VolumeAxis;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid nifti volume: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: NiftiError,
    },

    #[error("expected a 3D volume, found {ndim} dimensions. Tip: You can use a utility like `fslsplit` to split a 4D file into 3D files.")]
    NotVolumetric { ndim: usize },

    #[error("cannot normalize an empty volume")]
    EmptyVolume,

    #[error("cannot compute a zoom factor for the {axis} axis: it has length zero")]
    ZeroExtent { axis: VolumeAxis },

    #[error("target size for the {axis} axis must be positive")]
    InvalidTarget { axis: VolumeAxis },

    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, PreprocessError>;
