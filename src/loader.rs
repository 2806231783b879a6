//! Reading nifti files into 3D intensity arrays.

use ndarray::{ArrayD, Axis, Ix3};
use nifti::error::NiftiError;
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use std::io;
use std::path::Path;
use tracing::debug;

use crate::common::{Scan, Volume};
use crate::error::{PreprocessError, Result};

/// Reads a nifti file and returns its header together with the voxel data.
///
/// Intensities are converted to `f64` with the header's slope and intercept
/// applied, as the nifti reader does by default. No reorientation happens
/// here: axes come out in the order they are stored in the file.
///
/// # Errors
///
/// * [`PreprocessError::Read`] if the file is missing or unreadable.
/// * [`PreprocessError::Format`] if it is not a valid nifti volume.
/// * [`PreprocessError::NotVolumetric`] if the image is not 3D.
pub fn read_scan<P: AsRef<Path>>(path: P) -> Result<Scan> {
    let path = path.as_ref();
    let obj = ReaderOptions::new()
        .read_file(path)
        .map_err(|e| classify_nifti_error(path, e))?;
    // gather header information before the object is consumed
    let header = obj.header().clone();
    debug!(
        path = %path.display(),
        dim = ?&header.dim[..],
        pixdim = ?&header.pixdim[1..4],
        "read nifti header"
    );
    let img = obj
        .into_volume()
        .into_ndarray::<f64>()
        .map_err(|e| classify_nifti_error(path, e))?;
    let volume = into_three_dims(img)?;
    Ok(Scan::new(header, volume))
}

/// Loads only the voxel data of a nifti file. See [`read_scan`].
pub fn load_volume<P: AsRef<Path>>(path: P) -> Result<Volume> {
    read_scan(path).map(|scan| scan.volume)
}

fn classify_nifti_error(path: &Path, err: NiftiError) -> PreprocessError {
    match err {
        // only failing to get at the file is a read error; io errors raised
        // while decoding (truncated header, bad gzip stream) mean a bad file
        NiftiError::Io(source)
            if matches!(
                source.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
            ) =>
        {
            PreprocessError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
        source => PreprocessError::Format {
            path: path.to_path_buf(),
            source,
        },
    }
}

/// Enforces 3D, dropping trailing axes of length 1 (e.g. a single-volume 4D file).
fn into_three_dims(img: ArrayD<f64>) -> Result<Volume> {
    let ndim = img.ndim();
    if ndim < 3 || img.shape()[3..].iter().any(|&len| len != 1) {
        return Err(PreprocessError::NotVolumetric { ndim });
    }
    let mut img = img;
    while img.ndim() > 3 {
        let last = img.ndim() - 1;
        img = img.index_axis_move(Axis(last), 0);
    }
    Ok(img.into_dimensionality::<Ix3>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn three_dims_pass_through() {
        let img = ArrayD::from_shape_fn(IxDyn(&[2, 3, 4]), |idx| idx[0] as f64 + idx[2] as f64);
        let vol = into_three_dims(img).unwrap();
        assert_eq!(vol.dim(), (2, 3, 4));
        assert_eq!(vol[[1, 2, 3]], 4.0);
    }

    #[test]
    fn trailing_singletons_are_squeezed() {
        let img = ArrayD::from_shape_fn(IxDyn(&[2, 3, 4, 1, 1]), |idx| idx[1] as f64);
        let vol = into_three_dims(img).unwrap();
        assert_eq!(vol.dim(), (2, 3, 4));
        assert_eq!(vol[[0, 2, 0]], 2.0);
    }

    #[test]
    fn time_series_is_rejected() {
        let img = ArrayD::<f64>::zeros(IxDyn(&[2, 3, 4, 5]));
        let err = into_three_dims(img).unwrap_err();
        assert!(matches!(err, PreprocessError::NotVolumetric { ndim: 4 }));
    }

    #[test]
    fn slices_are_rejected() {
        let img = ArrayD::<f64>::zeros(IxDyn(&[2, 3]));
        let err = into_three_dims(img).unwrap_err();
        assert!(matches!(err, PreprocessError::NotVolumetric { ndim: 2 }));
    }

    fn classify_io(kind: io::ErrorKind) -> PreprocessError {
        let err = NiftiError::Io(io::Error::new(kind, "test"));
        classify_nifti_error(Path::new("scan.nii.gz"), err)
    }

    #[test]
    fn access_failures_are_read_errors() {
        for kind in [io::ErrorKind::NotFound, io::ErrorKind::PermissionDenied] {
            assert!(matches!(classify_io(kind), PreprocessError::Read { .. }));
        }
    }

    #[test]
    fn decoding_failures_are_format_errors() {
        // flate2 reports a bad gzip header or stream as InvalidInput
        for kind in [
            io::ErrorKind::InvalidInput,
            io::ErrorKind::InvalidData,
            io::ErrorKind::UnexpectedEof,
        ] {
            assert!(matches!(classify_io(kind), PreprocessError::Format { .. }));
        }
    }
}
