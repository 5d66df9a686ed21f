//! Accelerator backends for multi-pass convolution.
//!
//! An [`Accelerator`] takes over a whole run, `(image, kernel, repeats) -> image`, and must
//! produce the same result as [`crate::parallel::convolve_passes`]. The engine never depends
//! on a specific backend; callers opt into one explicitly.

use rayon::prelude::*;
use thiserror::Error;

use pixconv_image::{Image, ImageError};

use crate::filter::{convolve_band, Kernel, Region};

/// Errors reported by an accelerator backend.
#[derive(Error, Debug, PartialEq)]
pub enum AcceleratorError {
    /// The backend could not be initialized.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The requested repeat count is invalid.
    #[error("repeat count must be > 0, got {0}")]
    InvalidRepeatCount(usize),

    /// An image could not be allocated or addressed.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// A backend able to run a whole multi-pass convolution on its own hardware.
pub trait Accelerator: Send + Sync {
    /// A short name for logs.
    fn name(&self) -> &str;

    /// Apply `kernel` to `src` `repeats` times and return the result.
    ///
    /// # Errors
    ///
    /// Returns [`AcceleratorError::InvalidRepeatCount`] if `repeats` is zero, or a
    /// backend specific error.
    fn apply(
        &self,
        src: &Image<u8, 3>,
        kernel: &Kernel,
        repeats: usize,
    ) -> Result<Image<u8, 3>, AcceleratorError>;
}

/// A CPU backend running every pass row-parallel on a rayon thread pool.
///
/// With no thread count the global rayon pool is used. With a thread count a local pool is
/// built on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RayonAccelerator {
    num_threads: Option<usize>,
}

impl RayonAccelerator {
    /// A backend running on the global rayon pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend running on a dedicated pool of `num_threads` threads.
    pub fn with_num_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }

    /// Apply `kernel` to `src` `repeats` times for any channel count.
    pub fn apply_passes<const C: usize>(
        &self,
        src: &Image<u8, C>,
        kernel: &Kernel,
        repeats: usize,
    ) -> Result<Image<u8, C>, AcceleratorError> {
        if repeats == 0 {
            return Err(AcceleratorError::InvalidRepeatCount(repeats));
        }

        let run = || -> Result<Image<u8, C>, AcceleratorError> {
            let mut working = Image::like(src)?;
            working.as_slice_mut().copy_from_slice(src.as_slice());
            let mut scratch = Image::like(src)?;

            for _ in 0..repeats {
                par_convolve_rows(&working, kernel, &mut scratch)?;
                std::mem::swap(&mut working, &mut scratch);
            }
            Ok(working)
        };

        match self.num_threads {
            None => run(),
            Some(0) => Err(AcceleratorError::InvalidThreadCount(0)),
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| AcceleratorError::BuildError(e.to_string()))?;
                pool.install(run)
            }
        }
    }
}

impl Accelerator for RayonAccelerator {
    fn name(&self) -> &str {
        "rayon"
    }

    fn apply(
        &self,
        src: &Image<u8, 3>,
        kernel: &Kernel,
        repeats: usize,
    ) -> Result<Image<u8, 3>, AcceleratorError> {
        self.apply_passes(src, kernel, repeats)
    }
}

/// One pass with every output row computed as an independent rayon task.
fn par_convolve_rows<const C: usize>(
    src: &Image<u8, C>,
    kernel: &Kernel,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    let size = src.size();
    let row_stride = src.row_stride();
    if row_stride == 0 {
        return Ok(());
    }

    dst.as_slice_mut()
        .par_chunks_mut(row_stride)
        .enumerate()
        .try_for_each(|(y, dst_row)| {
            convolve_band::<_, C>(src, kernel, Region::rows(size, y, y + 1), dst_row)
        })
}
