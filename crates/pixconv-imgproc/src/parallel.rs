use std::{
    ops::Range,
    sync::{
        atomic::{AtomicU8, Ordering},
        Barrier,
    },
    thread,
};

use thiserror::Error;

use pixconv_image::{Image, ImageError, ImageSize};

use crate::filter::{convolve, convolve_band, Kernel, Region, ZeroPaddedSource};

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The requested repeat count is invalid.
    #[error("repeat count must be > 0, got {0}")]
    InvalidRepeatCount(usize),

    /// A worker thread panicked before finishing its band.
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),

    /// An image could not be allocated or addressed.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Configuration of a multi-pass run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassConfig {
    /// Number of worker threads, one per band.
    pub threads: usize,
    /// Number of times the kernel is applied.
    pub repeats: usize,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            repeats: 1,
        }
    }
}

impl PassConfig {
    /// Set the number of worker threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the number of passes.
    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats;
        self
    }

    /// Check that both counts are positive.
    pub fn validate(&self) -> Result<(), ParallelError> {
        if self.threads == 0 {
            return Err(ParallelError::InvalidThreadCount(self.threads));
        }
        if self.repeats == 0 {
            return Err(ParallelError::InvalidRepeatCount(self.repeats));
        }
        Ok(())
    }
}

/// Rows owned by band `index` out of `threads` bands.
///
/// Each band spans `height / threads` rows; the last one absorbs the remainder.
///
/// # Examples
///
/// ```
/// use pixconv_imgproc::parallel::band_rows;
///
/// assert_eq!(band_rows(10, 3, 0), 0..3);
/// assert_eq!(band_rows(10, 3, 1), 3..6);
/// assert_eq!(band_rows(10, 3, 2), 6..10);
/// ```
pub fn band_rows(height: usize, threads: usize, index: usize) -> Range<usize> {
    let band_height = height / threads;
    let start = index * band_height;
    let end = if index + 1 == threads {
        height
    } else {
        (index + 1) * band_height
    };
    start..end
}

/// All the bands of an image of `height` rows split across `threads` workers.
pub fn partition_rows(height: usize, threads: usize) -> Vec<Range<usize>> {
    (0..threads)
        .map(|i| band_rows(height, threads, i))
        .collect()
}

/// Baseline single-threaded pass over the whole image.
pub fn convolve_single_thread<const C: usize>(
    src: &Image<u8, C>,
    kernel: &Kernel,
) -> Result<Image<u8, C>, ImageError> {
    convolve(src, kernel)
}

/// Apply a kernel once using `threads` workers over disjoint row bands.
///
/// Every worker reads the whole source, so halo rows cross band boundaries, and writes
/// only into its own mutable slice of the output rows.
///
/// # Errors
///
/// Returns [`ParallelError::InvalidThreadCount`] if `threads` is zero.
pub fn convolve_parallel<const C: usize>(
    src: &Image<u8, C>,
    kernel: &Kernel,
    threads: usize,
) -> Result<Image<u8, C>, ParallelError> {
    if threads == 0 {
        return Err(ParallelError::InvalidThreadCount(threads));
    }

    let size = src.size();
    let row_stride = src.row_stride();
    let mut dst = Image::like(src)?;

    // carve the output into one disjoint slice per band
    let mut bands = Vec::with_capacity(threads);
    let mut rest = dst.as_slice_mut();
    for rows in partition_rows(size.height, threads) {
        let (band, tail) = std::mem::take(&mut rest).split_at_mut(rows.len() * row_stride);
        bands.push((rows, band));
        rest = tail;
    }

    thread::scope(|s| {
        let handles = bands
            .into_iter()
            .map(|(rows, band)| {
                s.spawn(move || {
                    let region = Region::rows(size, rows.start, rows.end);
                    convolve_band::<_, C>(src, kernel, region, band)
                })
            })
            .collect::<Vec<_>>();

        join_workers(handles)
    })?;

    Ok(dst)
}

/// Join the workers of a scope in order, surfacing the first failure.
fn join_workers(
    handles: Vec<thread::ScopedJoinHandle<'_, Result<(), ImageError>>>,
) -> Result<(), ParallelError> {
    let mut result = Ok(());
    for (i, handle) in handles.into_iter().enumerate() {
        let outcome = match handle.join() {
            Ok(res) => res.map_err(ParallelError::from),
            Err(_) => Err(ParallelError::WorkerPanicked(i)),
        };
        if result.is_ok() {
            result = outcome;
        }
    }
    result
}

/// Working buffer shared by all the workers of a multi-pass run.
///
/// Samples are atomics so that every worker can read the whole canvas while each band
/// owner stores its own rows. The barriers of the run order those accesses.
struct SharedImage<const C: usize> {
    size: ImageSize,
    data: Vec<AtomicU8>,
}

impl<const C: usize> SharedImage<C> {
    fn from_image(image: &Image<u8, C>) -> Result<Self, ImageError> {
        let src = image.as_slice();
        let mut data = Vec::new();
        data.try_reserve_exact(src.len())
            .map_err(|_| ImageError::AllocationFailure(src.len()))?;
        data.extend(src.iter().map(|&v| AtomicU8::new(v)));

        Ok(Self {
            size: image.size(),
            data,
        })
    }

    fn store_rows(&self, rows: Range<usize>, values: &[u8]) {
        let row_stride = self.size.width * C;
        let band = &self.data[rows.start * row_stride..rows.end * row_stride];
        for (dst, &v) in band.iter().zip(values) {
            dst.store(v, Ordering::Relaxed);
        }
    }

    fn into_image(self) -> Result<Image<u8, C>, ImageError> {
        let data = self.data.into_iter().map(AtomicU8::into_inner).collect();
        Image::new(self.size, data)
    }
}

impl<const C: usize> ZeroPaddedSource<C> for SharedImage<C> {
    fn size(&self) -> ImageSize {
        self.size
    }

    fn sample(&self, x: isize, y: isize, c: isize) -> u8 {
        if x < 0
            || y < 0
            || c < 0
            || x as usize >= self.size.width
            || y as usize >= self.size.height
            || c as usize >= C
        {
            return 0;
        }

        let idx = (y as usize * self.size.width + x as usize) * C + c as usize;
        self.data[idx].load(Ordering::Relaxed)
    }
}

/// Apply a kernel `config.repeats` times, each pass split across `config.threads` workers.
///
/// The result equals `working = convolve(working, kernel)` applied `repeats` times. The
/// workers are spawned once for the whole run and joined before returning; `src` is copied
/// into a private working buffer and never modified.
///
/// Every worker loops over the passes as follows:
///
/// 1. compute its band from the working buffer into a private scratch buffer,
/// 2. wait until every worker finished computing,
/// 3. write its scratch back into its own rows of the working buffer,
/// 4. wait until every worker finished writing back, then start the next pass.
///
/// The second wait keeps a fast worker from reading halo rows of a neighbor that is still
/// writing back the previous pass.
///
/// # Errors
///
/// Returns [`ParallelError::InvalidThreadCount`] or [`ParallelError::InvalidRepeatCount`]
/// for a zero count, and [`ParallelError::Image`] if the working or scratch buffers cannot
/// be allocated. Buffers are allocated before any worker starts, so a failure leaves no
/// partial result behind.
pub fn convolve_passes<const C: usize>(
    src: &Image<u8, C>,
    kernel: &Kernel,
    config: PassConfig,
) -> Result<Image<u8, C>, ParallelError> {
    config.validate()?;

    let size = src.size();
    let row_stride = src.row_stride();
    let bands = partition_rows(size.height, config.threads);

    log::debug!(
        "running {} passes over {} with {} bands: {:?}",
        config.repeats,
        size,
        bands.len(),
        bands
    );

    let working = SharedImage::<C>::from_image(src)?;

    let mut scratch = Vec::with_capacity(bands.len());
    for rows in bands.iter() {
        let len = rows.len() * row_stride;
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| ImageError::AllocationFailure(len))?;
        buf.resize(len, 0u8);
        scratch.push(buf);
    }

    let barrier = Barrier::new(bands.len());

    thread::scope(|s| {
        let handles = bands
            .into_iter()
            .zip(scratch)
            .map(|(rows, mut scratch)| {
                let working = &working;
                let barrier = &barrier;
                s.spawn(move || -> Result<(), ImageError> {
                    let region = Region::rows(size, rows.start, rows.end);
                    let mut result = Ok(());
                    for pass in 0..config.repeats {
                        // keep reaching the barriers after a failure so no worker stalls
                        if result.is_ok() {
                            result = convolve_band::<_, C>(working, kernel, region, &mut scratch);
                        }
                        barrier.wait();
                        if result.is_ok() {
                            working.store_rows(rows.clone(), &scratch);
                        }
                        if barrier.wait().is_leader() {
                            log::debug!("pass {}/{} done", pass + 1, config.repeats);
                        }
                    }
                    result
                })
            })
            .collect::<Vec<_>>();

        join_workers(handles)
    })?;

    Ok(working.into_image()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::kernel_from;

    fn gradient_image(width: usize, height: usize) -> Result<Image<u8, 3>, ImageError> {
        let data = (0..width * height * 3)
            .map(|i| ((i * 7 + i / 5) % 256) as u8)
            .collect();
        Image::new([width, height].into(), data)
    }

    #[test]
    fn test_band_rows_cover_height() {
        for height in [0, 1, 5, 7, 16] {
            for threads in 1..6 {
                let bands = partition_rows(height, threads);
                assert_eq!(bands.len(), threads);
                assert_eq!(bands[0].start, 0);
                assert_eq!(bands[threads - 1].end, height);
                for pair in bands.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                }
            }
        }
    }

    #[test]
    fn test_band_rows_remainder() {
        assert_eq!(partition_rows(7, 3), vec![0..2, 2..4, 4..7]);
        // more workers than rows: only the last band has work
        assert_eq!(partition_rows(2, 3), vec![0..0, 0..0, 0..2]);
    }

    #[test]
    fn test_pass_config() {
        assert_eq!(PassConfig::default().validate(), Ok(()));
        assert_eq!(
            PassConfig::default().with_threads(0).validate(),
            Err(ParallelError::InvalidThreadCount(0))
        );
        assert_eq!(
            PassConfig::default().with_repeats(0).validate(),
            Err(ParallelError::InvalidRepeatCount(0))
        );
    }

    #[test]
    fn test_convolve_parallel_matches_single() -> Result<(), Box<dyn std::error::Error>> {
        let src = gradient_image(11, 10)?;
        for kind in ["blur", "sharpen", "edge", "emboss"] {
            let kernel = kernel_from(kind)?;
            let expected = convolve_single_thread(&src, &kernel)?;
            for threads in [1, 2, 3, 4, 10, 13] {
                let dst = convolve_parallel(&src, &kernel, threads)?;
                assert_eq!(dst, expected, "{kind} with {threads} threads");
            }
        }
        Ok(())
    }

    #[test]
    fn test_convolve_parallel_zero_threads() -> Result<(), ImageError> {
        let src = gradient_image(4, 4)?;
        let kernel = Kernel::from(crate::filter::KernelKind::Blur);
        assert_eq!(
            convolve_parallel(&src, &kernel, 0),
            Err(ParallelError::InvalidThreadCount(0))
        );
        Ok(())
    }

    #[test]
    fn test_convolve_passes_single_pass() -> Result<(), Box<dyn std::error::Error>> {
        let src = gradient_image(9, 8)?;
        let kernel = kernel_from("emboss")?;
        let expected = convolve_single_thread(&src, &kernel)?;
        for threads in [1, 2, 3, 8] {
            let config = PassConfig::default().with_threads(threads);
            assert_eq!(convolve_passes(&src, &kernel, config)?, expected);
        }
        Ok(())
    }

    #[test]
    fn test_convolve_passes_composition() -> Result<(), Box<dyn std::error::Error>> {
        let src = gradient_image(12, 9)?;
        let original = src.clone();
        let kernel = kernel_from("blur")?;

        let once = convolve_single_thread(&src, &kernel)?;
        let twice = convolve_single_thread(&once, &kernel)?;

        for threads in [1, 2, 4] {
            let config = PassConfig::default().with_threads(threads).with_repeats(2);
            assert_eq!(convolve_passes(&src, &kernel, config)?, twice);
        }

        // the caller's image is never modified
        assert_eq!(src, original);
        Ok(())
    }

    #[test]
    fn test_convolve_passes_invalid_config() -> Result<(), ImageError> {
        let src = gradient_image(3, 3)?;
        let kernel = Kernel::from(crate::filter::KernelKind::Edge);
        assert_eq!(
            convolve_passes(&src, &kernel, PassConfig::default().with_threads(0)),
            Err(ParallelError::InvalidThreadCount(0))
        );
        assert_eq!(
            convolve_passes(&src, &kernel, PassConfig::default().with_repeats(0)),
            Err(ParallelError::InvalidRepeatCount(0))
        );
        Ok(())
    }

    #[test]
    fn test_shared_image_sampling() -> Result<(), ImageError> {
        let src = gradient_image(3, 2)?;
        let shared = SharedImage::<3>::from_image(&src)?;
        for y in -1..3 {
            for x in -1..4 {
                for c in -1..4 {
                    assert_eq!(
                        ZeroPaddedSource::<3>::sample(&shared, x, y, c),
                        src.sample(x, y, c)
                    );
                }
            }
        }
        assert_eq!(shared.into_image()?, src);
        Ok(())
    }
}
