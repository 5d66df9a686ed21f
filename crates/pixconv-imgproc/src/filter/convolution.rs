use pixconv_image::{Image, ImageError, ImageSize};

use super::Kernel;

/// A read-only source of 8-bit samples with zero padding outside the canvas.
///
/// The convolution reads through this trait so that the same routine runs over a plain
/// [`Image`] and over the shared working buffer of the pass engine.
pub trait ZeroPaddedSource<const C: usize> {
    /// The size of the canvas in pixels.
    fn size(&self) -> ImageSize;

    /// The sample at `(x, y)` channel `c`, or zero outside the canvas.
    fn sample(&self, x: isize, y: isize, c: isize) -> u8;
}

impl<const C: usize> ZeroPaddedSource<C> for Image<u8, C> {
    fn size(&self) -> ImageSize {
        Image::size(self)
    }

    fn sample(&self, x: isize, y: isize, c: isize) -> u8 {
        Image::sample(self, x, y, c)
    }
}

/// An axis-aligned rectangle `[start_x, end_x) x [start_y, end_y)` in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// First column of the region.
    pub start_x: usize,
    /// First row of the region.
    pub start_y: usize,
    /// One past the last column of the region.
    pub end_x: usize,
    /// One past the last row of the region.
    pub end_y: usize,
}

impl Region {
    /// The region covering a whole image.
    pub fn full(size: ImageSize) -> Self {
        Self {
            start_x: 0,
            start_y: 0,
            end_x: size.width,
            end_y: size.height,
        }
    }

    /// Full-width rows `[start_y, end_y)` of an image.
    pub fn rows(size: ImageSize, start_y: usize, end_y: usize) -> Self {
        Self {
            start_x: 0,
            start_y,
            end_x: size.width,
            end_y,
        }
    }

    /// Number of rows covered by the region.
    pub fn height(&self) -> usize {
        self.end_y.saturating_sub(self.start_y)
    }

    fn validate(&self, size: ImageSize) -> Result<(), ImageError> {
        if self.start_x > self.end_x
            || self.start_y > self.end_y
            || self.end_x > size.width
            || self.end_y > size.height
        {
            return Err(ImageError::InvalidRegion(
                self.start_x,
                self.end_x,
                self.start_y,
                self.end_y,
                size.width,
                size.height,
            ));
        }
        Ok(())
    }
}

fn check_same_size<const C: usize>(
    src: &Image<u8, C>,
    dst: &Image<u8, C>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

/// Convolve a region of a source into a band of full-width output rows.
///
/// Row `y` of the region is written at row `y - region.start_y` of `dst`, and only the
/// columns inside the region are touched. The source is sampled with zero padding using
/// absolute coordinates, so the result does not depend on how the image is split.
///
/// # Arguments
///
/// * `src` - The source samples with shape (H, W, C).
/// * `kernel` - The square kernel to apply. It is flipped before being applied.
/// * `region` - The region of the source to compute.
/// * `dst` - `region.height()` rows of `W * C` samples.
///
/// # Errors
///
/// Returns [`ImageError::InvalidRegion`] if the region does not fit in the source and
/// [`ImageError::InvalidChannelShape`] if `dst` does not hold exactly the region rows.
pub fn convolve_band<S, const C: usize>(
    src: &S,
    kernel: &Kernel,
    region: Region,
    dst: &mut [u8],
) -> Result<(), ImageError>
where
    S: ZeroPaddedSource<C> + ?Sized,
{
    let size = src.size();
    region.validate(size)?;

    let row_stride = size.width * C;
    let expected = region.height() * row_stride;
    if dst.len() != expected {
        return Err(ImageError::InvalidChannelShape(dst.len(), expected));
    }

    if row_stride == 0 {
        return Ok(());
    }

    let ksize = kernel.size();
    let half = kernel.radius() as isize;
    let weights = kernel.flipped();

    for (dst_row, y) in dst
        .chunks_exact_mut(row_stride)
        .zip(region.start_y..region.end_y)
    {
        for x in region.start_x..region.end_x {
            for c in 0..C {
                let mut accum = 0.0f32;
                for ky in 0..ksize {
                    let img_y = y as isize + ky as isize - half;
                    for kx in 0..ksize {
                        let img_x = x as isize + kx as isize - half;
                        let pixel = src.sample(img_x, img_y, c as isize);
                        accum += pixel as f32 * weights[ky * ksize + kx];
                    }
                }

                // clamp then truncate towards zero
                dst_row[x * C + c] = accum.clamp(0.0, 255.0) as u8;
            }
        }
    }

    Ok(())
}

/// Convolve a region of an image into the same region of `dst`.
///
/// `dst` uses the same addressing as `src`; samples outside the region are left untouched.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn convolve_region<const C: usize>(
    src: &Image<u8, C>,
    kernel: &Kernel,
    region: Region,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;
    region.validate(src.size())?;

    let row_stride = src.row_stride();
    let rows = &mut dst.as_slice_mut()[region.start_y * row_stride..region.end_y * row_stride];
    convolve_band::<_, C>(src, kernel, region, rows)
}

/// Convolve a whole image into a caller supplied destination.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn convolve_into<const C: usize>(
    src: &Image<u8, C>,
    kernel: &Kernel,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;
    convolve_band::<_, C>(src, kernel, Region::full(src.size()), dst.as_slice_mut())
}

/// Convolve a whole image into a new image.
///
/// # Errors
///
/// Returns [`ImageError::AllocationFailure`] if the destination cannot be allocated.
///
/// # Examples
///
/// ```
/// use pixconv_image::Image;
/// use pixconv_imgproc::filter::{convolve, kernel_from};
///
/// let image = Image::<u8, 3>::from_size_val([5, 5].into(), 80).unwrap();
/// let blurred = convolve(&image, &kernel_from("blur").unwrap()).unwrap();
///
/// assert_eq!(blurred.get([2, 2, 0]), Some(&80));
/// assert!(blurred.get([0, 0, 0]) < Some(&80));
/// ```
pub fn convolve<const C: usize>(
    src: &Image<u8, C>,
    kernel: &Kernel,
) -> Result<Image<u8, C>, ImageError> {
    let mut dst = Image::like(src)?;
    convolve_into(src, kernel, &mut dst)?;
    Ok(dst)
}
