use pixconv_image::{Image, ImageError};

/// Default tolerance used to decide that two samples differ.
pub const DEFAULT_TOLERANCE: u8 = 10;

/// Count the samples of two images whose absolute difference exceeds `tolerance`.
///
/// # Arguments
///
/// * `image1` - The first input image with shape (H, W, C).
/// * `image2` - The second input image with shape (H, W, C).
/// * `tolerance` - The largest absolute difference still considered equal.
///
/// # Returns
///
/// The number of differing samples.
///
/// # Example
///
/// ```
/// use pixconv_image::{Image, ImageSize};
/// use pixconv_imgproc::metrics::count_differences;
///
/// let size = ImageSize { width: 2, height: 1 };
/// let image1 = Image::<u8, 1>::new(size, vec![10, 200]).unwrap();
/// let image2 = Image::<u8, 1>::new(size, vec![20, 180]).unwrap();
///
/// assert_eq!(count_differences(&image1, &image2, 10).unwrap(), 1);
/// ```
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] if the two images have different shapes.
pub fn count_differences<const C: usize>(
    image1: &Image<u8, C>,
    image2: &Image<u8, C>,
    tolerance: u8,
) -> Result<usize, ImageError> {
    if image1.size() != image2.size() {
        return Err(ImageError::InvalidImageSize(
            image1.cols(),
            image1.rows(),
            image2.cols(),
            image2.rows(),
        ));
    }

    let count = image1
        .as_slice()
        .iter()
        .zip(image2.as_slice().iter())
        .filter(|(&a, &b)| a.abs_diff(b) > tolerance)
        .count();

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_differences() -> Result<(), ImageError> {
        let image1 = Image::<u8, 3>::new([2, 1].into(), vec![0, 50, 255, 100, 100, 100])?;
        let image2 = Image::<u8, 3>::new([2, 1].into(), vec![10, 61, 0, 100, 89, 111])?;

        assert_eq!(count_differences(&image1, &image2, DEFAULT_TOLERANCE)?, 4);
        assert_eq!(count_differences(&image1, &image2, 0)?, 5);
        assert_eq!(count_differences(&image1, &image2, 255)?, 0);
        assert_eq!(count_differences(&image1, &image1, 0)?, 0);
        Ok(())
    }

    #[test]
    fn test_count_differences_size_mismatch() -> Result<(), ImageError> {
        let image1 = Image::<u8, 1>::from_size_zeros([2, 3].into())?;
        let image2 = Image::<u8, 1>::from_size_zeros([3, 2].into())?;
        assert_eq!(
            count_differences(&image1, &image2, 0),
            Err(ImageError::InvalidImageSize(2, 3, 3, 2))
        );
        Ok(())
    }
}
