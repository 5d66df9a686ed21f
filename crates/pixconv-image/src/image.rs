use num_traits::Zero;

use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use pixconv_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by the size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

impl From<ImageSize> for [u32; 2] {
    fn from(size: ImageSize) -> Self {
        [size.width as u32, size.height as u32]
    }
}

/// Number of samples needed for an image of `size` with `channels` channels.
fn buffer_len(size: ImageSize, channels: usize) -> Option<usize> {
    size.width.checked_mul(size.height)?.checked_mul(channels)
}

/// Reserve a buffer of `len` elements filled with `val`.
///
/// The reservation is fallible so that oversized requests surface as
/// [`ImageError::AllocationFailure`] instead of aborting the process.
fn try_alloc<T: Clone>(len: usize, val: T) -> Result<Vec<T>, ImageError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| ImageError::AllocationFailure(len))?;
    data.resize(len, val);
    Ok(data)
}

/// Represents an image with pixel data.
///
/// The pixel data is stored row-major with interleaved channels, so the sample
/// of pixel `(x, y)` at channel `c` lives at offset `(y * width + x) * CHANNELS + c`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Returns
    ///
    /// A new image with the given pixel data.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixconv_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::new(
    ///    ImageSize {
    ///       width: 10,
    ///      height: 20,
    ///  },
    /// vec![0u8; 10 * 20 * 3],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        // check if the data length matches the image size
        let expected = buffer_len(size, CHANNELS).unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size and default pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `val` - The default value of the pixel data.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::AllocationFailure`] if the buffer cannot be reserved.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixconv_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::from_size_val(
    ///   ImageSize {
    ///     width: 10,
    ///    height: 20,
    /// }, 0u8).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let len = buffer_len(size, CHANNELS).ok_or(ImageError::AllocationFailure(usize::MAX))?;

        Image::new(size, try_alloc(len, val)?)
    }

    /// Create a new zero-filled image with the given size.
    pub fn from_size_zeros(size: ImageSize) -> Result<Self, ImageError>
    where
        T: Clone + Zero,
    {
        Self::from_size_val(size, T::zero())
    }

    /// Create a zero-filled image with the same size and channels as `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixconv_image::Image;
    ///
    /// let image = Image::<u8, 3>::from_size_val([4, 2].into(), 7).unwrap();
    /// let other = Image::like(&image).unwrap();
    ///
    /// assert_eq!(other.size(), image.size());
    /// assert!(other.as_slice().iter().all(|&v| v == 0));
    /// ```
    pub fn like(other: &Self) -> Result<Self, ImageError>
    where
        T: Clone + Zero,
    {
        Self::from_size_zeros(other.size)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// Number of samples in a full row (`width * CHANNELS`).
    pub fn row_stride(&self) -> usize {
        self.size.width * CHANNELS
    }

    /// Get the pixel data as a flat slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the pixel data as a flat mutable slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return its pixel buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Get a reference to the sample at `[y, x, c]`, or `None` if out of bounds.
    pub fn get(&self, index: [usize; 3]) -> Option<&T> {
        let [y, x, c] = index;
        if x >= self.width() || y >= self.height() || c >= CHANNELS {
            return None;
        }
        self.data.get((y * self.width() + x) * CHANNELS + c)
    }

    /// Read a sample with zero padding.
    ///
    /// Coordinates outside `[0, width) x [0, height)` or channels outside
    /// `[0, CHANNELS)` yield zero. This is the boundary policy used by the
    /// convolution, so the function is total over all integer coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixconv_image::Image;
    ///
    /// let image = Image::<u8, 3>::from_size_val([2, 2].into(), 9).unwrap();
    ///
    /// assert_eq!(image.sample(1, 1, 2), 9);
    /// assert_eq!(image.sample(-1, 0, 0), 0);
    /// assert_eq!(image.sample(0, 2, 0), 0);
    /// assert_eq!(image.sample(0, 0, 3), 0);
    /// ```
    pub fn sample(&self, x: isize, y: isize, c: isize) -> T
    where
        T: Copy + Zero,
    {
        if x < 0
            || y < 0
            || c < 0
            || x as usize >= self.width()
            || y as usize >= self.height()
            || c as usize >= CHANNELS
        {
            return T::zero();
        }

        self.data[(y as usize * self.width() + x as usize) * CHANNELS + c as usize]
    }

    /// Write a sample in bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixel or the channel lies outside the image.
    pub fn set_pixel(&mut self, x: usize, y: usize, c: usize, value: T) -> Result<(), ImageError> {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }

        if c >= CHANNELS {
            return Err(ImageError::ChannelIndexOutOfBounds(c, CHANNELS));
        }

        let idx = (y * self.width() + x) * CHANNELS + c;
        self.data[idx] = value;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::image::{Image, ImageError, ImageSize};

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.width, 10);
        assert_eq!(image_size.height, 20);
        assert_eq!(image_size.area(), 200);
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 10,
                height: 20,
            },
            vec![0u8; 10 * 20 * 3],
        )?;
        assert_eq!(image.size().width, 10);
        assert_eq!(image.size().height, 20);
        assert_eq!(image.num_channels(), 3);
        assert_eq!(image.row_stride(), 30);

        Ok(())
    }

    #[test]
    fn image_invalid_length() {
        let res = Image::<u8, 3>::new([2, 2].into(), vec![0u8; 11]);
        assert_eq!(res, Err(ImageError::InvalidChannelShape(11, 12)));
    }

    #[test]
    fn image_like() -> Result<(), ImageError> {
        let image = Image::<u8, 4>::from_size_val([3, 5].into(), 42)?;
        let other = Image::like(&image)?;
        assert_eq!(other.size(), image.size());
        assert_eq!(other.num_channels(), 4);
        assert_eq!(other.as_slice().len(), image.as_slice().len());
        assert!(other.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }

    #[test]
    fn image_allocation_overflow() {
        let size = ImageSize {
            width: usize::MAX,
            height: 2,
        };
        let res = Image::<u8, 3>::from_size_val(size, 0);
        assert!(matches!(res, Err(ImageError::AllocationFailure(_))));
    }

    #[test]
    fn image_sample_layout() -> Result<(), ImageError> {
        let data = (0..2 * 3 * 3).map(|v| v as u8).collect::<Vec<_>>();
        let image = Image::<u8, 3>::new([2, 3].into(), data)?;

        // pixel (1, 2), channel 1 -> (2 * 2 + 1) * 3 + 1
        assert_eq!(image.sample(1, 2, 1), 16);
        assert_eq!(image.get([2, 1, 1]), Some(&16));
        Ok(())
    }

    #[test]
    fn image_sample_zero_padding() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val([4, 3].into(), 255)?;

        for c in -1..5 {
            assert_eq!(image.sample(-1, 0, c), 0);
            assert_eq!(image.sample(0, -1, c), 0);
            assert_eq!(image.sample(4, 0, c), 0);
            assert_eq!(image.sample(0, 3, c), 0);
            assert_eq!(image.sample(isize::MIN, isize::MAX, c), 0);
        }
        assert_eq!(image.sample(0, 0, -1), 0);
        assert_eq!(image.sample(0, 0, 3), 0);
        assert_eq!(image.sample(3, 2, 2), 255);
        Ok(())
    }

    #[test]
    fn image_set_pixel() -> Result<(), ImageError> {
        let mut image = Image::<u8, 3>::from_size_zeros([2, 2].into())?;
        image.set_pixel(1, 0, 2, 7)?;
        assert_eq!(image.as_slice()[5], 7);

        assert_eq!(
            image.set_pixel(2, 0, 0, 1),
            Err(ImageError::PixelIndexOutOfBounds(2, 0, 2, 2))
        );
        assert_eq!(
            image.set_pixel(0, 0, 3, 1),
            Err(ImageError::ChannelIndexOutOfBounds(3, 3))
        );
        Ok(())
    }

    #[test]
    fn image_rgbd() -> Result<(), ImageError> {
        let image = Image::<f32, 4>::new(
            ImageSize {
                height: 2,
                width: 3,
            },
            vec![0f32; 2 * 3 * 4],
        )?;
        assert_eq!(image.size().width, 3);
        assert_eq!(image.size().height, 2);
        assert_eq!(image.num_channels(), 4);
        assert_eq!(image.sample(5, 5, 0), 0.0);

        Ok(())
    }
}
