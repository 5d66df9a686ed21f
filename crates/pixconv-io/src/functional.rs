use std::path::Path;

use pixconv_image::{Image, ImageSize};

use crate::error::IoError;

/// Reads an image from the given file path as an 8-bit RGB image.
///
/// The method tries to read from any image format supported by the image crate.
/// Grayscale and alpha layouts are converted to three interleaved channels.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// A RGB image with three channels (rgb8).
///
/// # Errors
///
/// Returns [`IoError::FileDoesNotExist`] when the path is missing and
/// [`IoError::ImageDecodeError`] when the content cannot be decoded.
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref().to_owned();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path));
    }

    // open the file and map it to memory
    let file =
        std::fs::File::open(&file_path).map_err(|e| IoError::FileError(file_path.clone(), e))?;
    let mmap = unsafe { memmap2::Mmap::map(&file) }
        .map_err(|e| IoError::FileError(file_path.clone(), e))?;

    // decode the data directly from memory
    let img = image::ImageReader::new(std::io::Cursor::new(&mmap))
        .with_guessed_format()
        .map_err(|e| IoError::FileError(file_path.clone(), e))?
        .decode()?;

    log::debug!(
        "decoded {} as {:?} {}x{}",
        file_path.display(),
        img.color(),
        img.width(),
        img.height()
    );

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_rgb8().into_raw())?)
}
