use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use pixconv_image::Image;

use crate::error::IoError;

/// Checks that an image can be stored as a binary pixmap.
fn validate<const C: usize>(image: &Image<u8, C>) -> Result<(), IoError> {
    if C != 3 {
        return Err(IoError::ChannelMismatch(C));
    }
    if image.as_slice().is_empty() {
        return Err(IoError::EmptyImage);
    }
    Ok(())
}

/// Encodes an RGB image as a binary portable pixmap (P6) into a writer.
///
/// The output is the ASCII header `P6\n{width} {height}\n255\n` followed by the
/// raw interleaved samples in row-major order.
///
/// The image is not validated here; [`write_image_ppm`] rejects non-RGB and empty
/// images before touching the destination.
pub fn encode_image_ppm<W: Write, const C: usize>(
    writer: &mut W,
    image: &Image<u8, C>,
) -> Result<(), std::io::Error> {
    write!(writer, "P6\n{} {}\n255\n", image.width(), image.height())?;
    writer.write_all(image.as_slice())?;
    writer.flush()
}

/// Writes an RGB image to the given file path as a binary portable pixmap (P6).
///
/// # Arguments
///
/// * `file_path` - The destination path. An existing file is overwritten.
/// * `image` - The image to store. It must have 3 channels and at least one pixel.
///
/// # Errors
///
/// The image is validated before the file is created, so a rejected image leaves
/// the file system untouched.
pub fn write_image_ppm<const C: usize>(
    file_path: impl AsRef<Path>,
    image: &Image<u8, C>,
) -> Result<(), IoError> {
    let file_path = file_path.as_ref().to_owned();
    validate(image)?;

    let file = File::create(&file_path).map_err(|e| IoError::FileError(file_path.clone(), e))?;
    let mut writer = BufWriter::new(file);
    encode_image_ppm(&mut writer, image).map_err(|e| IoError::FileError(file_path.clone(), e))?;

    log::debug!(
        "wrote {} ({}x{})",
        file_path.display(),
        image.width(),
        image.height()
    );

    Ok(())
}
