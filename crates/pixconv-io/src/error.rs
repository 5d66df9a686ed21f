/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Error to open, read or write a file.
    #[error("Failed to manipulate the file {0}. {1}")]
    FileError(std::path::PathBuf, #[source] std::io::Error),

    /// Error when the image does not have the channel count required by the format.
    #[error("Image must have 3 channels to be written as a pixmap, got {0}")]
    ChannelMismatch(usize),

    /// Error when the image holds no samples.
    #[error("Image has no samples to write")]
    EmptyImage,

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] pixconv_image::ImageError),

    /// Error to decode the image.
    #[error("Failed to decode the image. {0}")]
    ImageDecodeError(#[from] image::ImageError),
}
