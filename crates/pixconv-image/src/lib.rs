#![deny(missing_docs)]
//! Image types for convolution and manipulating images

/// image representation for convolution purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
