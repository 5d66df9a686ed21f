//! Filter operations
//!
//! This module provides the built-in kernel catalog and the zero-padded convolution.

/// Filter kernels
pub mod kernels;
pub use kernels::{kernel_from, FilterError, Kernel, KernelKind};

/// Convolution operations
mod convolution;
pub use convolution::*;
