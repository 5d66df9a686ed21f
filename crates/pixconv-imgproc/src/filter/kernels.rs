use std::{fmt, str::FromStr};

/// Errors raised while building a convolution kernel.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// The requested kernel name is not part of the catalog.
    #[error("Unknown kernel name: {0}")]
    UnknownKernel(String),

    /// The kernel size is not a positive odd number or the weights do not fill it.
    #[error("Invalid kernel of size {0} with {1} weights")]
    InvalidKernel(usize, usize),
}

#[rustfmt::skip]
const BLUR_KERNEL: [f32; 9] = [
    1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0,
    2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0,
    1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0,
];

#[rustfmt::skip]
const SHARPEN_KERNEL: [f32; 9] = [
    0.0, -1.0, 0.0,
    -1.0, 5.0, -1.0,
    0.0, -1.0, 0.0,
];

#[rustfmt::skip]
const EDGE_KERNEL: [f32; 9] = [
    0.0, -1.0, 0.0,
    -1.0, 4.0, -1.0,
    0.0, -1.0, 0.0,
];

#[rustfmt::skip]
const EMBOSS_KERNEL: [f32; 9] = [
    -2.0, -1.0, 0.0,
    -1.0, 1.0, 1.0,
    0.0, 1.0, 2.0,
];

/// The built-in kernels of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    /// 3x3 normalized gaussian-like blur.
    Blur,
    /// 3x3 sharpen, center 5 and orthogonal neighbors -1.
    Sharpen,
    /// 3x3 laplacian edge detector.
    Edge,
    /// 3x3 diagonal emboss.
    Emboss,
}

impl KernelKind {
    /// All the kernels of the catalog.
    pub const ALL: [KernelKind; 4] = [
        KernelKind::Blur,
        KernelKind::Sharpen,
        KernelKind::Edge,
        KernelKind::Emboss,
    ];

    /// The catalog name of the kernel.
    pub fn name(&self) -> &'static str {
        match self {
            KernelKind::Blur => "blur",
            KernelKind::Sharpen => "sharpen",
            KernelKind::Edge => "edge",
            KernelKind::Emboss => "emboss",
        }
    }

    /// Look up a kernel by its catalog name.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownKernel`] carrying `name` if it is not in the catalog.
    pub fn from_name(name: &str) -> Result<Self, FilterError> {
        KernelKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| FilterError::UnknownKernel(name.to_string()))
    }

    fn size_and_weights(&self) -> (usize, &'static [f32]) {
        match self {
            KernelKind::Blur => (3, &BLUR_KERNEL),
            KernelKind::Sharpen => (3, &SHARPEN_KERNEL),
            KernelKind::Edge => (3, &EDGE_KERNEL),
            KernelKind::Emboss => (3, &EMBOSS_KERNEL),
        }
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KernelKind::from_name(s)
    }
}

/// A square convolution kernel with an odd size.
///
/// The weights are stored row-major and never change after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Create a kernel from its size and row-major weights.
    ///
    /// # Arguments
    ///
    /// * `size` - The side of the square kernel. Must be odd.
    /// * `weights` - `size * size` weights, row-major.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernel`] if the size is even or zero, or if the number
    /// of weights does not match.
    pub fn new(size: usize, weights: Vec<f32>) -> Result<Self, FilterError> {
        if size % 2 == 0 || size.checked_mul(size) != Some(weights.len()) {
            return Err(FilterError::InvalidKernel(size, weights.len()));
        }

        Ok(Self { size, weights })
    }

    /// Build one of the catalog kernels by name.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixconv_imgproc::filter::Kernel;
    ///
    /// let kernel = Kernel::from_name("sharpen").unwrap();
    /// assert_eq!(kernel.size(), 3);
    /// assert_eq!(kernel.get(1, 1), 5.0);
    ///
    /// assert!(Kernel::from_name("median").is_err());
    /// ```
    pub fn from_name(name: &str) -> Result<Self, FilterError> {
        Ok(KernelKind::from_name(name)?.into())
    }

    /// The side of the square kernel.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Offset from the kernel border to its center, `size / 2`.
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// The row-major weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// The weight at column `x` and row `y`, or zero outside the kernel.
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x >= self.size || y >= self.size {
            return 0.0;
        }
        self.weights[y * self.size + x]
    }

    /// The weights rotated by 180 degrees.
    ///
    /// Entry `ky * size + kx` holds the original weight at
    /// `(size - ky - 1) * size + (size - kx - 1)`.
    pub fn flipped(&self) -> Vec<f32> {
        self.weights.iter().rev().copied().collect()
    }
}

impl From<KernelKind> for Kernel {
    fn from(kind: KernelKind) -> Self {
        let (size, weights) = kind.size_and_weights();
        Self {
            size,
            weights: weights.to_vec(),
        }
    }
}

/// Build one of the catalog kernels by name.
///
/// Recognized names are `"blur"`, `"sharpen"`, `"edge"` and `"emboss"`.
pub fn kernel_from(name: &str) -> Result<Kernel, FilterError> {
    Kernel::from_name(name)
}
