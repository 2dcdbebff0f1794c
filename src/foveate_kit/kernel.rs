use image::Rgb;
use imageproc::definitions::Image;
use imageproc::filter::Kernel;
use itertools::iproduct;

use crate::error::FoveationError;

/// Normalized square Gaussian kernel.
///
/// Weights follow `exp(-(x² + y²) / (2σ²))` over a grid centred at zero and
/// are scaled so they sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    width: u32,
    sigma: f32,
    weights: Vec<f32>,
}

impl GaussianKernel {
    /// Build a `width`×`width` kernel.
    ///
    /// # Errors
    ///
    /// * `width` is zero or even
    /// * `sigma` is not finite or not positive
    ///
    /// # Examples
    /// ```
    /// use foveate_kit::GaussianKernel;
    ///
    /// let kernel = GaussianKernel::new(5, 0.248).unwrap();
    /// let total: f32 = kernel.weights().iter().sum();
    /// assert!((total - 1.0).abs() < 1e-6);
    /// ```
    pub fn new(width: u32, sigma: f32) -> Result<Self, FoveationError> {
        if width == 0 || width % 2 == 0 {
            return Err(FoveationError::InvalidParameter(format!(
                "kernel width must be odd and > 0, got {width}"
            )));
        }
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(FoveationError::InvalidParameter(format!(
                "kernel sigma must be finite and > 0, got {sigma}"
            )));
        }

        let radius = i64::from(width / 2);
        let two_sigma_sq = 2.0 * f64::from(sigma) * f64::from(sigma);

        let raw: Vec<f64> = iproduct!(-radius..=radius, -radius..=radius)
            .map(|(y, x)| (-((x * x + y * y) as f64) / two_sigma_sq).exp())
            .collect();
        let total: f64 = raw.iter().sum();
        let weights = raw.into_iter().map(|w| (w / total) as f32).collect();

        Ok(Self {
            width,
            sigma,
            weights,
        })
    }

    /// Kernel side length.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Half-width, `width / 2`.
    #[inline]
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.width / 2
    }

    /// Standard deviation the kernel was built with.
    #[inline]
    #[must_use]
    pub const fn sigma(&self) -> f32 {
        self.sigma
    }

    /// Row-major weights.
    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weight at column `x`, row `y` of the kernel grid.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        (x < self.width && y < self.width)
            .then(|| self.weights[(y * self.width + x) as usize])
    }

    /// Blur an RGB image, replicating edge pixels where the window leaves
    /// the image.
    #[must_use]
    pub fn convolve(&self, image: &Image<Rgb<f32>>) -> Image<Rgb<f32>> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return image.clone();
        }

        Kernel::new(&self.weights, self.width, self.width).filter(image, |c, a| *c = a)
    }
}
