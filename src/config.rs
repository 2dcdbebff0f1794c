//! Configuration constants for the foveation pipeline.

use crate::error::FoveationError;

/// Default base blur of the Gaussian kernel.
pub const DEFAULT_SIGMA: f32 = 0.248;

/// Default pyramid depth.
pub const DEFAULT_LEVELS: usize = 6;

/// Default distance scale applied to eccentricity.
pub const DEFAULT_BLUR_STRENGTH: f32 = 1.0;

/// Default transition sharpness.
pub const DEFAULT_SHARPNESS: f32 = 3.0;

/// Default fovea radius in pixels.
pub const DEFAULT_FOVEA_SIZE: f32 = 5.0;

/// Default Gaussian kernel width.
pub const DEFAULT_KERNEL_WIDTH: u32 = 5;

/// Deepest supported pyramid; level indices are stored as `u8`.
pub const MAX_LEVELS: usize = 16;

/// Constants driving pyramid construction and the acuity model.
///
/// # Examples
/// ```
/// use foveate_kit::FoveationConfig;
///
/// let config = FoveationConfig::default().with_sharpness(5.0).with_levels(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FoveationConfig {
    /// Standard deviation of the blur kernel, also used by the acuity model
    pub sigma: f32,
    /// Number of pyramid levels (`prNum`)
    pub levels: usize,
    /// Divisor applied to pixel distances (`p`)
    pub blur_strength: f32,
    /// Transition sharpness between levels (`k`)
    pub sharpness: f32,
    /// Fovea radius (`alpha`)
    pub fovea_size: f32,
    /// Width of the square Gaussian kernel, odd
    pub kernel_width: u32,
    /// Reject fixations outside the image instead of extrapolating
    pub strict_bounds: bool,
}

impl Default for FoveationConfig {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_SIGMA,
            levels: DEFAULT_LEVELS,
            blur_strength: DEFAULT_BLUR_STRENGTH,
            sharpness: DEFAULT_SHARPNESS,
            fovea_size: DEFAULT_FOVEA_SIZE,
            kernel_width: DEFAULT_KERNEL_WIDTH,
            strict_bounds: false,
        }
    }
}

impl FoveationConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the kernel sigma.
    #[must_use]
    pub const fn with_sigma(mut self, sigma: f32) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set the pyramid depth.
    #[must_use]
    pub const fn with_levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }

    /// Set the distance scale `p`.
    #[must_use]
    pub const fn with_blur_strength(mut self, blur_strength: f32) -> Self {
        self.blur_strength = blur_strength;
        self
    }

    /// Set the transition sharpness `k`.
    #[must_use]
    pub const fn with_sharpness(mut self, sharpness: f32) -> Self {
        self.sharpness = sharpness;
        self
    }

    /// Set the fovea radius `alpha`.
    #[must_use]
    pub const fn with_fovea_size(mut self, fovea_size: f32) -> Self {
        self.fovea_size = fovea_size;
        self
    }

    /// Set the kernel width.
    #[must_use]
    pub const fn with_kernel_width(mut self, kernel_width: u32) -> Self {
        self.kernel_width = kernel_width;
        self
    }

    /// Enable or disable strict fixation bounds checking.
    #[must_use]
    pub const fn with_strict_bounds(mut self, strict_bounds: bool) -> Self {
        self.strict_bounds = strict_bounds;
        self
    }

    /// Check every constant.
    ///
    /// # Errors
    ///
    /// Returns [`FoveationError::InvalidParameter`] naming the first
    /// offending field.
    pub fn validate(&self) -> Result<(), FoveationError> {
        validate_positive("sigma", self.sigma)?;
        validate_positive("blur_strength", self.blur_strength)?;
        validate_positive("sharpness", self.sharpness)?;
        validate_positive("fovea_size", self.fovea_size)?;

        if self.kernel_width == 0 || self.kernel_width % 2 == 0 {
            return Err(FoveationError::InvalidParameter(format!(
                "kernel_width must be odd and > 0, got {}",
                self.kernel_width
            )));
        }

        if !(2..=MAX_LEVELS).contains(&self.levels) {
            return Err(FoveationError::InvalidParameter(format!(
                "levels must be in 2..={MAX_LEVELS}, got {}",
                self.levels
            )));
        }

        Ok(())
    }
}

fn validate_positive(name: &str, value: f32) -> Result<(), FoveationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FoveationError::InvalidParameter(format!(
            "{name} must be finite and > 0, got {value}"
        )))
    }
}
