use image::{Primitive, Rgb};
use imageproc::definitions::Image;
use log::{debug, trace};

use crate::config::FoveationConfig;
use crate::error::FoveationError;
use crate::foveate_kit::inter_area::InterAreaResize;
use crate::foveate_kit::kernel::GaussianKernel;
use crate::utils::{to_f32_image, validate_matching_dimensions, validate_non_empty_image};

/// Full-resolution Gaussian pyramid.
///
/// Level 0 is the unmodified input; each further level is blurrier. Every
/// level has the input's dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Pyramid {
    levels: Vec<Image<Rgb<f32>>>,
}

impl Pyramid {
    /// Number of levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the pyramid holds no level. Never true for a built pyramid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Shared (width, height) of every level.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.levels.first().map_or((0, 0), |level| level.dimensions())
    }

    /// Level `index`, sharpest first.
    #[must_use]
    pub fn level(&self, index: usize) -> Option<&Image<Rgb<f32>>> {
        self.levels.get(index)
    }

    /// All levels, sharpest first.
    #[must_use]
    pub fn levels(&self) -> &[Image<Rgb<f32>>] {
        &self.levels
    }

    /// Take ownership of the levels.
    #[must_use]
    pub fn into_levels(self) -> Vec<Image<Rgb<f32>>> {
        self.levels
    }
}

/// Builds [`Pyramid`]s with a fixed kernel and depth.
#[derive(Debug, Clone)]
pub struct PyramidBuilder {
    kernel: GaussianKernel,
    levels: usize,
}

impl PyramidBuilder {
    /// Create a builder from `kernel_width`, `sigma` and `levels` of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FoveationError::InvalidParameter`] for an invalid config.
    pub fn new(config: &FoveationConfig) -> Result<Self, FoveationError> {
        config.validate()?;
        Ok(Self {
            kernel: GaussianKernel::new(config.kernel_width, config.sigma)?,
            levels: config.levels,
        })
    }

    /// Create a builder from an existing kernel.
    ///
    /// # Errors
    ///
    /// Returns [`FoveationError::InvalidParameter`] when `levels < 2`.
    pub fn with_kernel(kernel: GaussianKernel, levels: usize) -> Result<Self, FoveationError> {
        if levels < 2 {
            return Err(FoveationError::InvalidParameter(format!(
                "levels must be >= 2, got {levels}"
            )));
        }
        Ok(Self { kernel, levels })
    }

    /// Pyramid depth.
    #[must_use]
    pub const fn levels(&self) -> usize {
        self.levels
    }

    /// Kernel used for every blur step.
    #[must_use]
    pub const fn kernel(&self) -> &GaussianKernel {
        &self.kernel
    }

    /// Build the pyramid for `image`.
    ///
    /// Downsample pass: blur then halve, `levels - 1` times. Upsample pass:
    /// level `i` is doubled and reblurred `i` times, the last step resizing
    /// to the exact input size.
    ///
    /// # Errors
    ///
    /// * The image is empty or cannot be halved `levels - 1` times
    /// * A reconstructed level does not match the input size
    ///
    /// # Examples
    /// ```no_run
    /// use foveate_kit::{FoveationConfig, PyramidBuilder};
    /// use image::{Rgb, RgbImage};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image = RgbImage::from_pixel(64, 48, Rgb([10, 20, 30]));
    /// let pyramid = PyramidBuilder::new(&FoveationConfig::default())?.build(&image)?;
    /// assert_eq!(pyramid.len(), 6);
    /// assert_eq!(pyramid.dimensions(), (64, 48));
    /// # Ok(())
    /// # }
    /// ```
    pub fn build<S>(&self, image: &Image<Rgb<S>>) -> Result<Pyramid, FoveationError>
    where
        Rgb<S>: image::Pixel<Subpixel = S>,
        S: Primitive,
        f32: From<S>,
    {
        let (width, height) = image.dimensions();
        validate_non_empty_image(width, height, "PyramidBuilder")?;
        self.validate_depth(width, height)?;

        let shrunk = self.downsample_pass(to_f32_image(image))?;
        let levels = self.upsample_pass(shrunk, (width, height))?;

        debug!(
            "built {}-level pyramid at {width}x{height} (sigma={})",
            levels.len(),
            self.kernel.sigma()
        );
        Ok(Pyramid { levels })
    }

    fn validate_depth(&self, width: u32, height: u32) -> Result<(), FoveationError> {
        let halvings = (self.levels - 1) as u32;
        let fits = |size: u32| size.checked_shr(halvings).is_some_and(|s| s >= 1);
        if fits(width) && fits(height) {
            Ok(())
        } else {
            Err(FoveationError::ImageTooSmall {
                width,
                height,
                levels: self.levels,
            })
        }
    }

    fn downsample_pass(
        &self,
        base: Image<Rgb<f32>>,
    ) -> Result<Vec<Image<Rgb<f32>>>, FoveationError> {
        let mut shrunk = Vec::with_capacity(self.levels);
        shrunk.push(base);

        for i in 1..self.levels {
            let blurred = self.kernel.convolve(&shrunk[i - 1]);
            let (w, h) = blurred.dimensions();
            let half = InterAreaResize::new(w / 2, h / 2)?.resize(&blurred)?;
            trace!("downsample level {i}: {w}x{h} -> {}x{}", w / 2, h / 2);
            shrunk.push(half);
        }

        Ok(shrunk)
    }

    fn upsample_pass(
        &self,
        shrunk: Vec<Image<Rgb<f32>>>,
        original: (u32, u32),
    ) -> Result<Vec<Image<Rgb<f32>>>, FoveationError> {
        shrunk
            .into_iter()
            .enumerate()
            .map(|(i, level)| -> Result<Image<Rgb<f32>>, FoveationError> {
                let mut current = level;
                for step in 0..i {
                    let target = if step + 1 < i {
                        let (w, h) = current.dimensions();
                        (w * 2, h * 2)
                    } else {
                        original
                    };
                    current = InterAreaResize::new(target.0, target.1)?.resize(&current)?;
                    current = self.kernel.convolve(&current);
                }
                validate_matching_dimensions(original, current.dimensions())?;
                trace!("upsample level {i}: restored to {:?}", current.dimensions());
                Ok(current)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use image::RgbImage;

    fn builder(levels: usize) -> PyramidBuilder {
        PyramidBuilder::new(&FoveationConfig::default().with_levels(levels)).unwrap()
    }

    #[test]
    fn build_level_zero_equals_input() {
        let image = create_large_test_image(37, 29);
        let pyramid = builder(4).build(&image).unwrap();
        let level0 = pyramid.level(0).unwrap();
        for (a, b) in level0.pixels().zip(image.pixels()) {
            for c in 0..3 {
                assert_eq!(a[c], f32::from(b[c]));
            }
        }
    }

    #[test]
    fn build_every_level_has_input_dimensions() {
        for levels in 2..=6 {
            for (w, h) in [(64, 64), (101, 77), (32, 200)] {
                let image = create_large_test_image(w, h);
                let pyramid = builder(levels).build(&image).unwrap();
                assert_eq!(pyramid.len(), levels);
                assert!(pyramid.levels().iter().all(|l| l.dimensions() == (w, h)));
            }
        }
    }

    #[test]
    fn build_uniform_image_stays_uniform_on_every_level() {
        let image = create_uniform_image(64, 48, [90, 140, 200]);
        let pyramid = builder(6).build(&image).unwrap();
        for level in pyramid.levels() {
            for p in level.pixels() {
                assert!((p[0] - 90.0).abs() < 0.01);
                assert!((p[1] - 140.0).abs() < 0.01);
                assert!((p[2] - 200.0).abs() < 0.01);
            }
        }
    }

    #[test]
    fn build_deeper_levels_lose_detail() {
        let image = create_checkerboard_image(64, 64);
        let pyramid = builder(5).build(&image).unwrap();
        let contrasts: Vec<f32> = pyramid.levels().iter().map(channel_range).collect();
        assert_eq!(contrasts[0], 255.0);
        assert!(contrasts.iter().all(|&c| c <= 255.0 + 1e-3), "{contrasts:?}");
        assert!(contrasts[4] < 1.0, "{contrasts:?}");
    }

    #[test]
    fn build_with_image_too_small_returns_error() {
        let image = RgbImage::new(16, 64);
        let result = builder(6).build(&image);
        assert_eq!(
            result,
            Err(FoveationError::ImageTooSmall {
                width: 16,
                height: 64,
                levels: 6
            })
        );
        builder(5).build(&image).unwrap();
    }

    #[test]
    fn build_with_empty_image_returns_error() {
        let image = RgbImage::new(0, 10);
        assert!(matches!(
            builder(2).build(&image),
            Err(FoveationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn with_kernel_rejects_single_level() {
        let kernel = GaussianKernel::new(5, 1.0).unwrap();
        assert!(PyramidBuilder::with_kernel(kernel.clone(), 1).is_err());
        assert_eq!(PyramidBuilder::with_kernel(kernel, 3).unwrap().levels(), 3);
    }

    #[test]
    fn build_is_deterministic() {
        let image = create_large_test_image(48, 40);
        let first = builder(4).build(&image).unwrap();
        let second = builder(4).build(&image).unwrap();
        assert_eq!(first, second);
    }
}
