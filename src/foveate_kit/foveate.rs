use image::{Primitive, Rgb};
use imageproc::definitions::{Clamp, Image};
use log::debug;

use crate::config::FoveationConfig;
use crate::error::FoveationError;
use crate::foveate_kit::acuity::{AcuityMaps, AcuityModel};
use crate::foveate_kit::blend::BlendMasks;
use crate::foveate_kit::compositor::composite;
use crate::foveate_kit::eccentricity::{FixationPoint, compute_eccentricity, validate_fixations};
use crate::foveate_kit::pyramid::PyramidBuilder;
use crate::utils::validate_non_empty_image;

/// Foveated renderer.
///
/// Holds the kernel and acuity model derived from a [`FoveationConfig`] so
/// they are built once and reused across images.
#[derive(Debug, Clone)]
pub struct Foveator {
    config: FoveationConfig,
    pyramid_builder: PyramidBuilder,
    acuity: AcuityModel,
}

impl Foveator {
    /// Create a renderer.
    ///
    /// # Errors
    ///
    /// Returns [`FoveationError::InvalidParameter`] for an invalid config.
    pub fn new(config: FoveationConfig) -> Result<Self, FoveationError> {
        Ok(Self {
            config,
            pyramid_builder: PyramidBuilder::new(&config)?,
            acuity: AcuityModel::new(&config)?,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &FoveationConfig {
        &self.config
    }

    /// Acuity model in use.
    #[must_use]
    pub const fn acuity_model(&self) -> &AcuityModel {
        &self.acuity
    }

    /// Resolution, visibility and layer maps for an image of `dimensions`.
    ///
    /// # Errors
    ///
    /// Returns an error for empty dimensions or invalid fixations.
    pub fn acuity_maps(
        &self,
        (width, height): (u32, u32),
        fixations: &[FixationPoint],
    ) -> Result<AcuityMaps, FoveationError> {
        validate_non_empty_image(width, height, "Foveator")?;
        validate_fixations(fixations, (width, height), self.config.strict_bounds)?;

        let theta = compute_eccentricity((width, height), fixations, self.config.blur_strength)?;
        Ok(self.acuity.evaluate(&theta))
    }

    /// Blend masks for an image of `dimensions`.
    ///
    /// # Errors
    ///
    /// Same as [`Foveator::acuity_maps`].
    pub fn masks(
        &self,
        dimensions: (u32, u32),
        fixations: &[FixationPoint],
    ) -> Result<BlendMasks, FoveationError> {
        self.acuity_maps(dimensions, fixations).map(|maps| BlendMasks::compute(&maps))
    }

    /// Render `image` as seen from `fixations`.
    ///
    /// The output keeps the input's dimensions and sample type. Pixels near a
    /// fixation are copied from the input; farther pixels crossfade into
    /// progressively blurrier pyramid levels.
    ///
    /// # Errors
    ///
    /// * [`FoveationError::EmptyFixations`] or [`FoveationError::NonFiniteFixation`]
    /// * [`FoveationError::FixationOutOfBounds`] with `strict_bounds`
    /// * [`FoveationError::ImageTooSmall`] when the pyramid does not fit
    ///
    /// # Examples
    /// ```no_run
    /// use foveate_kit::{FixationPoint, FoveationConfig, Foveator};
    /// use image::RgbImage;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image = RgbImage::new(224, 224);
    /// let foveator = Foveator::new(FoveationConfig::default())?;
    /// let rendered = foveator.foveate(&image, &[FixationPoint::new(112.0, 112.0)])?;
    /// assert_eq!(rendered.dimensions(), (224, 224));
    /// # Ok(())
    /// # }
    /// ```
    pub fn foveate<S>(
        &self,
        image: &Image<Rgb<S>>,
        fixations: &[FixationPoint],
    ) -> Result<Image<Rgb<S>>, FoveationError>
    where
        Rgb<S>: image::Pixel<Subpixel = S>,
        S: Clamp<f32> + Primitive,
        f32: From<S>,
    {
        let dimensions = image.dimensions();
        let masks = self.masks(dimensions, fixations)?;
        let pyramid = self.pyramid_builder.build(image)?;

        debug!(
            "foveating {}x{} with {} fixation(s): {} full-resolution pixels",
            dimensions.0,
            dimensions.1,
            fixations.len(),
            masks.full_resolution_pixels()
        );

        composite(&pyramid, &masks)
    }
}

/// One-shot [`Foveator::foveate`].
///
/// # Errors
///
/// Same as [`Foveator::new`] and [`Foveator::foveate`].
pub fn foveate_image<S>(
    image: &Image<Rgb<S>>,
    fixations: &[FixationPoint],
    config: &FoveationConfig,
) -> Result<Image<Rgb<S>>, FoveationError>
where
    Rgb<S>: image::Pixel<Subpixel = S>,
    S: Clamp<f32> + Primitive,
    f32: From<S>,
{
    Foveator::new(*config)?.foveate(image, fixations)
}

/// Extension trait for `ImageBuffer` to provide fluent foveation.
pub trait FoveateExt<S> {
    /// Foveate the image, consuming it.
    fn foveate(
        self,
        fixations: &[FixationPoint],
        config: &FoveationConfig,
    ) -> Result<Self, FoveationError>
    where
        Self: Sized;

    /// Foveate the image in place.
    fn foveate_mut(
        &mut self,
        fixations: &[FixationPoint],
        config: &FoveationConfig,
    ) -> Result<&mut Self, FoveationError>;
}

impl<S> FoveateExt<S> for Image<Rgb<S>>
where
    Rgb<S>: image::Pixel<Subpixel = S>,
    S: Clamp<f32> + Primitive,
    f32: From<S>,
{
    fn foveate(
        self,
        fixations: &[FixationPoint],
        config: &FoveationConfig,
    ) -> Result<Self, FoveationError> {
        foveate_image(&self, fixations, config)
    }

    fn foveate_mut(
        &mut self,
        fixations: &[FixationPoint],
        config: &FoveationConfig,
    ) -> Result<&mut Self, FoveationError> {
        *self = foveate_image(self, fixations, config)?;
        Ok(self)
    }
}
