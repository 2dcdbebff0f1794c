//! # foveate-kit
//!
//! Foveated rendering for RGB images: simulate how a scene looks to a viewer
//! fixating on one or more points, sharp at the gaze and progressively
//! blurrier towards the periphery.
//!
//! The pipeline has five stages:
//!
//! - **Gaussian Pyramid**: blur-and-halve, then upsample every level back to full size
//! - **Eccentricity**: distance from every pixel to its nearest fixation
//! - **Acuity Model**: per-pixel resolution, visibility curves and layer assignment
//! - **Blend Masks**: crossfade weights between adjacent levels, summing to one
//! - **Compositing**: weighted sum of the pyramid levels
//!
//! Supporting operations cover `INTER_AREA` resizing, centre cropping and
//! fixation placement from image-relative fractions.
//!
//! ## Example Usage
//!
//! ```no_run
//! use foveate_kit::{FixationPoint, FoveateExt, FoveationConfig, Foveator, InterAreaResizeExt};
//! use imageproc::definitions::Image;
//! use image::Rgb;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Single fixation at the centre
//! let image: Image<Rgb<u8>> = Image::new(224, 224);
//! let config = FoveationConfig::default();
//! let rendered = image.foveate(&[FixationPoint::new(112.0, 112.0)], &config)?;
//!
//! // Reuse one renderer for several images and fixation sets
//! let foveator = Foveator::new(config.with_sharpness(5.0))?;
//! let fixations = [FixationPoint::new(40.0, 60.0), FixationPoint::new(180.0, 150.0)];
//! let rendered = foveator.foveate(&rendered, &fixations)?;
//!
//! // INTER_AREA resize
//! let resized = rendered.resize_area(112, 112)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `serde`: Enables serialization support for configuration types (optional)
//! - `cli`: Builds the `foveate` batch binary (default)

mod config;
mod error;
mod foveate_kit;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::{
    DEFAULT_BLUR_STRENGTH, DEFAULT_FOVEA_SIZE, DEFAULT_KERNEL_WIDTH, DEFAULT_LEVELS,
    DEFAULT_SHARPNESS, DEFAULT_SIGMA, FoveationConfig, MAX_LEVELS,
};
pub use error::{FoveationError, InterAreaError};
pub use foveate_kit::acuity::{AcuityMaps, AcuityModel};
pub use foveate_kit::blend::{BlendMasks, TRANSITION_EPSILON, transition_fraction};
pub use foveate_kit::compositor::composite;
pub use foveate_kit::eccentricity::{FixationPoint, compute_eccentricity, validate_fixations};
pub use foveate_kit::foveate::{FoveateExt, Foveator, foveate_image};
pub use foveate_kit::inter_area::{InterAreaResize, InterAreaResizeExt, InterpolationWeight};
pub use foveate_kit::kernel::GaussianKernel;
pub use foveate_kit::preprocess::{
    CropPlan, GridFixation, IMAGENET_CROP, IMAGENET_CROP_RATIO, center_crop, fixation_grid,
    mark_fixations, proportional_fixation, resize_and_center_crop,
};
pub use foveate_kit::pyramid::{Pyramid, PyramidBuilder};

// Re-export imageproc::definitions::Image for convenience
pub use imageproc::definitions::Image;
