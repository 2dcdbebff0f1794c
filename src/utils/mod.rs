//! Internal utility functions for foveate-kit.
//!
//! This module contains common functionality used across the pipeline stages.

use image::{ImageBuffer, Primitive, Rgb};
use imageproc::definitions::{Clamp, Image};

use crate::error::FoveationError;

/// Validates that an image has non-zero dimensions.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
/// * `context` - A description of the context for error messages
pub fn validate_non_empty_image(
    width: u32,
    height: u32,
    context: &str,
) -> Result<(), FoveationError> {
    if width == 0 || height == 0 {
        Err(FoveationError::InvalidParameter(format!(
            "{context}: Image dimensions must be non-zero, got {width}x{height}"
        )))
    } else {
        Ok(())
    }
}

/// Validates that two grids have matching dimensions.
pub fn validate_matching_dimensions(
    expected: (u32, u32),
    actual: (u32, u32),
) -> Result<(), FoveationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(FoveationError::DimensionMismatch { expected, actual })
    }
}

/// Converts an RGB image of any primitive subpixel to `f32`, keeping the
/// original sample range.
pub fn to_f32_image<S>(image: &Image<Rgb<S>>) -> Image<Rgb<f32>>
where
    Rgb<S>: image::Pixel<Subpixel = S>,
    S: Primitive,
    f32: From<S>,
{
    let (width, height) = image.dimensions();
    let data = image.as_raw().iter().map(|&v| f32::from(v)).collect();
    // Length is preserved by the map above
    ImageBuffer::from_raw(width, height, data).unwrap_or_else(|| ImageBuffer::new(width, height))
}

/// Converts a floating-point sample back into the subpixel range.
///
/// Integer subpixels are rounded to nearest then saturated; floating-point
/// subpixels are only clamped.
#[inline]
pub fn quantize<S>(value: f32) -> S
where
    S: Clamp<f32> + Primitive,
    f32: From<S>,
{
    if f32::from(S::DEFAULT_MAX_VALUE) > 1.0 {
        S::clamp(value.round())
    } else {
        S::clamp(value)
    }
}
