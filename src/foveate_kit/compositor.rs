use image::{ImageBuffer, Primitive, Rgb};
use imageproc::definitions::{Clamp, Image};
use itertools::izip;

use crate::error::FoveationError;
use crate::foveate_kit::blend::BlendMasks;
use crate::foveate_kit::pyramid::Pyramid;
use crate::utils::{quantize, validate_matching_dimensions};

/// Weighted sum of pyramid levels, `Σ_i M_i · level_i`, quantized to `S`.
///
/// Levels are accumulated in `f32` sharpest first and converted once at the
/// end, rounding to nearest for integer subpixels.
///
/// # Errors
///
/// * [`FoveationError::LevelCountMismatch`] when the mask and level counts differ
/// * [`FoveationError::DimensionMismatch`] when a mask or level has another size
pub fn composite<S>(pyramid: &Pyramid, masks: &BlendMasks) -> Result<Image<Rgb<S>>, FoveationError>
where
    Rgb<S>: image::Pixel<Subpixel = S>,
    S: Clamp<f32> + Primitive,
    f32: From<S>,
{
    if pyramid.len() != masks.levels() {
        return Err(FoveationError::LevelCountMismatch {
            expected: pyramid.len(),
            actual: masks.levels(),
        });
    }

    let (width, height) = pyramid.dimensions();
    for (level, mask) in pyramid.levels().iter().zip(masks.masks()) {
        validate_matching_dimensions((width, height), level.dimensions())?;
        validate_matching_dimensions((width, height), mask.dimensions())?;
    }

    let mut accumulator = vec![0.0f32; width as usize * height as usize * 3];
    for (level, mask) in pyramid.levels().iter().zip(masks.masks()) {
        for (acc, px, weight) in izip!(accumulator.chunks_exact_mut(3), level.pixels(), mask.pixels()) {
            let weight = weight[0];
            if weight == 0.0 {
                continue;
            }
            for (a, &v) in acc.iter_mut().zip(px.0.iter()) {
                *a += weight * v;
            }
        }
    }

    let data: Vec<S> = accumulator.into_iter().map(quantize).collect();
    ImageBuffer::from_raw(width, height, data).ok_or_else(|| {
        FoveationError::InvalidParameter(format!(
            "compositor buffer does not fit {width}x{height}"
        ))
    })
}
