use image::{ImageBuffer, Luma};
use imageproc::definitions::Image;

use crate::error::FoveationError;

/// Simulated gaze location in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixationPoint {
    /// Column
    pub x: f32,
    /// Row
    pub y: f32,
}

impl FixationPoint {
    /// Create a fixation at `(x, y)`.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to pixel `(px, py)`.
    #[inline]
    #[must_use]
    pub fn distance_to(&self, px: f32, py: f32) -> f32 {
        (px - self.x).hypot(py - self.y)
    }
}

impl From<(f32, f32)> for FixationPoint {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<(u32, u32)> for FixationPoint {
    fn from((x, y): (u32, u32)) -> Self {
        Self::new(x as f32, y as f32)
    }
}

/// Check a fixation list before use.
///
/// Coordinates outside `width`×`height` are only rejected when `strict` is
/// set; otherwise they act as off-image gaze points.
///
/// # Errors
///
/// * [`FoveationError::EmptyFixations`] for an empty list
/// * [`FoveationError::NonFiniteFixation`] for NaN or infinite coordinates
/// * [`FoveationError::FixationOutOfBounds`] in strict mode
pub fn validate_fixations(
    fixations: &[FixationPoint],
    (width, height): (u32, u32),
    strict: bool,
) -> Result<(), FoveationError> {
    if fixations.is_empty() {
        return Err(FoveationError::EmptyFixations);
    }

    for &FixationPoint { x, y } in fixations {
        if !(x.is_finite() && y.is_finite()) {
            return Err(FoveationError::NonFiniteFixation { x, y });
        }
        let inside = (0.0..width as f32).contains(&x) && (0.0..height as f32).contains(&y);
        if strict && !inside {
            return Err(FoveationError::FixationOutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
    }

    Ok(())
}

/// Distance from every pixel to its nearest fixation, divided by
/// `blur_strength`.
///
/// # Errors
///
/// Returns [`FoveationError::EmptyFixations`] for an empty list and
/// [`FoveationError::InvalidParameter`] for a non-positive `blur_strength`.
///
/// # Examples
/// ```
/// use foveate_kit::{FixationPoint, compute_eccentricity};
///
/// let theta = compute_eccentricity((8, 8), &[FixationPoint::new(0.0, 0.0)], 1.0).unwrap();
/// assert_eq!(theta.get_pixel(0, 0)[0], 0.0);
/// assert_eq!(theta.get_pixel(3, 4)[0], 5.0);
/// ```
pub fn compute_eccentricity(
    (width, height): (u32, u32),
    fixations: &[FixationPoint],
    blur_strength: f32,
) -> Result<Image<Luma<f32>>, FoveationError> {
    if fixations.is_empty() {
        return Err(FoveationError::EmptyFixations);
    }
    if !(blur_strength.is_finite() && blur_strength > 0.0) {
        return Err(FoveationError::InvalidParameter(format!(
            "blur_strength must be finite and > 0, got {blur_strength}"
        )));
    }

    Ok(ImageBuffer::from_fn(width, height, |x, y| {
        let (px, py) = (x as f32, y as f32);
        let nearest = fixations
            .iter()
            .map(|f| f.distance_to(px, py))
            .fold(f32::INFINITY, f32::min);
        Luma([nearest / blur_strength])
    }))
}
