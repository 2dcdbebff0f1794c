//! Preparation steps for batch foveation: resize-and-crop and fixation
//! placement from image-relative fractions.

use image::{ImageBuffer, Pixel, Primitive};
use imageproc::definitions::{Clamp, Image};
use imageproc::drawing::draw_filled_circle_mut;
use itertools::iproduct;

use crate::error::FoveationError;
use crate::foveate_kit::eccentricity::FixationPoint;
use crate::foveate_kit::inter_area::InterAreaResize;

/// Crop size used for ImageNet-style evaluation.
pub const IMAGENET_CROP: u32 = 224;

/// Fraction of the resized image kept by the ImageNet centre crop.
pub const IMAGENET_CROP_RATIO: f32 = 0.875;

/// Square resize followed by a centred square crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CropPlan {
    /// Side length after resizing
    pub resize_to: u32,
    /// Side length after cropping
    pub crop_to: u32,
}

impl CropPlan {
    /// Create a plan.
    ///
    /// # Errors
    ///
    /// Returns [`FoveationError::InvalidParameter`] when either size is zero
    /// or the crop exceeds the resize.
    pub fn new(resize_to: u32, crop_to: u32) -> Result<Self, FoveationError> {
        if crop_to == 0 || resize_to == 0 {
            return Err(FoveationError::InvalidParameter(format!(
                "crop plan sizes must be > 0, got resize {resize_to}, crop {crop_to}"
            )));
        }
        if crop_to > resize_to {
            return Err(FoveationError::InvalidParameter(format!(
                "crop {crop_to} exceeds resize {resize_to}"
            )));
        }
        Ok(Self { resize_to, crop_to })
    }

    /// 256 → 224 plan.
    #[must_use]
    pub const fn imagenet() -> Self {
        Self {
            resize_to: 256,
            crop_to: IMAGENET_CROP,
        }
    }

    /// Plan keeping `ratio` of the resized side, i.e. `resize_to = crop / ratio`.
    ///
    /// # Errors
    ///
    /// Returns [`FoveationError::InvalidParameter`] unless `0 < ratio <= 1`.
    pub fn from_crop_ratio(crop_to: u32, ratio: f32) -> Result<Self, FoveationError> {
        if !(ratio.is_finite() && ratio > 0.0 && ratio <= 1.0) {
            return Err(FoveationError::InvalidParameter(format!(
                "crop ratio must be in (0, 1], got {ratio}"
            )));
        }
        let resize_to = (crop_to as f32 / ratio).round() as u32;
        Self::new(resize_to, crop_to)
    }

    /// Pixels dropped on each side by the crop.
    #[must_use]
    pub const fn margin(&self) -> u32 {
        self.resize_to.saturating_sub(self.crop_to) / 2
    }
}

impl Default for CropPlan {
    fn default() -> Self {
        Self::imagenet()
    }
}

/// Centred crop to `(width, height)`.
///
/// # Errors
///
/// Returns [`FoveationError::InvalidParameter`] when the crop is empty or
/// larger than the image.
pub fn center_crop<P>(image: &Image<P>, (width, height): (u32, u32)) -> Result<Image<P>, FoveationError>
where
    P: Pixel,
{
    let (src_width, src_height) = image.dimensions();
    if width == 0 || height == 0 || width > src_width || height > src_height {
        return Err(FoveationError::InvalidParameter(format!(
            "cannot crop {src_width}x{src_height} to {width}x{height}"
        )));
    }

    let left = (src_width - width) / 2;
    let top = (src_height - height) / 2;
    Ok(ImageBuffer::from_fn(width, height, |x, y| {
        *image.get_pixel(x + left, y + top)
    }))
}

/// Square resize to `plan.resize_to` followed by a centred crop to
/// `plan.crop_to`.
///
/// # Errors
///
/// Returns an error for an empty image or an invalid plan.
///
/// # Examples
/// ```
/// use foveate_kit::{CropPlan, resize_and_center_crop};
/// use image::RgbImage;
///
/// let image = RgbImage::new(500, 375);
/// let cropped = resize_and_center_crop(&image, &CropPlan::imagenet()).unwrap();
/// assert_eq!(cropped.dimensions(), (224, 224));
/// ```
pub fn resize_and_center_crop<P>(image: &Image<P>, plan: &CropPlan) -> Result<Image<P>, FoveationError>
where
    P: Pixel,
    P::Subpixel: Clamp<f32> + Primitive,
    f32: From<P::Subpixel>,
{
    let plan = CropPlan::new(plan.resize_to, plan.crop_to)?;
    let resized = InterAreaResize::new(plan.resize_to, plan.resize_to)?.resize(image)?;
    center_crop(&resized, (plan.crop_to, plan.crop_to))
}

/// Fixation at fractions `(fx, fy)` of the image size, floored to whole pixels.
///
/// A fraction of 1 lands on the last row or column, so the point is always
/// inside a non-empty image.
///
/// # Errors
///
/// Returns [`FoveationError::InvalidParameter`] for fractions outside [0, 1].
pub fn proportional_fixation(
    (width, height): (u32, u32),
    fx: f32,
    fy: f32,
) -> Result<FixationPoint, FoveationError> {
    for (name, value) in [("fx", fx), ("fy", fy)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(FoveationError::InvalidParameter(format!(
                "{name} must be in [0, 1], got {value}"
            )));
        }
    }
    let place = |size: u32, fraction: f32| {
        (size as f32 * fraction)
            .floor()
            .min(size.saturating_sub(1) as f32)
    };
    Ok(FixationPoint::new(place(width, fx), place(height, fy)))
}

/// Draw a filled disc of `radius` pixels at every fixation.
///
/// Fixations outside the image are clipped by the drawing routine.
pub fn mark_fixations<P>(image: &mut Image<P>, fixations: &[FixationPoint], radius: i32, color: P)
where
    P: Pixel,
{
    for point in fixations {
        let center = (point.x.round() as i32, point.y.round() as i32);
        draw_filled_circle_mut(image, center, radius, color);
    }
}

/// One point of a [`fixation_grid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridFixation {
    /// Column index in the grid
    pub column: usize,
    /// Row index in the grid
    pub row: usize,
    /// Fixation in pixel coordinates
    pub point: FixationPoint,
}

/// `steps`×`steps` fixations at the cell centres of an even grid, i.e.
/// fractions `1/(2·steps), 3/(2·steps), …` on each axis, column-major.
///
/// # Examples
/// ```
/// use foveate_kit::fixation_grid;
///
/// let grid = fixation_grid((100, 200), 5);
/// assert_eq!(grid.len(), 25);
/// assert_eq!((grid[0].point.x, grid[0].point.y), (10.0, 20.0));
/// ```
#[must_use]
pub fn fixation_grid((width, height): (u32, u32), steps: usize) -> Vec<GridFixation> {
    let fraction = |index: usize| (2 * index + 1) as f32 / (2 * steps) as f32;
    iproduct!(0..steps, 0..steps)
        .map(|(column, row)| GridFixation {
            column,
            row,
            point: FixationPoint::new(
                (width as f32 * fraction(column)).floor(),
                (height as f32 * fraction(row)).floor(),
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn imagenet_plan_has_expected_sizes() {
        let plan = CropPlan::imagenet();
        assert_eq!(plan.resize_to, 256);
        assert_eq!(plan.crop_to, 224);
        assert_eq!(plan.margin(), 16);
        assert_eq!(CropPlan::from_crop_ratio(224, IMAGENET_CROP_RATIO).unwrap(), plan);
    }

    #[test]
    fn crop_plan_rejects_crop_larger_than_resize() {
        assert!(CropPlan::new(100, 120).is_err());
        assert!(CropPlan::new(0, 0).is_err());
        assert!(CropPlan::from_crop_ratio(224, 0.0).is_err());
        assert!(CropPlan::from_crop_ratio(224, 1.5).is_err());
        assert_eq!(CropPlan::from_crop_ratio(100, 1.0).unwrap().margin(), 0);
    }

    #[test]
    fn center_crop_takes_middle_region() {
        let image: RgbImage = ImageBuffer::from_fn(6, 4, |x, y| Rgb([x as u8, y as u8, 0]));
        let cropped = center_crop(&image, (2, 2)).unwrap();
        assert_eq!(cropped.dimensions(), (2, 2));
        assert_eq!(cropped.get_pixel(0, 0).0, [2, 1, 0]);
        assert_eq!(cropped.get_pixel(1, 1).0, [3, 2, 0]);
        assert!(center_crop(&image, (7, 2)).is_err());
    }

    #[test]
    fn resize_and_center_crop_yields_crop_size() {
        let image = create_large_test_image(320, 240);
        let result = resize_and_center_crop(&image, &CropPlan::imagenet()).unwrap();
        assert_eq!(result.dimensions(), (224, 224));

        let uniform = create_uniform_image(50, 70, [7, 8, 9]);
        let plan = CropPlan::new(40, 32).unwrap();
        let result = resize_and_center_crop(&uniform, &plan).unwrap();
        assert!(result.pixels().all(|p| p.0 == [7, 8, 9]));
    }

    #[test]
    fn resize_and_center_crop_with_invalid_plan_returns_error() {
        let image = create_large_test_image(32, 32);
        let plan = CropPlan {
            resize_to: 16,
            crop_to: 20,
        };
        assert!(matches!(
            resize_and_center_crop(&image, &plan),
            Err(FoveationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn proportional_fixation_floors_coordinates() {
        let point = proportional_fixation((225, 101), 0.5, 0.5).unwrap();
        assert_eq!(point, FixationPoint::new(112.0, 50.0));
        assert_eq!(
            proportional_fixation((10, 10), 1.0, 0.0).unwrap(),
            FixationPoint::new(9.0, 0.0)
        );
        assert!(proportional_fixation((10, 10), 1.2, 0.5).is_err());
    }

    #[test]
    fn fixation_grid_covers_cell_centres() {
        let grid = fixation_grid((224, 224), 5);
        assert_eq!(grid.len(), 25);
        assert_eq!((grid[0].column, grid[0].row), (0, 0));
        assert_eq!((grid[1].column, grid[1].row), (0, 1));
        assert_eq!(grid[24].point, FixationPoint::new(201.0, 201.0));
        assert!(grid.iter().all(|g| g.point.x < 224.0 && g.point.y < 224.0));
    }

    #[test]
    fn proportional_fixation_with_full_fraction_stays_inside_image() {
        let point = proportional_fixation((224, 100), 1.0, 1.0).unwrap();
        assert_eq!(point, FixationPoint::new(223.0, 99.0));
        crate::foveate_kit::eccentricity::validate_fixations(&[point], (224, 100), true).unwrap();
    }

    #[test]
    fn mark_fixations_paints_disc_at_each_fixation() {
        let mut image = create_uniform_image(40, 30, [0, 0, 0]);
        let fixations = [FixationPoint::new(10.0, 10.0), FixationPoint::new(30.0, 20.0)];
        mark_fixations(&mut image, &fixations, 3, Rgb([255, 0, 0]));

        assert_eq!(image.get_pixel(10, 10).0, [255, 0, 0]);
        assert_eq!(image.get_pixel(12, 10).0, [255, 0, 0]);
        assert_eq!(image.get_pixel(30, 20).0, [255, 0, 0]);
        assert_eq!(image.get_pixel(20, 15).0, [0, 0, 0]);
        assert_eq!(image.get_pixel(0, 29).0, [0, 0, 0]);
    }
}
