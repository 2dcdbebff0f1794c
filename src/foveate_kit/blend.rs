use image::{ImageBuffer, Luma};
use imageproc::definitions::Image;

use crate::error::FoveationError;
use crate::foveate_kit::acuity::AcuityMaps;

/// Guard added to the transition denominator.
pub const TRANSITION_EPSILON: f32 = 1e-5;

/// Progress across the band between a level and the next blurrier one.
///
/// `t_current` and `t_next` are the visibility curves of the two levels at
/// the pixel. The result is clamped to [0, 1].
#[inline]
#[must_use]
pub fn transition_fraction(t_current: f32, t_next: f32) -> f32 {
    ((0.5 - t_next) / (t_current - t_next + TRANSITION_EPSILON)).clamp(0.0, 1.0)
}

/// Per-level blend weights; at every pixel they sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendMasks {
    masks: Vec<Image<Luma<f32>>>,
}

impl BlendMasks {
    /// Turn a layer assignment into crossfade weights.
    ///
    /// A pixel on layer 0 takes level 0 only. A pixel on layer `l > 0` splits
    /// between level `l` and `l - 1` by the transition fraction `b` of level
    /// `l - 1`: `M_l = 1 - b`, `M_{l-1} = b`.
    #[must_use]
    pub fn compute(maps: &AcuityMaps) -> Self {
        let (width, height) = maps.dimensions();
        let levels = maps.levels();
        let mut masks: Vec<Image<Luma<f32>>> =
            (0..levels).map(|_| ImageBuffer::new(width, height)).collect();

        for (x, y, layer) in maps.layer_index().enumerate_pixels() {
            let layer = usize::from(layer[0]);
            if layer == 0 {
                masks[0].put_pixel(x, y, Luma([1.0]));
                continue;
            }

            let t_current = maps.thresholds()[layer - 1].get_pixel(x, y)[0];
            let t_next = maps.thresholds()[layer].get_pixel(x, y)[0];
            let b = transition_fraction(t_current, t_next);

            masks[layer].put_pixel(x, y, Luma([1.0 - b]));
            masks[layer - 1].put_pixel(x, y, Luma([b]));
        }

        Self { masks }
    }

    /// Masks that select a single `level` everywhere.
    ///
    /// # Errors
    ///
    /// Returns [`FoveationError::InvalidParameter`] when `level >= levels`.
    pub fn single_level(
        levels: usize,
        (width, height): (u32, u32),
        level: usize,
    ) -> Result<Self, FoveationError> {
        if level >= levels {
            return Err(FoveationError::InvalidParameter(format!(
                "level {level} out of range for {levels} levels"
            )));
        }
        let masks = (0..levels)
            .map(|i| ImageBuffer::from_pixel(width, height, Luma([if i == level { 1.0 } else { 0.0 }])))
            .collect();
        Ok(Self { masks })
    }

    /// Number of masks.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.masks.len()
    }

    /// Shared (width, height) of every mask.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.masks.first().map_or((0, 0), |mask| mask.dimensions())
    }

    /// Mask of `level`.
    #[must_use]
    pub fn mask(&self, level: usize) -> Option<&Image<Luma<f32>>> {
        self.masks.get(level)
    }

    /// All masks, level 0 first.
    #[must_use]
    pub fn masks(&self) -> &[Image<Luma<f32>>] {
        &self.masks
    }

    /// Sum of all weights at `(x, y)`.
    #[must_use]
    pub fn weight_sum(&self, x: u32, y: u32) -> f32 {
        self.masks.iter().map(|m| m.get_pixel(x, y)[0]).sum()
    }

    /// Pixels rendered purely from level 0.
    #[must_use]
    pub fn full_resolution_pixels(&self) -> usize {
        self.masks
            .first()
            .map_or(0, |m| m.pixels().filter(|p| p[0] == 1.0).count())
    }

    /// Pixels blended from two levels.
    #[must_use]
    pub fn transition_pixels(&self) -> usize {
        let (width, height) = self.dimensions();
        (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|&(x, y)| {
                self.masks.iter().any(|m| {
                    let w = m.get_pixel(x, y)[0];
                    w > 0.0 && w < 1.0
                })
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FoveationConfig;
    use crate::foveate_kit::acuity::AcuityModel;
    use crate::foveate_kit::eccentricity::{FixationPoint, compute_eccentricity};

    fn masks_for(config: &FoveationConfig, size: (u32, u32), fixations: &[FixationPoint]) -> BlendMasks {
        let theta = compute_eccentricity(size, fixations, config.blur_strength).unwrap();
        let maps = AcuityModel::new(config).unwrap().evaluate(&theta);
        BlendMasks::compute(&maps)
    }

    #[test]
    fn transition_fraction_spans_band() {
        // Entering the band from the sharper side
        assert!((transition_fraction(0.5, 0.1) - 1.0).abs() < 1e-3);
        // Leaving the band towards the blurrier side
        assert_eq!(transition_fraction(0.9, 0.5), 0.0);
        let mid = transition_fraction(0.8, 0.2);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn transition_fraction_guards_equal_curves() {
        assert!(transition_fraction(0.5, 0.5).is_finite());
        assert_eq!(transition_fraction(0.0, 0.0), 1.0);
    }

    #[test]
    fn compute_masks_partition_unity() {
        let config = FoveationConfig::default();
        let fixations = [FixationPoint::new(20.0, 30.0), FixationPoint::new(90.0, 60.0)];
        let masks = masks_for(&config, (120, 80), &fixations);

        assert_eq!(masks.levels(), 6);
        for y in 0..80 {
            for x in 0..120 {
                let sum = masks.weight_sum(x, y);
                assert!((sum - 1.0).abs() < 1e-5, "({x}, {y}): {sum}");
            }
        }
        for mask in masks.masks() {
            assert!(mask.pixels().all(|p| (0.0..=1.0).contains(&p[0])));
        }
    }

    #[test]
    fn compute_masks_select_level_zero_at_fixation() {
        let masks = masks_for(&FoveationConfig::default(), (100, 100), &[FixationPoint::new(50.0, 50.0)]);
        assert_eq!(masks.mask(0).unwrap().get_pixel(50, 50)[0], 1.0);
        for level in 1..6 {
            assert_eq!(masks.mask(level).unwrap().get_pixel(50, 50)[0], 0.0);
        }
        assert!(masks.full_resolution_pixels() >= 1);
    }

    #[test]
    fn compute_masks_shift_weight_to_blurrier_levels_in_periphery() {
        let masks = masks_for(&FoveationConfig::default(), (100, 100), &[FixationPoint::new(50.0, 50.0)]);
        let level0_corner = masks.mask(0).unwrap().get_pixel(0, 0)[0];
        assert_eq!(level0_corner, 0.0);
        let weighted_level: f32 = (0..6)
            .map(|l| l as f32 * masks.mask(l).unwrap().get_pixel(0, 0)[0])
            .sum();
        assert!(weighted_level > 2.0, "{weighted_level}");
    }

    #[test]
    fn transition_band_narrows_as_sharpness_grows() {
        let fixation = [FixationPoint::new(50.0, 50.0)];
        let counts: Vec<usize> = [1.0, 3.0, 6.0, 12.0, 24.0]
            .into_iter()
            .map(|k| {
                let config = FoveationConfig::default().with_sharpness(k);
                masks_for(&config, (100, 100), &fixation).transition_pixels()
            })
            .collect();
        assert!(counts.windows(2).all(|w| w[1] <= w[0]), "{counts:?}");
        assert!(counts[4] < counts[0], "{counts:?}");
    }

    #[test]
    fn single_level_selects_one_level_everywhere() {
        let masks = BlendMasks::single_level(4, (5, 3), 0).unwrap();
        assert_eq!(masks.dimensions(), (5, 3));
        assert_eq!(masks.full_resolution_pixels(), 15);
        assert_eq!(masks.transition_pixels(), 0);
        assert!(BlendMasks::single_level(4, (5, 3), 4).is_err());
    }
}
