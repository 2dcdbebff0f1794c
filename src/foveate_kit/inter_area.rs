use image::{ImageBuffer, Pixel, Primitive};
use imageproc::definitions::{Clamp, Image};
use itertools::Itertools;

use crate::error::InterAreaError;
use crate::utils::quantize;

/// Element of the per-axis weight table.
#[derive(Debug, Clone, Copy)]
pub struct InterpolationWeight {
    /// Destination index
    pub destination_index: u32,
    /// Source index
    pub source_index: u32,
    /// Weight value
    pub weight: f32,
}

/// OpenCV `INTER_AREA` style resampler.
///
/// A shrinking axis averages every source pixel the destination cell covers,
/// weighted by overlap. A growing axis interpolates linearly between the two
/// nearest source centres, as `INTER_AREA` does for upscaling. An unchanged
/// axis is copied.
pub struct InterAreaResize {
    /// New width
    pub new_width: u32,
    /// New height
    pub new_height: u32,
}

impl InterAreaResize {
    /// Create a new resizer.
    pub const fn new(new_width: u32, new_height: u32) -> Result<Self, InterAreaError> {
        if new_width == 0 || new_height == 0 {
            return Err(InterAreaError::InvalidTargetDimensions {
                width: new_width,
                height: new_height,
            });
        }
        Ok(Self {
            new_width,
            new_height,
        })
    }
}

/// Compute the weight table for one axis.
fn compute_axis_weights(src_size: u32, dst_size: u32) -> Vec<InterpolationWeight> {
    match dst_size.cmp(&src_size) {
        std::cmp::Ordering::Less => compute_area_weights(src_size, dst_size),
        std::cmp::Ordering::Greater => compute_linear_weights(src_size, dst_size),
        std::cmp::Ordering::Equal => (0..dst_size)
            .map(|i| InterpolationWeight {
                destination_index: i,
                source_index: i,
                weight: 1.0,
            })
            .collect(),
    }
}

/// Area decimation table.
///
/// Destination cell `d` covers `[d·scale, (d+1)·scale)` in source space; each
/// source pixel contributes its overlap with that interval divided by the
/// covered length.
fn compute_area_weights(src_size: u32, dst_size: u32) -> Vec<InterpolationWeight> {
    let scale = f64::from(src_size) / f64::from(dst_size);

    (0..dst_size)
        .flat_map(|dx| {
            let start = f64::from(dx) * scale;
            let end = (start + scale).min(f64::from(src_size));
            let cell_width = end - start;

            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src_size);

            (first..last).filter_map(move |sx| {
                let overlap = (end.min(f64::from(sx + 1)) - start.max(f64::from(sx))).max(0.0);
                (overlap > 1e-3).then(|| InterpolationWeight {
                    destination_index: dx,
                    source_index: sx,
                    weight: (overlap / cell_width) as f32,
                })
            })
        })
        .collect()
}

/// Linear interpolation table with half-pixel centres, clamped at the edges.
fn compute_linear_weights(src_size: u32, dst_size: u32) -> Vec<InterpolationWeight> {
    let scale = f64::from(src_size) / f64::from(dst_size);
    let last = src_size - 1;

    (0..dst_size)
        .flat_map(|dx| {
            let fx = (f64::from(dx) + 0.5).mul_add(scale, -0.5);
            let (sx, t) = if fx <= 0.0 {
                (0, 0.0)
            } else {
                let base = fx.floor();
                let base_index = base as u32;
                if base_index >= last {
                    (last, 0.0)
                } else {
                    (base_index, (fx - base) as f32)
                }
            };

            let near = InterpolationWeight {
                destination_index: dx,
                source_index: sx,
                weight: 1.0 - t,
            };
            let far = (t > 0.0).then(|| InterpolationWeight {
                destination_index: dx,
                source_index: sx + 1,
                weight: t,
            });
            std::iter::once(near).chain(far)
        })
        .collect()
}

/// Separable resampling driven by the two weight tables.
fn resize_separable_impl<P>(src: &Image<P>, dst_width: u32, dst_height: u32) -> Image<P>
where
    P: Pixel,
    P::Subpixel: Clamp<f32> + Primitive,
    f32: From<P::Subpixel>,
{
    let (src_width, src_height) = src.dimensions();
    let x_weights = compute_axis_weights(src_width, dst_width);
    let y_weights = compute_axis_weights(src_height, dst_height);

    let channels = P::CHANNEL_COUNT as usize;
    let src_buffer = src.as_raw();
    let src_stride = src_width as usize * channels;
    let dst_stride = dst_width as usize * channels;

    let mut output: Image<P> = ImageBuffer::new(dst_width, dst_height);
    let out_buffer: &mut [P::Subpixel] = &mut output;
    let mut row_accumulator = vec![0.0f32; dst_stride];

    for (dy, y_group) in &y_weights.iter().chunk_by(|w| w.destination_index) {
        row_accumulator.fill(0.0);

        for y_entry in y_group {
            let row = &src_buffer[y_entry.source_index as usize * src_stride..][..src_stride];
            let beta = y_entry.weight;

            for x_entry in &x_weights {
                let weight = x_entry.weight * beta;
                let src_px = &row[x_entry.source_index as usize * channels..][..channels];
                let dst_px = &mut row_accumulator
                    [x_entry.destination_index as usize * channels..][..channels];

                for (acc, &value) in dst_px.iter_mut().zip(src_px) {
                    *acc += f32::from(value) * weight;
                }
            }
        }

        let out_row = &mut out_buffer[dy as usize * dst_stride..][..dst_stride];
        for (out, &value) in out_row.iter_mut().zip(&row_accumulator) {
            *out = quantize(value);
        }
    }

    output
}

impl InterAreaResize {
    /// Resize an image.
    ///
    /// # Errors
    ///
    /// Returns [`InterAreaError::EmptyImage`] when the source has no pixels.
    pub fn resize<P>(&self, src: &Image<P>) -> Result<Image<P>, InterAreaError>
    where
        P: Pixel,
        P::Subpixel: Clamp<f32> + Primitive,
        f32: From<P::Subpixel>,
    {
        let (src_width, src_height) = src.dimensions();

        if src_width == 0 || src_height == 0 {
            return Err(InterAreaError::EmptyImage {
                width: src_width,
                height: src_height,
            });
        }

        if (src_width, src_height) == (self.new_width, self.new_height) {
            return Ok(src.clone());
        }

        Ok(resize_separable_impl(src, self.new_width, self.new_height))
    }
}

/// Extension trait for `ImageBuffer` to provide `INTER_AREA` resizing.
pub trait InterAreaResizeExt<P>
where
    P: Pixel,
{
    /// Resize the image, consuming it.
    ///
    /// # Examples
    /// ```
    /// use foveate_kit::InterAreaResizeExt;
    /// use image::{Rgb, RgbImage};
    ///
    /// let image = RgbImage::from_pixel(8, 6, Rgb([40, 80, 120]));
    /// let resized = image.resize_area(4, 3).unwrap();
    /// assert_eq!(resized.dimensions(), (4, 3));
    /// ```
    fn resize_area(self, new_width: u32, new_height: u32) -> Result<Self, InterAreaError>
    where
        Self: Sized;
}

impl<P> InterAreaResizeExt<P> for Image<P>
where
    P: Pixel,
    P::Subpixel: Clamp<f32> + Primitive,
    f32: From<P::Subpixel>,
{
    fn resize_area(self, new_width: u32, new_height: u32) -> Result<Self, InterAreaError> {
        let resizer = InterAreaResize::new(new_width, new_height)?;
        if self.dimensions() == (new_width, new_height) {
            return Ok(self);
        }
        resizer.resize(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn weight_sums(table: &[InterpolationWeight], dst_size: u32) -> Vec<f32> {
        let mut sums = vec![0.0; dst_size as usize];
        for entry in table {
            sums[entry.destination_index as usize] += entry.weight;
        }
        sums
    }

    #[test]
    fn compute_area_weights_with_halving_averages_pairs() {
        let table = compute_area_weights(4, 2);
        assert_eq!(table.len(), 4);
        for entry in &table {
            assert_eq!(entry.source_index / 2, entry.destination_index);
            assert!((entry.weight - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn compute_area_weights_with_fractional_scale_are_normalized() {
        for (src, dst) in [(7, 3), (5, 2), (100, 1), (101, 50)] {
            let table = compute_area_weights(src, dst);
            for (d, sum) in weight_sums(&table, dst).into_iter().enumerate() {
                assert!((sum - 1.0).abs() < 1e-5, "{src}->{dst} [{d}]: {sum}");
            }
            assert!(table.iter().all(|w| w.weight > 0.0 && w.weight <= 1.0));
        }
    }

    #[test]
    fn compute_linear_weights_are_normalized_and_in_range() {
        for (src, dst) in [(1, 4), (2, 4), (3, 6), (25, 101), (50, 101)] {
            let table = compute_linear_weights(src, dst);
            for sum in weight_sums(&table, dst) {
                assert!((sum - 1.0).abs() < 1e-5);
            }
            assert!(table.iter().all(|w| w.source_index < src));
        }
    }

    #[test]
    fn compute_linear_weights_with_doubling_uses_quarter_offsets() {
        let table = compute_linear_weights(2, 4);
        // dst 1 maps to source 0.25, dst 2 to 0.75
        let dst1: Vec<_> = table.iter().filter(|w| w.destination_index == 1).collect();
        assert_eq!(dst1.len(), 2);
        assert!((dst1[0].weight - 0.75).abs() < 1e-6);
        assert!((dst1[1].weight - 0.25).abs() < 1e-6);
    }

    #[test]
    fn resize_with_downscale_produces_correct_dimensions() {
        let src = ImageBuffer::from_fn(8, 8, |x, y| Rgb([((x + y) * 16) as u8, 100, 150]));
        let result = InterAreaResize::new(4, 4).unwrap().resize(&src).unwrap();
        assert_eq!(result.dimensions(), (4, 4));
        assert_eq!(result.get_pixel(0, 0).0, [16, 100, 150]);
    }

    #[test]
    fn resize_with_upscale_produces_correct_dimensions() {
        let src = ImageBuffer::from_fn(3, 2, |x, _| Rgb([(x * 100) as u8, 7, 9]));
        let result = src.resize_area(7, 5).unwrap();
        assert_eq!(result.dimensions(), (7, 5));
        assert_eq!(result.get_pixel(0, 0).0, [0, 7, 9]);
        assert_eq!(result.get_pixel(6, 4).0, [200, 7, 9]);
    }

    #[test]
    fn resize_with_mixed_axes_keeps_uniform_image_uniform() {
        let src: Image<Rgb<f32>> = ImageBuffer::from_pixel(10, 3, Rgb([12.5, 60.0, 255.0]));
        let result = InterAreaResize::new(4, 9).unwrap().resize(&src).unwrap();
        assert_eq!(result.dimensions(), (4, 9));
        for p in result.pixels() {
            assert!((p[0] - 12.5).abs() < 1e-4);
            assert!((p[1] - 60.0).abs() < 1e-4);
            assert!((p[2] - 255.0).abs() < 1e-3);
        }
    }

    #[test]
    fn resize_with_same_size_returns_copy() {
        let src = ImageBuffer::from_fn(5, 5, |x, y| Rgb([(x * y) as u8, 1, 2]));
        let result = InterAreaResize::new(5, 5).unwrap().resize(&src).unwrap();
        assert_eq!(result, src);
    }

    #[test]
    fn inter_area_resize_new_zero_dimension_returns_error() {
        assert!(InterAreaResize::new(0, 100).is_err());
        assert!(InterAreaResize::new(100, 0).is_err());
    }

    #[test]
    fn resize_empty_image_returns_error() {
        let src: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(0, 100);
        let result = InterAreaResize::new(50, 50).unwrap().resize(&src);
        assert_eq!(
            result,
            Err(InterAreaError::EmptyImage {
                width: 0,
                height: 100
            })
        );
    }
}
