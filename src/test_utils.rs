//! Shared image fixtures for unit tests.

use image::{ImageBuffer, Rgb};
use imageproc::definitions::Image;

/// Image with a deterministic mix of gradients on every channel.
pub fn create_large_test_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 7 + y * 3) % 256) as u8,
            ((x * y + 11) % 256) as u8,
            ((x + 2 * y) % 256) as u8,
        ])
    })
}

/// Image filled with a single colour.
pub fn create_uniform_image(width: u32, height: u32, color: [u8; 3]) -> Image<Rgb<u8>> {
    ImageBuffer::from_pixel(width, height, Rgb(color))
}

/// Black and white checkerboard with one-pixel cells.
pub fn create_checkerboard_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    ImageBuffer::from_fn(width, height, |x, y| {
        let value = if (x + y) % 2 == 0 { 0 } else { 255 };
        Rgb([value; 3])
    })
}

/// Spread (max - min) of the first channel.
pub fn channel_range(image: &Image<Rgb<f32>>) -> f32 {
    let (lo, hi) = image
        .pixels()
        .map(|p| p[0])
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    hi - lo
}
