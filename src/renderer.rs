//! Scaled layer rendering with a transparency checkerboard.
//!
//! [`CanvasRenderer`] turns one layer surface into the scaled pixels of a
//! viewport region. It is initialized once per frame with the image and
//! canvas sizes and then invoked once per layer, so every layer is sampled
//! through the exact same mapping and re-composited layers align
//! pixel-for-pixel.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::geom::{Point, Size};

/// Checkerboard tile edge in destination pixels. Fixed — the backdrop is a
/// viewport fixture, it does not zoom with the image.
pub const CHECKER_TILE: u32 = 16;
const CHECKER_LIGHT: Rgba<u8> = Rgba([220, 220, 220, 255]);
const CHECKER_DARK: Rgba<u8> = Rgba([180, 180, 180, 255]);

/// Source-pixels-per-destination-pixel as a reduced integer ratio.
///
/// Keeping the ratio exact (rather than a float zoom) makes the per-pixel
/// source lookup pure integer math and gives the grid threshold a precise
/// meaning: `ratio() <= 0.5` is "each image pixel covers at least two
/// destination pixels".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaleRatio {
    num: u32,
    den: u32,
}

impl ScaleRatio {
    pub const ONE: ScaleRatio = ScaleRatio { num: 1, den: 1 };

    /// Ratio mapping `canvas` destination pixels back onto `image` source
    /// pixels. Degenerate sizes fall back to 1:1 (the frame no-ops anyway).
    pub fn from_sizes(image: Size, canvas: Size) -> Self {
        if image.is_empty() || canvas.is_empty() {
            return Self::ONE;
        }
        let g = gcd(image.width, canvas.width);
        Self { num: image.width / g, den: canvas.width / g }
    }

    pub fn ratio(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Destination pixel column/row → source index.
    #[inline]
    pub fn source_index(&self, dest: u32) -> u32 {
        ((dest as u64 * self.num as u64) / self.den as u64) as u32
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.max(1)
}

/// Straight-alpha "over" blend of `top` (scaled by `opacity`) onto `base`.
pub(crate) fn blend_over(base: Rgba<u8>, top: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    // Fast path: nothing on top.
    if top[3] == 0 || opacity <= 0.0 {
        return base;
    }
    // Fast path: fully opaque top at full opacity overwrites.
    if top[3] == 255 && opacity >= 1.0 {
        return top;
    }

    let ta = (top[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    let ba = base[3] as f32 / 255.0;
    let out_a = ta + ba * (1.0 - ta);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |t: u8, b: u8| {
        let t = t as f32 / 255.0;
        let b = b as f32 / 255.0;
        let c = (t * ta + b * ba * (1.0 - ta)) / out_a;
        (c * 255.0 + 0.5) as u8
    };

    Rgba([
        channel(top[0], base[0]),
        channel(top[1], base[1]),
        channel(top[2], base[2]),
        (out_a * 255.0 + 0.5) as u8,
    ])
}

#[inline]
fn checker_color(cx: u32, cy: u32) -> Rgba<u8> {
    if ((cx / CHECKER_TILE) + (cy / CHECKER_TILE)) % 2 == 0 {
        CHECKER_LIGHT
    } else {
        CHECKER_DARK
    }
}

#[derive(Debug)]
pub struct CanvasRenderer {
    image_size: Size,
    canvas_size: Size,
    scale: ScaleRatio,
}

impl Default for CanvasRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasRenderer {
    pub fn new() -> Self {
        Self {
            image_size: Size::new(0, 0),
            canvas_size: Size::new(0, 0),
            scale: ScaleRatio::ONE,
        }
    }

    /// Establish this frame's mapping. Call once per frame, before any
    /// `render` call; every layer of the frame then shares the mapping.
    pub fn initialize(&mut self, image_size: Size, canvas_size: Size) {
        self.image_size = image_size;
        self.canvas_size = canvas_size;
        self.scale = ScaleRatio::from_sizes(image_size, canvas_size);
    }

    pub fn scale_ratio(&self) -> ScaleRatio {
        self.scale
    }

    /// Render `src` scaled to canvas size into all of `dst`, which covers
    /// the canvas region starting at `offset` (canvas-local coordinates).
    ///
    /// Sampling is nearest-neighbor in both directions. With
    /// `draw_checkerboard` the output is composited over the fixed-tile
    /// backdrop (making it fully opaque where the canvas is); pass `true`
    /// for the bottom-most layer of a frame only — upper layers land on
    /// top of that first result.
    pub fn render(
        &self,
        src: &RgbaImage,
        dst: &mut RgbaImage,
        offset: Point,
        draw_checkerboard: bool,
    ) {
        let dst_w = dst.width();
        let scale = self.scale;
        let canvas = self.canvas_size;
        let src_w = src.width();
        let src_h = src.height();

        let rows: &mut [u8] = dst;
        rows.par_chunks_mut(dst_w as usize * 4)
            .enumerate()
            .for_each(|(row, out)| {
                let cy = offset.y + row as i32;
                for dx in 0..dst_w {
                    let cx = offset.x + dx as i32;
                    let px_off = dx as usize * 4;

                    // Outside the canvas nothing is drawn, checker included.
                    let inside = cx >= 0
                        && cy >= 0
                        && (cx as u32) < canvas.width
                        && (cy as u32) < canvas.height;
                    if !inside {
                        out[px_off..px_off + 4].copy_from_slice(&[0, 0, 0, 0]);
                        continue;
                    }

                    let sx = scale.source_index(cx as u32);
                    let sy = scale.source_index(cy as u32);
                    let sample = if sx < src_w && sy < src_h {
                        *src.get_pixel(sx, sy)
                    } else {
                        Rgba([0, 0, 0, 0])
                    };

                    let result = if draw_checkerboard {
                        blend_over(checker_color(cx as u32, cy as u32), sample, 1.0)
                    } else {
                        sample
                    };
                    out[px_off..px_off + 4].copy_from_slice(&result.0);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, px: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(w, h, px)
    }

    #[test]
    fn ratio_reduces() {
        let r = ScaleRatio::from_sizes(Size::new(100, 100), Size::new(200, 200));
        assert_eq!(r, ScaleRatio { num: 1, den: 2 });
        assert_eq!(r.ratio(), 0.5);

        let r = ScaleRatio::from_sizes(Size::new(100, 100), Size::new(190, 190));
        assert_eq!(r, ScaleRatio { num: 10, den: 19 });
    }

    #[test]
    fn degenerate_sizes_fall_back_to_identity() {
        assert_eq!(ScaleRatio::from_sizes(Size::new(0, 0), Size::new(10, 10)), ScaleRatio::ONE);
        assert_eq!(ScaleRatio::from_sizes(Size::new(10, 10), Size::new(0, 0)), ScaleRatio::ONE);
    }

    #[test]
    fn nearest_neighbor_doubling() {
        // 2x1 source, red then blue, rendered at 2x.
        let mut src = RgbaImage::new(2, 1);
        src.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        src.put_pixel(1, 0, Rgba([0, 0, 255, 255]));

        let mut r = CanvasRenderer::new();
        r.initialize(Size::new(2, 1), Size::new(4, 2));

        let mut dst = RgbaImage::new(4, 2);
        r.render(&src, &mut dst, Point::new(0, 0), false);

        for y in 0..2 {
            assert_eq!(dst.get_pixel(0, y)[0], 255);
            assert_eq!(dst.get_pixel(1, y)[0], 255);
            assert_eq!(dst.get_pixel(2, y)[2], 255);
            assert_eq!(dst.get_pixel(3, y)[2], 255);
        }
    }

    #[test]
    fn checkerboard_shows_under_transparency_only() {
        let src = RgbaImage::new(64, 64); // fully transparent
        let mut r = CanvasRenderer::new();
        r.initialize(Size::new(64, 64), Size::new(64, 64));

        let mut dst = RgbaImage::new(64, 64);
        r.render(&src, &mut dst, Point::new(0, 0), true);

        assert_eq!(*dst.get_pixel(0, 0), CHECKER_LIGHT);
        assert_eq!(*dst.get_pixel(CHECKER_TILE, 0), CHECKER_DARK);
        assert_eq!(*dst.get_pixel(CHECKER_TILE, CHECKER_TILE), CHECKER_LIGHT);
    }

    #[test]
    fn opaque_content_hides_the_checkerboard() {
        let src = solid(64, 64, Rgba([10, 200, 30, 255]));
        let mut r = CanvasRenderer::new();
        r.initialize(Size::new(64, 64), Size::new(64, 64));

        let mut dst = RgbaImage::new(64, 64);
        r.render(&src, &mut dst, Point::new(0, 0), true);

        assert!(dst.pixels().all(|p| *p == Rgba([10, 200, 30, 255])));
    }

    #[test]
    fn offset_region_samples_the_right_pixels() {
        // 4x4 source at 1:1; render the 2x2 region at canvas (2, 2).
        let mut src = RgbaImage::new(4, 4);
        src.put_pixel(2, 2, Rgba([9, 9, 9, 255]));
        src.put_pixel(3, 3, Rgba([7, 7, 7, 255]));

        let mut r = CanvasRenderer::new();
        r.initialize(Size::new(4, 4), Size::new(4, 4));

        let mut dst = RgbaImage::new(2, 2);
        r.render(&src, &mut dst, Point::new(2, 2), false);

        assert_eq!(*dst.get_pixel(0, 0), Rgba([9, 9, 9, 255]));
        assert_eq!(*dst.get_pixel(1, 1), Rgba([7, 7, 7, 255]));
    }

    #[test]
    fn blend_over_mixes_straight_alpha() {
        let base = Rgba([0, 0, 0, 255]);
        let top = Rgba([255, 255, 255, 128]);
        let out = blend_over(base, top, 1.0);
        assert_eq!(out[3], 255);
        assert!((out[0] as i32 - 128).abs() <= 1);

        // Opacity scales the top layer's contribution.
        let faded = blend_over(base, Rgba([255, 255, 255, 255]), 0.5);
        assert!((faded[0] as i32 - 128).abs() <= 1);
    }
}
