use image::{Rgba, RgbaImage};

use crate::geom::{Point, Rect};
use crate::renderer::{ScaleRatio, blend_over};

/// Translucent black, readable on both checker shades.
const GRID_LINE: Rgba<u8> = Rgba([0, 0, 0, 90]);

/// Draws 1-px lines at every image-pixel boundary, in destination space.
///
/// The compositor only invokes this at a scale ratio of `<= 0.5` (2x zoom
/// or closer); below that the lines would merge into a solid wash.
#[derive(Debug, Default)]
pub struct GridRenderer;

impl GridRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Overlay grid lines onto `dst` inside `region` (a rect in `dst`
    /// coordinates). `local_origin` is the canvas-local position of the
    /// region's top-left corner, which anchors the boundaries; `ratio`
    /// maps destination columns/rows back onto source pixels.
    pub fn render(
        &self,
        dst: &mut RgbaImage,
        region: Rect,
        local_origin: Point,
        ratio: ScaleRatio,
    ) {
        let bounds = Rect::from_size(crate::geom::Size::new(dst.width(), dst.height()));
        let region = region.intersect(&bounds);
        if region.is_empty() {
            return;
        }

        // A destination column sits on a boundary when its source index
        // differs from its left neighbor's (column 0 of the canvas is the
        // image's left edge).
        let on_boundary = |c: i32| -> bool {
            if c < 0 {
                return false;
            }
            if c == 0 {
                return true;
            }
            ratio.source_index(c as u32) != ratio.source_index(c as u32 - 1)
        };

        for dy in 0..region.height as i32 {
            let y = region.y + dy;
            let cy = local_origin.y + dy;
            let row_is_line = on_boundary(cy);
            for dx in 0..region.width as i32 {
                let x = region.x + dx;
                let cx = local_origin.x + dx;
                if row_is_line || on_boundary(cx) {
                    let px = *dst.get_pixel(x as u32, y as u32);
                    dst.put_pixel(x as u32, y as u32, blend_over(px, GRID_LINE, 1.0));
                }
            }
        }
    }
}
