//! Per-frame composition.
//!
//! The compositor services one redraw request at a time: clamp the
//! invalidated region to the canvas, render each paintable layer through
//! the [`CanvasRenderer`] into a reused scratch buffer, blend the result
//! into the target at layer opacity, then lay the overlays (live preview
//! clipped to the selection, pixel grid, selection marquee) on top. All
//! collaborator state arrives through an explicit [`FrameContext`] — the
//! compositor holds no global references.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::geom::{Point, Rect, Size};
use crate::grid::GridRenderer;
use crate::layer::LayerStack;
use crate::livepreview::LivePreview;
use crate::renderer::{CanvasRenderer, blend_over};
use crate::selection::SelectionPath;
use crate::tool::ActiveTool;
use crate::transform::{TransformStack, TransformState};
use crate::workspace::{Invalidation, ViewportSnapshot};

/// Translucent blue-gray wash inside an in-progress selection.
const SELECTION_FILL: Rgba<u8> = Rgba([179, 204, 230, 51]);
const SELECTION_OUTLINE: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Marquee dash pattern in device pixels. The underlying path is dashed
/// in image units of `2/scale` on, `4/scale` off, so after scaling the
/// on-screen lengths are constant at every zoom.
const DASH_ON: f64 = 2.0;
const DASH_OFF: f64 = 4.0;

/// Per-frame toggles a host persists with its view settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Pixel grid overlay; only takes effect at 2x zoom or closer.
    pub show_grid: bool,
    /// Checkerboard backdrop beneath the bottom-most layer.
    pub checkerboard: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { show_grid: false, checkerboard: true }
    }
}

/// Everything one frame reads. Collaborators are borrowed for the frame
/// and never retained.
pub struct FrameContext<'a> {
    pub viewport: ViewportSnapshot,
    pub layers: &'a LayerStack,
    pub live_preview: &'a LivePreview,
    pub tool: &'a ActiveTool,
    pub options: RenderOptions,
}

/// What a frame actually did, for hosts and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// The widget-space region that was redrawn.
    pub region: Rect,
    pub layers_rendered: usize,
    pub grid_drawn: bool,
    pub selection_drawn: bool,
}

pub struct Compositor {
    renderer: CanvasRenderer,
    grid: GridRenderer,
    /// Scratch buffer sized to the dirty region; reallocated only when the
    /// region size changes between frames.
    scratch: Option<RgbaImage>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            renderer: CanvasRenderer::new(),
            grid: GridRenderer::new(),
            scratch: None,
        }
    }

    /// Service one redraw request, drawing into `target` (the widget
    /// surface). Returns `None` without touching `target` when the dirty
    /// region misses the canvas entirely or the viewport is degenerate —
    /// a normal frame skip, not an error.
    pub fn render_frame(
        &mut self,
        ctx: &FrameContext<'_>,
        invalidation: Invalidation,
        target: &mut RgbaImage,
    ) -> Option<FrameReport> {
        let vp = ctx.viewport;
        let widget_bounds = Rect::from_size(Size::new(target.width(), target.height()));
        if vp.canvas_size.is_empty() || vp.image_size.is_empty() || widget_bounds.is_empty() {
            return None;
        }

        let requested = match invalidation {
            Invalidation::EntireSurface => widget_bounds,
            Invalidation::Region(r) => r,
        };

        // Clamp the request to where the canvas actually is on screen.
        let canvas_bounds = Rect::at(vp.offset, vp.canvas_size);
        let dirty = requested.intersect(&canvas_bounds).intersect(&widget_bounds);
        if dirty.is_empty() {
            return None;
        }
        // The same region in canvas-local coordinates.
        let local = dirty.translated(-vp.offset.x, -vp.offset.y);

        let mut scratch = match self.scratch.take() {
            Some(s) if s.width() == local.width && s.height() == local.height => s,
            _ => RgbaImage::new(local.width, local.height),
        };

        self.renderer.initialize(vp.image_size, vp.canvas_size);

        let current_id = ctx.layers.current_layer().id;
        let mut checker = ctx.options.checkerboard;
        let mut layers_rendered = 0;

        for layer in ctx.layers.layers_to_paint() {
            self.renderer.render(&layer.surface, &mut scratch, local.origin(), checker);
            blit(target, dirty.origin(), local.origin(), &scratch, layer.opacity, None, None);

            // The uncommitted edit replaces the current layer's content on
            // screen, clipped to the selection.
            if layer.id == current_id && ctx.live_preview.is_enabled() {
                if let Some(preview) = ctx.live_preview.surface() {
                    self.renderer.render(preview, &mut scratch, local.origin(), checker);

                    let mut transforms = TransformStack::new();
                    let device = transforms.pushed(|s| s.scaled(vp.scale).clipped(local));
                    let clip_path = if ctx.layers.has_selection() {
                        Some(&ctx.layers.selection_path)
                    } else {
                        None
                    };
                    blit(
                        target,
                        dirty.origin(),
                        local.origin(),
                        &scratch,
                        layer.opacity,
                        clip_path,
                        Some(device.state()),
                    );
                    // Guard drops here: the scale is undone before any
                    // later drawing reuses the stack.
                }
            }

            checker = false;
            layers_rendered += 1;
        }

        self.scratch = Some(scratch);

        let mut grid_drawn = false;
        if ctx.options.show_grid && self.renderer.scale_ratio().ratio() <= 0.5 {
            self.grid
                .render(target, dirty, local.origin(), self.renderer.scale_ratio());
            grid_drawn = true;
        }

        let mut selection_drawn = false;
        if ctx.layers.show_selection && ctx.layers.has_selection() {
            let path = &ctx.layers.selection_path;
            let mut transforms = TransformStack::new();
            let device = transforms.pushed(|s| s.scaled(vp.scale).clipped(local));

            if ctx.tool.draws_selection_feedback() {
                fill_selection(target, dirty, local.origin(), path, device.state());
            }
            draw_selection_outline(target, dirty, &vp, path);
            selection_drawn = true;
        }

        Some(FrameReport {
            region: dirty,
            layers_rendered,
            grid_drawn,
            selection_drawn,
        })
    }
}

/// Blend `src` into `target` at `at` with the given opacity. With a clip,
/// only pixels whose image-space position falls inside the selection path
/// (even-odd) survive; `state` maps canvas-local device pixels back to
/// image space and carries the rectangular clip.
fn blit(
    target: &mut RgbaImage,
    at: Point,
    local_at: Point,
    src: &RgbaImage,
    opacity: f32,
    clip_path: Option<&SelectionPath>,
    state: Option<TransformState>,
) {
    for y in 0..src.height() {
        for x in 0..src.width() {
            if let (Some(path), Some(state)) = (clip_path, state) {
                let dx = local_at.x + x as i32;
                let dy = local_at.y + y as i32;
                if !state.clips(dx, dy) {
                    continue;
                }
                // Test the pixel center in image space.
                let (ix, iy) = state.to_source(dx as f64 + 0.5, dy as f64 + 0.5);
                if !path.contains(ix as f32, iy as f32) {
                    continue;
                }
            }
            let tx = (at.x + x as i32) as u32;
            let ty = (at.y + y as i32) as u32;
            let base = *target.get_pixel(tx, ty);
            target.put_pixel(tx, ty, blend_over(base, *src.get_pixel(x, y), opacity));
        }
    }
}

fn fill_selection(
    target: &mut RgbaImage,
    dirty: Rect,
    local_origin: Point,
    path: &SelectionPath,
    state: TransformState,
) {
    for dy in 0..dirty.height as i32 {
        for dx in 0..dirty.width as i32 {
            let cx = local_origin.x + dx;
            let cy = local_origin.y + dy;
            if !state.clips(cx, cy) {
                continue;
            }
            let (ix, iy) = state.to_source(cx as f64 + 0.5, cy as f64 + 0.5);
            if path.contains(ix as f32, iy as f32) {
                let tx = (dirty.x + dx) as u32;
                let ty = (dirty.y + dy) as u32;
                let base = *target.get_pixel(tx, ty);
                target.put_pixel(tx, ty, blend_over(base, SELECTION_FILL, 1.0));
            }
        }
    }
}

fn draw_selection_outline(
    target: &mut RgbaImage,
    dirty: Rect,
    vp: &ViewportSnapshot,
    path: &SelectionPath,
) {
    for contour in path.contours() {
        // Map the loop into widget space and close it.
        let mut pts: Vec<(f64, f64)> = contour
            .iter()
            .map(|&(x, y)| {
                (
                    x as f64 * vp.scale + vp.offset.x as f64,
                    y as f64 * vp.scale + vp.offset.y as f64,
                )
            })
            .collect();
        if let Some(&first) = pts.first() {
            pts.push(first);
        }
        draw_dashed_polyline(target, dirty, &pts);
    }
}

/// Walk a polyline plotting `DASH_ON`-long runs separated by `DASH_OFF`
/// gaps, carrying the dash phase across segments so corners don't reset
/// the pattern.
fn draw_dashed_polyline(target: &mut RgbaImage, clip: Rect, pts: &[(f64, f64)]) {
    let pattern = DASH_ON + DASH_OFF;
    let mut phase = 0.0f64;
    let mut last_px: Option<(i32, i32)> = None;

    for pair in pts.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        let len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        if len < f64::EPSILON {
            continue;
        }
        let (ux, uy) = ((x1 - x0) / len, (y1 - y0) / len);

        let step = 0.5f64;
        let mut t = 0.0f64;
        while t < len {
            let in_dash = (phase + t) % pattern < DASH_ON;
            if in_dash {
                let px = (x0 + ux * t).floor() as i32;
                let py = (y0 + uy * t).floor() as i32;
                if last_px != Some((px, py)) && clip.contains(px, py) {
                    let base = *target.get_pixel(px as u32, py as u32);
                    target.put_pixel(px as u32, py as u32, blend_over(base, SELECTION_OUTLINE, 1.0));
                    last_px = Some((px, py));
                }
            }
            t += step;
        }
        phase = (phase + len) % pattern;
    }
}
