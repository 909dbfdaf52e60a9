//! Viewport state owned by the editing session.
//!
//! The workspace tracks the image size, on-screen zoom, and where the
//! canvas origin sits inside the widget. Mutations emit events; redraw
//! consumers react to `CanvasInvalidated` by running the compositor over
//! the carried region.

use serde::{Deserialize, Serialize};

use crate::event::{Observers, Subscription};
use crate::geom::{Point, Rect, Size};

const MIN_SCALE: f64 = 1.0 / 32.0;
const MAX_SCALE: f64 = 64.0;

/// The region a redraw request covers, in widget coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Invalidation {
    EntireSurface,
    Region(Rect),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkspaceEvent {
    /// Image size or scale changed, so the on-screen canvas size did too.
    CanvasSizeChanged,
    CanvasInvalidated(Invalidation),
}

/// Read-only view of the workspace for one frame. Sizes are recomputed at
/// snapshot time, so a mid-session resize is picked up by the next frame
/// rather than cached stale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportSnapshot {
    pub image_size: Size,
    pub canvas_size: Size,
    pub scale: f64,
    pub offset: Point,
}

pub struct Workspace {
    image_size: Size,
    scale: f64,
    offset: Point,
    observers: Observers<WorkspaceEvent>,
}

impl Workspace {
    pub fn new(image_size: Size) -> Self {
        Self {
            image_size,
            scale: 1.0,
            offset: Point::default(),
            observers: Observers::new(),
        }
    }

    pub fn image_size(&self) -> Size {
        self.image_size
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// On-screen size of the canvas: image size times scale, rounded.
    pub fn canvas_size(&self) -> Size {
        Size::new(
            (self.image_size.width as f64 * self.scale).round() as u32,
            (self.image_size.height as f64 * self.scale).round() as u32,
        )
    }

    pub fn set_image_size(&mut self, size: Size) {
        if size != self.image_size {
            self.image_size = size;
            self.observers.emit(&WorkspaceEvent::CanvasSizeChanged);
        }
    }

    /// Set the zoom factor, clamped to the supported range.
    pub fn set_scale(&mut self, scale: f64) {
        let clamped = scale.clamp(MIN_SCALE, MAX_SCALE);
        if clamped != self.scale {
            self.scale = clamped;
            self.observers.emit(&WorkspaceEvent::CanvasSizeChanged);
        }
    }

    pub fn set_offset(&mut self, offset: Point) {
        self.offset = offset;
    }

    /// Request a full redraw.
    pub fn invalidate(&mut self) {
        self.observers
            .emit(&WorkspaceEvent::CanvasInvalidated(Invalidation::EntireSurface));
    }

    /// Request a redraw of `rect` (widget coordinates).
    pub fn invalidate_rect(&mut self, rect: Rect) {
        self.observers
            .emit(&WorkspaceEvent::CanvasInvalidated(Invalidation::Region(rect)));
    }

    pub fn snapshot(&self) -> ViewportSnapshot {
        ViewportSnapshot {
            image_size: self.image_size,
            canvas_size: self.canvas_size(),
            scale: self.scale,
            offset: self.offset,
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&WorkspaceEvent) + 'static) -> Subscription {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        self.observers.unsubscribe(sub)
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("image_size", &self.image_size)
            .field("scale", &self.scale)
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn canvas_size_tracks_scale() {
        let mut ws = Workspace::new(Size::new(100, 50));
        assert_eq!(ws.canvas_size(), Size::new(100, 50));
        ws.set_scale(2.0);
        assert_eq!(ws.canvas_size(), Size::new(200, 100));
        ws.set_scale(0.5);
        assert_eq!(ws.canvas_size(), Size::new(50, 25));
    }

    #[test]
    fn scale_is_clamped() {
        let mut ws = Workspace::new(Size::new(10, 10));
        ws.set_scale(1000.0);
        assert_eq!(ws.scale(), MAX_SCALE);
        ws.set_scale(0.0);
        assert_eq!(ws.scale(), MIN_SCALE);
    }

    #[test]
    fn invalidations_and_size_changes_are_observable() {
        let events: Rc<RefCell<Vec<WorkspaceEvent>>> = Rc::default();
        let mut ws = Workspace::new(Size::new(10, 10));
        let sink = Rc::clone(&events);
        ws.subscribe(move |e| sink.borrow_mut().push(*e));

        ws.set_scale(2.0);
        ws.set_scale(2.0); // no-op, no event
        ws.invalidate();
        ws.invalidate_rect(Rect::new(1, 2, 3, 4));

        assert_eq!(
            *events.borrow(),
            vec![
                WorkspaceEvent::CanvasSizeChanged,
                WorkspaceEvent::CanvasInvalidated(Invalidation::EntireSurface),
                WorkspaceEvent::CanvasInvalidated(Invalidation::Region(Rect::new(1, 2, 3, 4))),
            ]
        );
    }
}
