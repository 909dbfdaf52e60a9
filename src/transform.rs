//! Scoped transform state for overlay rendering.
//!
//! Replaces a drawing toolkit's save/restore pair: pushing returns a guard
//! whose `Drop` pops, so the previous state is restored on every exit path
//! of a scope, early returns included. States are immutable snapshots —
//! deriving a new state never mutates the one below it.

use crate::geom::Rect;

/// One immutable transform snapshot: uniform scale, translation, and an
/// optional clip rectangle in device coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformState {
    pub scale: f64,
    pub translate: (f64, f64),
    pub clip: Option<Rect>,
}

impl Default for TransformState {
    fn default() -> Self {
        Self { scale: 1.0, translate: (0.0, 0.0), clip: None }
    }
}

impl TransformState {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self { scale: self.scale * factor, ..self }
    }

    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self { translate: (self.translate.0 + dx, self.translate.1 + dy), ..self }
    }

    /// Narrow the clip; clips intersect rather than replace.
    pub fn clipped(self, rect: Rect) -> Self {
        let clip = match self.clip {
            Some(existing) => existing.intersect(&rect),
            None => rect,
        };
        Self { clip: Some(clip), ..self }
    }

    /// Map a point from source (image) space into device space.
    pub fn to_device(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale + self.translate.0, y * self.scale + self.translate.1)
    }

    /// Map a device-space point back into source space.
    pub fn to_source(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.translate.0) / self.scale, (y - self.translate.1) / self.scale)
    }

    /// Whether a device pixel survives the current clip.
    pub fn clips(&self, x: i32, y: i32) -> bool {
        match self.clip {
            Some(c) => c.contains(x, y),
            None => true,
        }
    }
}

pub struct TransformStack {
    stack: Vec<TransformState>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformStack {
    pub fn new() -> Self {
        Self { stack: vec![TransformState::identity()] }
    }

    pub fn current(&self) -> TransformState {
        // The base identity entry is never popped.
        *self.stack.last().unwrap()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Push a state derived from the current one; the returned guard pops
    /// it again when dropped.
    pub fn pushed(
        &mut self,
        derive: impl FnOnce(TransformState) -> TransformState,
    ) -> TransformGuard<'_> {
        let next = derive(self.current());
        self.stack.push(next);
        TransformGuard { stack: self }
    }
}

/// RAII handle for one pushed transform scope.
pub struct TransformGuard<'a> {
    stack: &'a mut TransformStack,
}

impl TransformGuard<'_> {
    pub fn state(&self) -> TransformState {
        self.stack.current()
    }

    /// Nest a further scope inside this one.
    pub fn pushed(
        &mut self,
        derive: impl FnOnce(TransformState) -> TransformState,
    ) -> TransformGuard<'_> {
        self.stack.pushed(derive)
    }
}

impl Drop for TransformGuard<'_> {
    fn drop(&mut self) {
        self.stack.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_restores_on_scope_exit() {
        let mut ts = TransformStack::new();
        {
            let g = ts.pushed(|s| s.scaled(2.0).translated(10.0, 0.0));
            assert_eq!(g.state().scale, 2.0);
        }
        assert_eq!(ts.current(), TransformState::identity());
        assert_eq!(ts.depth(), 1);
    }

    #[test]
    fn guard_restores_on_early_return() {
        fn render(ts: &mut TransformStack, bail: bool) -> bool {
            let _g = ts.pushed(|s| s.scaled(4.0));
            if bail {
                return false; // guard must still pop
            }
            true
        }

        let mut ts = TransformStack::new();
        render(&mut ts, true);
        assert_eq!(ts.depth(), 1);
        render(&mut ts, false);
        assert_eq!(ts.depth(), 1);
    }

    #[test]
    fn nested_scopes_compose_and_unwind_in_order() {
        let mut ts = TransformStack::new();
        {
            let mut outer = ts.pushed(|s| s.scaled(2.0));
            {
                let inner = outer.pushed(|s| s.translated(5.0, 5.0));
                assert_eq!(inner.state().scale, 2.0);
                assert_eq!(inner.state().translate, (5.0, 5.0));
            }
            assert_eq!(outer.state().translate, (0.0, 0.0));
        }
        assert_eq!(ts.depth(), 1);
    }

    #[test]
    fn clips_intersect_not_replace() {
        let mut ts = TransformStack::new();
        let mut g = ts.pushed(|s| s.clipped(Rect::new(0, 0, 100, 100)));
        let inner = g.pushed(|s| s.clipped(Rect::new(50, 50, 100, 100)));
        assert_eq!(inner.state().clip, Some(Rect::new(50, 50, 50, 50)));
        assert!(inner.state().clips(60, 60));
        assert!(!inner.state().clips(10, 10));
    }

    #[test]
    fn device_mapping_round_trips() {
        let s = TransformState::identity().scaled(2.5).translated(7.0, -3.0);
        let (dx, dy) = s.to_device(4.0, 8.0);
        let (sx, sy) = s.to_source(dx, dy);
        assert!((sx - 4.0).abs() < 1e-9);
        assert!((sy - 8.0).abs() < 1e-9);
    }
}
