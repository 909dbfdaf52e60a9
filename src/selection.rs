//! Vector selection outlines.
//!
//! A [`SelectionPath`] lives in image space and serves two roles per
//! frame: a clip mask for the live-preview overlay (even-odd rule) and the
//! source geometry for the drawn marquee.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    Close,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionPath {
    segments: Vec<PathSegment>,
}

impl SelectionPath {
    /// An empty path — "no selection".
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Axis-aligned rectangle outline.
    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            segments: vec![
                PathSegment::MoveTo { x, y },
                PathSegment::LineTo { x: x + width, y },
                PathSegment::LineTo { x: x + width, y: y + height },
                PathSegment::LineTo { x, y: y + height },
                PathSegment::Close,
            ],
        }
    }

    /// Closed polygon through the given points.
    pub fn polygon(points: &[(f32, f32)]) -> Self {
        let mut segments = Vec::with_capacity(points.len() + 1);
        for (i, &(x, y)) in points.iter().enumerate() {
            segments.push(if i == 0 {
                PathSegment::MoveTo { x, y }
            } else {
                PathSegment::LineTo { x, y }
            });
        }
        if !points.is_empty() {
            segments.push(PathSegment::Close);
        }
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The path as closed point loops. Open subpaths are closed
    /// implicitly, matching how the clip treats them.
    pub fn contours(&self) -> Vec<Vec<(f32, f32)>> {
        let mut contours = Vec::new();
        let mut current: Vec<(f32, f32)> = Vec::new();
        for seg in &self.segments {
            match *seg {
                PathSegment::MoveTo { x, y } => {
                    if current.len() > 1 {
                        contours.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                    current.push((x, y));
                }
                PathSegment::LineTo { x, y } => current.push((x, y)),
                PathSegment::Close => {
                    if current.len() > 1 {
                        contours.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                }
            }
        }
        if current.len() > 1 {
            contours.push(current);
        }
        contours
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)`, `None` when empty.
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let mut bounds: Option<(f32, f32, f32, f32)> = None;
        for seg in &self.segments {
            let (x, y) = match *seg {
                PathSegment::MoveTo { x, y } | PathSegment::LineTo { x, y } => (x, y),
                PathSegment::Close => continue,
            };
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        bounds
    }

    /// Even-odd containment test in image space. A horizontal ray is cast
    /// toward +x; an odd crossing count means inside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let mut crossings = 0u32;
        for contour in self.contours() {
            let n = contour.len();
            for i in 0..n {
                let (x0, y0) = contour[i];
                let (x1, y1) = contour[(i + 1) % n];
                if (y0 <= y) != (y1 <= y) {
                    let t = (y - y0) / (y1 - y0);
                    if x < x0 + t * (x1 - x0) {
                        crossings += 1;
                    }
                }
            }
        }
        crossings % 2 == 1
    }
}
