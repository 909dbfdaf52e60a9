//! paintcore — headless compositing and palette core of a raster editor.
//!
//! Two halves:
//!
//! * An observable [`Palette`] store with pluggable file formats through a
//!   [`FormatRegistry`].
//! * A CPU compositing pipeline: a [`LayerStack`] rendered per frame by
//!   the [`Compositor`] — checkerboard transparency backdrop, exact-ratio
//!   scaling, live-preview overlay clipped to the [`SelectionPath`],
//!   pixel grid at 2x zoom and closer, and the dashed selection marquee.
//!
//! Everything runs synchronously on the caller's thread; the only
//! parallelism is row-level inside a single render call.

pub mod cli;
pub mod color;
pub mod compositor;
pub mod error;
pub mod event;
pub mod formats;
pub mod geom;
pub mod grid;
pub mod layer;
pub mod livepreview;
pub mod logger;
pub mod palette;
pub mod renderer;
pub mod selection;
pub mod tool;
pub mod transform;
pub mod workspace;

pub use color::Color;
pub use compositor::{Compositor, FrameContext, FrameReport, RenderOptions};
pub use error::PaletteError;
pub use event::{Observers, Subscription};
pub use formats::{FormatRegistry, PaletteFormat, PaletteLoader, PaletteSaver};
pub use geom::{Point, Rect, Size};
pub use grid::GridRenderer;
pub use layer::{Layer, LayerStack};
pub use livepreview::LivePreview;
pub use palette::{Palette, PaletteChange};
pub use renderer::{CanvasRenderer, ScaleRatio};
pub use selection::{PathSegment, SelectionPath};
pub use tool::{ActiveTool, SelectionBehavior};
pub use transform::{TransformGuard, TransformStack, TransformState};
pub use workspace::{Invalidation, ViewportSnapshot, Workspace, WorkspaceEvent};
