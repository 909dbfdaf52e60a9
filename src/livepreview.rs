use image::RgbaImage;

/// In-progress tool output, rendered in place of the committed current
/// layer while an operation is uncommitted. The compositor reads this per
/// frame; tools own the begin/update/end lifecycle.
#[derive(Default)]
pub struct LivePreview {
    enabled: bool,
    surface: Option<RgbaImage>,
}

impl LivePreview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or refresh) a preview with the given surface.
    pub fn begin(&mut self, surface: RgbaImage) {
        self.surface = Some(surface);
        self.enabled = true;
    }

    /// End the preview and release its surface.
    pub fn end(&mut self) {
        self.enabled = false;
        self.surface = None;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&RgbaImage> {
        if self.enabled { self.surface.as_ref() } else { None }
    }
}

impl std::fmt::Debug for LivePreview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LivePreview")
            .field("enabled", &self.enabled)
            .field("surface", &self.surface.is_some())
            .finish()
    }
}
