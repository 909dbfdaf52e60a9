//! Observable color palette store.
//!
//! An ordered, index-addressable list of [`Color`] entries. Every mutation
//! (single set, resize, bulk load) fires a synchronous change notification
//! after the mutation has completed. File I/O is delegated to the
//! [`FormatRegistry`] collaborators; a failed load leaves the palette
//! untouched.

use std::path::Path;

use crate::color::Color;
use crate::error::PaletteError;
use crate::event::{Observers, Subscription};
use crate::formats::{FormatRegistry, PaletteSaver};

/// What changed; delivered to subscribers after the mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteChange {
    /// A single entry was overwritten.
    EntrySet { index: usize },
    /// The palette was grown or truncated.
    Resized { len: usize },
    /// All entries were replaced (default table or file load).
    Loaded,
}

pub struct Palette {
    colors: Vec<Color>,
    observers: Observers<PaletteChange>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Palette")
            .field("len", &self.colors.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Palette {
    /// An empty palette. Use [`Palette::with_default`] for the built-in
    /// color table.
    pub fn new() -> Self {
        Self { colors: Vec::new(), observers: Observers::new() }
    }

    /// A palette pre-filled with the built-in 32-color table.
    pub fn with_default() -> Self {
        let mut p = Self::new();
        p.load_default();
        p
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Read the entry at `index`.
    ///
    /// # Panics
    /// Panics when `index >= len()` — an out-of-range palette index is a
    /// programmer error, not a recoverable condition.
    pub fn get(&self, index: usize) -> Color {
        assert!(
            index < self.colors.len(),
            "palette index {} out of range (len {})",
            index,
            self.colors.len()
        );
        self.colors[index]
    }

    /// Overwrite the entry at `index` and notify subscribers.
    ///
    /// # Panics
    /// Panics when `index >= len()`; no mutation or notification happens.
    pub fn set(&mut self, index: usize, color: Color) {
        assert!(
            index < self.colors.len(),
            "palette index {} out of range (len {})",
            index,
            self.colors.len()
        );
        self.colors[index] = color;
        self.observers.emit(&PaletteChange::EntrySet { index });
    }

    /// Grow or shrink to `new_size` entries. Growth appends opaque white;
    /// shrinking truncates from the tail. Existing entries are untouched.
    pub fn resize(&mut self, new_size: usize) {
        self.colors.resize(new_size, Color::WHITE);
        self.colors.shrink_to_fit();
        self.observers.emit(&PaletteChange::Resized { len: new_size });
    }

    /// Replace all entries with the built-in palette: 16 hue columns of
    /// two shades each (full saturation + pastel), preceded by a grayscale
    /// ramp. The values are fixed for visual compatibility — tests pin the
    /// exact table.
    pub fn load_default(&mut self) {
        self.colors.clear();

        self.colors.push(Color::from_rgb8(255, 255, 255));
        self.colors.push(Color::from_rgb8(0, 0, 0));

        self.colors.push(Color::from_rgb8(160, 160, 160));
        self.colors.push(Color::from_rgb8(128, 128, 128));

        self.colors.push(Color::from_rgb8(64, 64, 64));
        self.colors.push(Color::from_rgb8(48, 48, 48));

        self.colors.push(Color::from_rgb8(255, 0, 0));
        self.colors.push(Color::from_rgb8(255, 127, 127));

        self.colors.push(Color::from_rgb8(255, 106, 0));
        self.colors.push(Color::from_rgb8(255, 178, 127));

        self.colors.push(Color::from_rgb8(255, 216, 0));
        self.colors.push(Color::from_rgb8(255, 233, 127));

        self.colors.push(Color::from_rgb8(182, 255, 0));
        self.colors.push(Color::from_rgb8(218, 255, 127));

        self.colors.push(Color::from_rgb8(76, 255, 0));
        self.colors.push(Color::from_rgb8(165, 255, 127));

        self.colors.push(Color::from_rgb8(0, 255, 33));
        self.colors.push(Color::from_rgb8(127, 255, 142));

        self.colors.push(Color::from_rgb8(0, 255, 144));
        self.colors.push(Color::from_rgb8(127, 255, 197));

        self.colors.push(Color::from_rgb8(0, 255, 255));
        self.colors.push(Color::from_rgb8(127, 255, 255));

        self.colors.push(Color::from_rgb8(0, 148, 255));
        self.colors.push(Color::from_rgb8(127, 201, 255));

        self.colors.push(Color::from_rgb8(0, 38, 255));
        self.colors.push(Color::from_rgb8(127, 146, 255));

        self.colors.push(Color::from_rgb8(72, 0, 255));
        self.colors.push(Color::from_rgb8(161, 127, 255));

        self.colors.push(Color::from_rgb8(178, 0, 255));
        self.colors.push(Color::from_rgb8(214, 127, 255));

        self.colors.push(Color::from_rgb8(255, 0, 220));
        self.colors.push(Color::from_rgb8(255, 127, 237));

        self.colors.push(Color::from_rgb8(255, 0, 110));
        self.colors.push(Color::from_rgb8(255, 127, 182));

        self.colors.shrink_to_fit();
        self.observers.emit(&PaletteChange::Loaded);
    }

    /// Replace all entries from a palette file, resolving the loader by
    /// file extension. On any failure — no matching loader, or the loader
    /// rejecting the content — the palette keeps its prior entries and the
    /// error is returned for the caller to surface.
    pub fn load(&mut self, path: &Path, registry: &FormatRegistry) -> Result<(), PaletteError> {
        let loader = registry
            .get_format_by_filename(path)
            .and_then(|f| f.loader.clone())
            .ok_or_else(|| PaletteError::UnsupportedFormat {
                path: path.to_path_buf(),
                details: String::new(),
            })?;

        let colors = loader.load(path).map_err(|e| match e {
            // Malformed content is an unsupported-format condition, not a
            // generic I/O failure.
            PaletteError::UnsupportedFormat { .. } => e,
            other => PaletteError::UnsupportedFormat {
                path: path.to_path_buf(),
                details: other.to_string(),
            },
        })?;

        self.colors = colors;
        self.colors.shrink_to_fit();
        self.observers.emit(&PaletteChange::Loaded);
        Ok(())
    }

    /// Write the palette through the given saver. The store performs no
    /// format-specific work of its own.
    pub fn save(&self, path: &Path, saver: &dyn PaletteSaver) -> Result<(), PaletteError> {
        saver.save(&self.colors, path)
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&PaletteChange) + 'static) -> Subscription {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        self.observers.unsubscribe(sub)
    }
}
