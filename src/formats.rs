//! Palette file-format registry.
//!
//! The core knows nothing about concrete palette file formats. Hosts
//! register [`PaletteFormat`] entries (an extension list plus optional
//! loader/saver collaborators) and [`Palette::load`](crate::Palette::load)
//! resolves the right one by filename.

use std::path::Path;
use std::sync::Arc;

use crate::color::Color;
use crate::error::PaletteError;

/// Reads an ordered color list from a palette file.
pub trait PaletteLoader {
    fn load(&self, path: &Path) -> Result<Vec<Color>, PaletteError>;
}

/// Writes an ordered color list to a palette file.
pub trait PaletteSaver {
    fn save(&self, colors: &[Color], path: &Path) -> Result<(), PaletteError>;
}

/// One registered palette file format.
#[derive(Clone)]
pub struct PaletteFormat {
    /// Display name, e.g. `"GIMP Palette"`.
    pub name: String,
    /// Lowercase extensions without the dot, e.g. `["gpl"]`.
    pub extensions: Vec<String>,
    pub loader: Option<Arc<dyn PaletteLoader>>,
    pub saver: Option<Arc<dyn PaletteSaver>>,
}

impl std::fmt::Debug for PaletteFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaletteFormat")
            .field("name", &self.name)
            .field("extensions", &self.extensions)
            .field("loader", &self.loader.is_some())
            .field("saver", &self.saver.is_some())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct FormatRegistry {
    formats: Vec<PaletteFormat>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self { formats: Vec::new() }
    }

    pub fn add(&mut self, format: PaletteFormat) {
        self.formats.push(format);
    }

    pub fn formats(&self) -> &[PaletteFormat] {
        &self.formats
    }

    /// Resolve a format by the file's extension (case-insensitive).
    /// First registered match wins.
    pub fn get_format_by_filename(&self, path: &Path) -> Option<&PaletteFormat> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())?;
        self.formats
            .iter()
            .find(|f| f.extensions.iter().any(|e| *e == ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct NullLoader;
    impl PaletteLoader for NullLoader {
        fn load(&self, _path: &Path) -> Result<Vec<Color>, PaletteError> {
            Ok(Vec::new())
        }
    }

    fn registry_with(extensions: &[&str]) -> FormatRegistry {
        let mut reg = FormatRegistry::new();
        reg.add(PaletteFormat {
            name: "Test Palette".into(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            loader: Some(Arc::new(NullLoader)),
            saver: None,
        });
        reg
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let reg = registry_with(&["gpl"]);
        assert!(reg.get_format_by_filename(&PathBuf::from("colors.GPL")).is_some());
        assert!(reg.get_format_by_filename(&PathBuf::from("colors.gpl")).is_some());
    }

    #[test]
    fn unknown_extension_resolves_to_none() {
        let reg = registry_with(&["gpl"]);
        assert!(reg.get_format_by_filename(&PathBuf::from("colors.xyz")).is_none());
        assert!(reg.get_format_by_filename(&PathBuf::from("no_extension")).is_none());
    }
}
