use std::path::PathBuf;

/// Error type for palette load/save operations.
#[derive(Debug)]
pub enum PaletteError {
    /// No registered format matched the file extension, or the matched
    /// loader rejected the file content. The palette is left unchanged.
    UnsupportedFormat { path: PathBuf, details: String },
    Io(std::io::Error),
}

impl std::fmt::Display for PaletteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaletteError::UnsupportedFormat { path, details } => {
                write!(f, "Unsupported palette format: {}", path.display())?;
                if !details.is_empty() {
                    write!(f, " ({})", details)?;
                }
                Ok(())
            }
            PaletteError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for PaletteError {}

impl From<std::io::Error> for PaletteError {
    fn from(e: std::io::Error) -> Self {
        PaletteError::Io(e)
    }
}
