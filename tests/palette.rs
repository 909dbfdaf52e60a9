//! Palette store behavior: resize laws, the exact default table, and
//! registry-driven load/save.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use paintcore::{
    Color, FormatRegistry, Palette, PaletteChange, PaletteError, PaletteFormat, PaletteLoader,
    PaletteSaver,
};

/// The built-in table: a grayscale ramp followed by 13 hue columns, full
/// saturation on the left, pastel on the right.
const DEFAULT_TABLE: [(u8, u8, u8); 32] = [
    (255, 255, 255),
    (0, 0, 0),
    (160, 160, 160),
    (128, 128, 128),
    (64, 64, 64),
    (48, 48, 48),
    (255, 0, 0),
    (255, 127, 127),
    (255, 106, 0),
    (255, 178, 127),
    (255, 216, 0),
    (255, 233, 127),
    (182, 255, 0),
    (218, 255, 127),
    (76, 255, 0),
    (165, 255, 127),
    (0, 255, 33),
    (127, 255, 142),
    (0, 255, 144),
    (127, 255, 197),
    (0, 255, 255),
    (127, 255, 255),
    (0, 148, 255),
    (127, 201, 255),
    (0, 38, 255),
    (127, 146, 255),
    (72, 0, 255),
    (161, 127, 255),
    (178, 0, 255),
    (214, 127, 255),
    (255, 0, 220),
    (255, 127, 237),
];

#[test]
fn load_default_yields_the_exact_table() {
    let p = Palette::with_default();
    assert_eq!(p.len(), 32);
    for (i, &(r, g, b)) in DEFAULT_TABLE.iter().enumerate() {
        assert_eq!(p.get(i), Color::from_rgb8(r, g, b), "entry {}", i);
    }
}

#[test]
fn resize_count_law_holds_for_any_n() {
    for n in [0usize, 1, 16, 32, 33, 100] {
        let mut p = Palette::with_default();
        p.resize(n);
        assert_eq!(p.len(), n);
    }
}

#[test]
fn growing_preserves_entries_and_appends_opaque_white() {
    let mut p = Palette::with_default();
    let before: Vec<Color> = p.colors().to_vec();
    p.resize(48);
    assert_eq!(&p.colors()[..32], before.as_slice());
    assert!(p.colors()[32..].iter().all(|c| *c == Color::WHITE));
}

#[test]
fn shrinking_preserves_the_retained_prefix() {
    let mut p = Palette::with_default();
    let prefix: Vec<Color> = p.colors()[..10].to_vec();
    p.resize(10);
    assert_eq!(p.colors(), prefix.as_slice());
}

#[test]
fn set_get_round_trips_exactly() {
    let mut p = Palette::with_default();
    let c = Color::new(0.1, 0.2, 0.3, 0.4);
    p.set(0, c);
    assert_eq!(p.get(0), c);
}

// ---------------------------------------------------------------------------
// Format registry collaboration
// ---------------------------------------------------------------------------

struct FixedLoader(Vec<Color>);
impl PaletteLoader for FixedLoader {
    fn load(&self, _path: &Path) -> Result<Vec<Color>, PaletteError> {
        Ok(self.0.clone())
    }
}

struct FailingLoader;
impl PaletteLoader for FailingLoader {
    fn load(&self, path: &Path) -> Result<Vec<Color>, PaletteError> {
        Err(PaletteError::UnsupportedFormat {
            path: path.to_path_buf(),
            details: "bad header".into(),
        })
    }
}

struct RecordingSaver(Rc<RefCell<Vec<Color>>>);
impl PaletteSaver for RecordingSaver {
    fn save(&self, colors: &[Color], _path: &Path) -> Result<(), PaletteError> {
        *self.0.borrow_mut() = colors.to_vec();
        Ok(())
    }
}

fn format(ext: &str, loader: Option<Arc<dyn PaletteLoader>>) -> PaletteFormat {
    PaletteFormat {
        name: format!("{} palette", ext),
        extensions: vec![ext.to_string()],
        loader,
        saver: None,
    }
}

#[test]
fn load_with_unknown_extension_is_unsupported_and_keeps_state() {
    let registry = FormatRegistry::new();
    let mut p = Palette::with_default();
    let before: Vec<Color> = p.colors().to_vec();

    let err = p.load(&PathBuf::from("colors.xyz"), &registry).unwrap_err();
    assert!(matches!(err, PaletteError::UnsupportedFormat { .. }));
    assert_eq!(p.colors(), before.as_slice());
}

#[test]
fn rejected_content_surfaces_as_unsupported_and_keeps_state() {
    let mut registry = FormatRegistry::new();
    registry.add(format("gpl", Some(Arc::new(FailingLoader))));

    let mut p = Palette::with_default();
    let before: Vec<Color> = p.colors().to_vec();
    let notified = Rc::new(RefCell::new(0u32));
    let sink = Rc::clone(&notified);
    p.subscribe(move |_| *sink.borrow_mut() += 1);

    let err = p.load(&PathBuf::from("colors.gpl"), &registry).unwrap_err();
    assert!(matches!(err, PaletteError::UnsupportedFormat { .. }));
    assert_eq!(p.colors(), before.as_slice());
    assert_eq!(*notified.borrow(), 0, "failed load must not notify");
}

#[test]
fn successful_load_replaces_all_entries_and_notifies() {
    let replacement = vec![Color::BLACK, Color::WHITE, Color::new(0.5, 0.0, 0.5, 1.0)];
    let mut registry = FormatRegistry::new();
    registry.add(format("gpl", Some(Arc::new(FixedLoader(replacement.clone())))));

    let mut p = Palette::with_default();
    let events: Rc<RefCell<Vec<PaletteChange>>> = Rc::default();
    let sink = Rc::clone(&events);
    p.subscribe(move |e| sink.borrow_mut().push(*e));

    p.load(&PathBuf::from("my.GPL"), &registry).unwrap();
    assert_eq!(p.colors(), replacement.as_slice());
    assert_eq!(*events.borrow(), vec![PaletteChange::Loaded]);
}

#[test]
fn save_delegates_entirely_to_the_saver() {
    let p = Palette::with_default();
    let seen: Rc<RefCell<Vec<Color>>> = Rc::default();
    let saver = RecordingSaver(Rc::clone(&seen));

    p.save(&PathBuf::from("anything.at-all"), &saver).unwrap();
    assert_eq!(seen.borrow().as_slice(), p.colors());
}
