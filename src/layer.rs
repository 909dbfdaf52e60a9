use image::RgbaImage;
use uuid::Uuid;

use crate::geom::Size;
use crate::selection::SelectionPath;

/// One image layer: a pixel surface plus paint attributes. Identity (for
/// "is this the active layer") is the `id`, not the position in the stack.
pub struct Layer {
    pub id: Uuid,
    pub name: String,
    pub visible: bool,
    /// Blend opacity in `[0, 1]` applied when compositing the layer.
    pub opacity: f32,
    pub surface: RgbaImage,
}

impl Layer {
    /// A fully transparent layer of the given size.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::from_surface(name, RgbaImage::new(width, height))
    }

    pub fn from_surface(name: impl Into<String>, surface: RgbaImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            visible: true,
            opacity: 1.0,
            surface,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.surface.width(), self.surface.height())
    }
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("visible", &self.visible)
            .field("opacity", &self.opacity)
            .field("surface", &format!("{}x{}", self.surface.width(), self.surface.height()))
            .finish()
    }
}

/// Ordered layer collection, bottom to top, with the current-layer cursor
/// and the selection state the compositor reads each frame.
pub struct LayerStack {
    layers: Vec<Layer>,
    current_index: usize,
    pub selection_path: SelectionPath,
    pub show_selection: bool,
}

impl LayerStack {
    /// A stack with a single base layer (every document has at least one).
    pub fn with_base_layer(layer: Layer) -> Self {
        Self {
            layers: vec![layer],
            current_index: 0,
            selection_path: SelectionPath::new(),
            show_selection: true,
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_layer(&self) -> &Layer {
        &self.layers[self.current_index]
    }

    pub fn current_layer_mut(&mut self) -> &mut Layer {
        &mut self.layers[self.current_index]
    }

    /// Make `index` current. Out-of-range indices are clamped to the top.
    pub fn set_current(&mut self, index: usize) {
        self.current_index = index.min(self.layers.len().saturating_sub(1));
    }

    /// Insert above the current layer and make the new layer current.
    pub fn add_layer(&mut self, layer: Layer) {
        let at = (self.current_index + 1).min(self.layers.len());
        self.layers.insert(at, layer);
        self.current_index = at;
    }

    /// Remove a layer. The last remaining layer cannot be removed.
    pub fn remove_layer(&mut self, index: usize) -> Option<Layer> {
        if self.layers.len() <= 1 || index >= self.layers.len() {
            return None;
        }
        let removed = self.layers.remove(index);
        if self.current_index >= self.layers.len() {
            self.current_index = self.layers.len() - 1;
        } else if index < self.current_index {
            self.current_index -= 1;
        }
        Some(removed)
    }

    /// Swap a layer with its upstairs neighbor.
    pub fn move_layer_up(&mut self, index: usize) -> bool {
        if index + 1 >= self.layers.len() {
            return false;
        }
        self.layers.swap(index, index + 1);
        if self.current_index == index {
            self.current_index = index + 1;
        } else if self.current_index == index + 1 {
            self.current_index = index;
        }
        true
    }

    /// The layers a frame paints, bottom to top; hidden layers excluded.
    pub fn layers_to_paint(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.visible)
    }

    pub fn has_selection(&self) -> bool {
        !self.selection_path.is_empty()
    }

    pub fn clear_selection(&mut self) {
        self.selection_path = SelectionPath::new();
    }
}

impl std::fmt::Debug for LayerStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerStack")
            .field("layers", &self.layers.len())
            .field("current_index", &self.current_index)
            .field("show_selection", &self.show_selection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_of(names: &[&str]) -> LayerStack {
        let mut it = names.iter();
        let mut stack = LayerStack::with_base_layer(Layer::new(*it.next().unwrap(), 4, 4));
        for name in it {
            stack.add_layer(Layer::new(*name, 4, 4));
        }
        stack
    }

    #[test]
    fn add_inserts_above_current_and_selects_it() {
        let stack = stack_of(&["bg", "a", "b"]);
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.current_layer().name, "b");
        let order: Vec<&str> = stack.layers_to_paint().map(|l| l.name.as_str()).collect();
        assert_eq!(order, ["bg", "a", "b"]);
    }

    #[test]
    fn hidden_layers_are_skipped_in_paint_order() {
        let mut stack = stack_of(&["bg", "a", "b"]);
        stack.get_mut(1).unwrap().visible = false;
        let order: Vec<&str> = stack.layers_to_paint().map(|l| l.name.as_str()).collect();
        assert_eq!(order, ["bg", "b"]);
    }

    #[test]
    fn last_layer_cannot_be_removed() {
        let mut stack = stack_of(&["only"]);
        assert!(stack.remove_layer(0).is_none());
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn remove_below_current_shifts_cursor() {
        let mut stack = stack_of(&["bg", "a", "b"]);
        assert_eq!(stack.current_index(), 2);
        stack.remove_layer(0);
        assert_eq!(stack.current_layer().name, "b");
    }

    #[test]
    fn move_up_follows_current() {
        let mut stack = stack_of(&["bg", "a", "b"]);
        stack.set_current(1);
        assert!(stack.move_layer_up(1));
        assert_eq!(stack.current_index(), 2);
        assert_eq!(stack.current_layer().name, "a");
        assert!(!stack.move_layer_up(2));
    }
}
