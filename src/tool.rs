use serde::{Deserialize, Serialize};

/// How a tool relates to selections. An explicit capability tag — the
/// compositor never inspects tool display names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionBehavior {
    /// The tool ignores selections entirely.
    #[default]
    None,
    /// The tool creates/edits the selection (rectangle select, lasso, …).
    DrawsSelection,
    /// The tool operates within a previously made selection
    /// (move-selected, crop-to-selection, …).
    UsesExistingSelection,
}

impl SelectionBehavior {
    pub fn all() -> &'static [SelectionBehavior] {
        &[
            SelectionBehavior::None,
            SelectionBehavior::DrawsSelection,
            SelectionBehavior::UsesExistingSelection,
        ]
    }
}

/// The tool currently held by the user, as far as rendering cares.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveTool {
    pub name: String,
    pub behavior: SelectionBehavior,
    /// True while a selection drag is in progress.
    pub selecting: bool,
}

impl ActiveTool {
    pub fn new(name: impl Into<String>, behavior: SelectionBehavior) -> Self {
        Self { name: name.into(), behavior, selecting: false }
    }

    /// Whether the marquee gets its translucent interior fill this frame:
    /// only selection-drawing tools, and only mid-drag.
    pub fn draws_selection_feedback(&self) -> bool {
        self.behavior == SelectionBehavior::DrawsSelection && self.selecting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_requires_drawing_tool_and_active_drag() {
        let mut tool = ActiveTool::new("Rectangle Select", SelectionBehavior::DrawsSelection);
        assert!(!tool.draws_selection_feedback());
        tool.selecting = true;
        assert!(tool.draws_selection_feedback());

        let mut mover = ActiveTool::new("Move Selected", SelectionBehavior::UsesExistingSelection);
        mover.selecting = true;
        assert!(!mover.draws_selection_feedback());
    }
}
