//! Declarative canvas commands.
//!
//! A strategy never mutates the element tree; it emits an ordered batch of
//! serializable commands that a single external executor applies to the
//! authoritative model. Each command carries a `WhenToApply` qualifier so the
//! executor can filter the same batch differently while the gesture is in
//! progress versus when it completes.

use rf_core::grid::{GridPlacement, GridTemplate};
use rf_core::path::ElementPath;
use rf_core::uid::Uid;
use serde::{Deserialize, Serialize};

/// When the executor should honor a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WhenToApply {
    /// On every frame and at gesture end.
    Always,
    /// Only while the gesture is still in progress (transient UI state).
    MidInteraction,
    /// Only once the gesture has finished.
    OnComplete,
}

/// Cursors a strategy can request while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CssCursor {
    Move,
    Duplicate,
    Cell,
    GapNs,
    GapEw,
}

/// An immutable intent to mutate the model or transient UI state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CanvasCommand {
    /// Clone the element at `target`, giving the clone `new_uid`.
    DuplicateElement {
        when: WhenToApply,
        target: ElementPath,
        new_uid: Uid,
    },
    UpdateSelectedViews {
        when: WhenToApply,
        views: Vec<ElementPath>,
    },
    UpdateHighlightedViews {
        when: WhenToApply,
        views: Vec<ElementPath>,
    },
    SetCursor {
        when: WhenToApply,
        cursor: CssCursor,
    },
    /// Write the four grid placement props of `target`.
    SetGridPlacement {
        when: WhenToApply,
        target: ElementPath,
        template: GridTemplate,
        placement: GridPlacement,
    },
    /// Freeze a grid container's template to its measured tracks so auto
    /// tracks cannot reflow mid-gesture.
    PinGridTemplate {
        when: WhenToApply,
        target: ElementPath,
        template: GridTemplate,
    },
    /// Drop a template freeze installed by `PinGridTemplate`.
    UnpinGridTemplate {
        when: WhenToApply,
        target: ElementPath,
    },
}

impl CanvasCommand {
    pub fn when(&self) -> WhenToApply {
        match self {
            CanvasCommand::DuplicateElement { when, .. }
            | CanvasCommand::UpdateSelectedViews { when, .. }
            | CanvasCommand::UpdateHighlightedViews { when, .. }
            | CanvasCommand::SetCursor { when, .. }
            | CanvasCommand::SetGridPlacement { when, .. }
            | CanvasCommand::PinGridTemplate { when, .. }
            | CanvasCommand::UnpinGridTemplate { when, .. } => *when,
        }
    }
}

// Constructor helpers keep strategy code terse.

pub fn duplicate_element(when: WhenToApply, target: ElementPath, new_uid: Uid) -> CanvasCommand {
    CanvasCommand::DuplicateElement {
        when,
        target,
        new_uid,
    }
}

pub fn update_selected_views(when: WhenToApply, views: Vec<ElementPath>) -> CanvasCommand {
    CanvasCommand::UpdateSelectedViews { when, views }
}

pub fn update_highlighted_views(when: WhenToApply, views: Vec<ElementPath>) -> CanvasCommand {
    CanvasCommand::UpdateHighlightedViews { when, views }
}

pub fn set_cursor_command(cursor: CssCursor) -> CanvasCommand {
    CanvasCommand::SetCursor {
        when: WhenToApply::MidInteraction,
        cursor,
    }
}

/// The placement command for one grid item, carrying the container template
/// it was computed against.
pub fn set_grid_placement(
    target: ElementPath,
    template: GridTemplate,
    placement: GridPlacement,
) -> CanvasCommand {
    CanvasCommand::SetGridPlacement {
        when: WhenToApply::Always,
        target,
        template,
        placement,
    }
}

/// Whether the executor should run `command` given the gesture phase.
pub fn applies_in_phase(command: &CanvasCommand, interaction_finished: bool) -> bool {
    match command.when() {
        WhenToApply::Always => true,
        WhenToApply::MidInteraction => !interaction_finished,
        WhenToApply::OnComplete => interaction_finished,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_filtering() {
        let mid = set_cursor_command(CssCursor::Move);
        let always = update_selected_views(WhenToApply::Always, vec![]);
        let complete = CanvasCommand::UnpinGridTemplate {
            when: WhenToApply::OnComplete,
            target: ElementPath::from_strs(&["sb", "grid"]),
        };

        assert!(applies_in_phase(&mid, false));
        assert!(!applies_in_phase(&mid, true));
        assert!(applies_in_phase(&always, false));
        assert!(applies_in_phase(&always, true));
        assert!(!applies_in_phase(&complete, false));
        assert!(applies_in_phase(&complete, true));
    }
}
