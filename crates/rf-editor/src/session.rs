//! Interaction session state for one pointer gesture.
//!
//! A session is created on pointer-down, its cumulative drag vector is
//! updated on every pointer-move, and it is dropped on pointer-up or cancel.
//! Strategies read the session each frame; nothing about the chosen strategy
//! persists across gestures except the explicitly threaded custom state.

use rf_core::geometry::CanvasVector;
use serde::{Deserialize, Serialize};

/// Modifier-key state captured with each pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub alt: bool,
    pub shift: bool,
    pub cmd: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        alt: false,
        shift: false,
        cmd: false,
        ctrl: false,
    };

    pub const ALT: Modifiers = Modifiers {
        alt: true,
        shift: false,
        cmd: false,
        ctrl: false,
    };
}

/// The edge a grid resize handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridResizeEdge {
    RowStart,
    RowEnd,
    ColumnStart,
    ColumnEnd,
}

/// The on-canvas control the gesture started on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveControl {
    /// The body of a grid item (drag to move it between cells).
    GridCellHandle,
    /// One of the four resize handles of a grid item.
    GridResizeHandle { edge: GridResizeEdge },
    /// A flex-gap pill between two children.
    FlexGapHandle,
}

impl ActiveControl {
    pub fn kind(&self) -> ActiveControlKind {
        match self {
            ActiveControl::GridCellHandle => ActiveControlKind::GridCellHandle,
            ActiveControl::GridResizeHandle { .. } => ActiveControlKind::GridResizeHandle,
            ActiveControl::FlexGapHandle => ActiveControlKind::FlexGapHandle,
        }
    }
}

/// `ActiveControl` stripped of per-control payload, for kind matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveControlKind {
    GridCellHandle,
    GridResizeHandle,
    FlexGapHandle,
}

/// What the pointer has done so far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InteractionData {
    Drag {
        /// Canvas position of the pointer-down.
        start: CanvasVector,
        /// Cumulative drag vector; `None` until the first qualifying move.
        drag: Option<CanvasVector>,
        modifiers: Modifiers,
    },
    Hover {
        point: CanvasVector,
    },
}

/// One in-progress pointer gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionSession {
    pub interaction: InteractionData,
    pub active_control: ActiveControl,
}

impl InteractionSession {
    /// Pointer-down on a control: a drag session with no movement yet.
    pub fn begin_drag(
        start: CanvasVector,
        active_control: ActiveControl,
        modifiers: Modifiers,
    ) -> Self {
        Self {
            interaction: InteractionData::Drag {
                start,
                drag: None,
                modifiers,
            },
            active_control,
        }
    }

    /// Pointer-move: replace the cumulative drag vector and modifier state.
    pub fn update_drag(&mut self, drag: CanvasVector, modifiers: Modifiers) {
        if let InteractionData::Drag {
            drag: session_drag,
            modifiers: session_modifiers,
            ..
        } = &mut self.interaction
        {
            *session_drag = Some(drag);
            *session_modifiers = modifiers;
        }
    }

    /// The cumulative drag vector, when this is a drag session that has moved.
    pub fn drag(&self) -> Option<CanvasVector> {
        match self.interaction {
            InteractionData::Drag { drag, .. } => drag,
            InteractionData::Hover { .. } => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self.interaction {
            InteractionData::Drag { modifiers, .. } => modifiers,
            InteractionData::Hover { .. } => Modifiers::NONE,
        }
    }

    pub fn is_drag(&self) -> bool {
        matches!(self.interaction, InteractionData::Drag { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_core::geometry::canvas_vector;

    #[test]
    fn drag_session_lifecycle() {
        let mut session = InteractionSession::begin_drag(
            canvas_vector(10.0, 10.0),
            ActiveControl::GridCellHandle,
            Modifiers::NONE,
        );
        assert!(session.is_drag());
        assert_eq!(session.drag(), None);

        session.update_drag(canvas_vector(25.0, -5.0), Modifiers::ALT);
        assert_eq!(session.drag(), Some(canvas_vector(25.0, -5.0)));
        assert!(session.modifiers().alt);
    }

    #[test]
    fn control_kind_strips_payload() {
        let control = ActiveControl::GridResizeHandle {
            edge: GridResizeEdge::ColumnEnd,
        };
        assert_eq!(control.kind(), ActiveControlKind::GridResizeHandle);
    }
}
