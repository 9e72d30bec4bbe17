//! The canvas strategy engine.
//!
//! A strategy interprets an in-progress pointer gesture against the
//! gesture-start snapshot and proposes a batch of commands. Strategy
//! factories are evaluated on every qualifying frame; each either declines
//! (`None`) or returns a handle carrying identity, a fitness score, and an
//! `apply` implementation. Exactly one handle wins per frame — the highest
//! fitness, ties broken by registration order.
//!
//! `apply` must be safe to invoke once per animation frame: everything is
//! recomputed from the current session and snapshot except identity
//! decisions cached in the per-gesture custom state.

use crate::command::CanvasCommand;
use crate::metadata::ElementMetadataMap;
use crate::session::{ActiveControlKind, InteractionSession};
use rf_core::path::ElementPath;
use rf_core::uid::{Uid, UidSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─── Snapshot & custom state ─────────────────────────────────────────────

/// Everything a strategy may read, captured at gesture start and immutable
/// for the lifetime of the gesture.
#[derive(Debug, Clone, Default)]
pub struct CanvasState {
    pub selected_views: Vec<ElementPath>,
    pub starting_metadata: ElementMetadataMap,
    /// Every UID present in the project's parsed trees at gesture start.
    pub project_uids: UidSet,
}

/// Per-gesture state a strategy may thread between `apply` calls. Each
/// strategy owns a declared slice; nothing here survives the gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomStrategyState {
    /// Original element UID → UID generated for its duplicate, so repeated
    /// `apply` calls during one drag reuse the same duplicate.
    pub duplicated_element_uids: HashMap<Uid, Uid>,
}

/// The outcome of one `apply` call: a command batch that must be safe to
/// apply atomically, the selection that should follow it, and any custom
/// state to carry to the next frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyResult {
    pub commands: Vec<CanvasCommand>,
    pub new_selected_views: Vec<ElementPath>,
    pub custom_state: Option<CustomStrategyState>,
}

impl StrategyResult {
    /// The recognized "cannot proceed this frame" state: no commands, no
    /// selection change. The gesture simply renders no change this frame and
    /// is retried on the next pointer-move.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(
        commands: Vec<CanvasCommand>,
        new_selected_views: Vec<ElementPath>,
        custom_state: Option<CustomStrategyState>,
    ) -> Self {
        Self {
            commands,
            new_selected_views,
            custom_state,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.new_selected_views.is_empty()
    }
}

// ─── Strategy trait & registry ───────────────────────────────────────────

pub trait CanvasStrategy {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;

    /// Numeric priority for this frame; 0 means unfit.
    fn fitness(&self, session: &InteractionSession) -> u32;

    fn apply(
        &self,
        canvas_state: &CanvasState,
        session: &InteractionSession,
        custom_state: &CustomStrategyState,
    ) -> StrategyResult;
}

/// A strategy factory: gates applicability (session type, control kind,
/// modifiers, then metadata) and returns `None` on the first failing check.
pub type StrategyFactory =
    fn(&CanvasState, &InteractionSession, &CustomStrategyState) -> Option<Box<dyn CanvasStrategy>>;

/// The built-in registry, evaluated in order each frame.
pub fn default_strategies() -> Vec<StrategyFactory> {
    vec![
        crate::strategies::grid_move::grid_change_element_location_strategy,
        crate::strategies::grid_move_duplicate::grid_change_element_location_duplicate_strategy,
        crate::strategies::grid_resize::grid_resize_element_strategy,
    ]
}

/// Evaluate every factory and pick the single winner for this frame.
pub fn find_canvas_strategy(
    factories: &[StrategyFactory],
    canvas_state: &CanvasState,
    session: &InteractionSession,
    custom_state: &CustomStrategyState,
) -> Option<Box<dyn CanvasStrategy>> {
    let mut winner: Option<(u32, Box<dyn CanvasStrategy>)> = None;
    for factory in factories {
        let Some(strategy) = factory(canvas_state, session, custom_state) else {
            continue;
        };
        let fitness = strategy.fitness(session);
        if fitness == 0 {
            continue;
        }
        log::debug!(
            "strategy {} applicable with fitness {fitness}",
            strategy.id()
        );
        let better = match &winner {
            Some((best, _)) => fitness > *best,
            None => true,
        };
        if better {
            winner = Some((fitness, strategy));
        }
    }
    winner.map(|(_, strategy)| strategy)
}

/// Encodes "only fit when dragging this control": the fixed priority iff the
/// session is a drag on a control of the given kind, else unfit.
pub fn only_fit_when_dragging_this_control(
    session: &InteractionSession,
    kind: ActiveControlKind,
    fitness: u32,
) -> u32 {
    if session.is_drag() && session.active_control.kind() == kind {
        fitness
    } else {
        0
    }
}
