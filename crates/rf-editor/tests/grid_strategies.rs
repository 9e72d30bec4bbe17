//! Integration tests: full gesture lifecycle against a 3×3 grid fixture.
//!
//! Exercises strategy selection (fitness tiers), per-frame `apply`
//! recomputation, duplicate-UID caching in custom state, and the no-op
//! policy for unmeasurable geometry.

use pretty_assertions::assert_eq;
use rf_core::Uid;
use rf_core::geometry::{CanvasRect, canvas_rect, canvas_vector};
use rf_core::grid::{GridPosition, GridTemplate, GridTrack, parse_grid_template};
use rf_core::path::ElementPath;
use rf_core::uid::UidSet;
use rf_editor::command::CanvasCommand;
use rf_editor::metadata::{
    Display, ElementMetadata, ElementMetadataMap, SizingBehavior, SpecialSizeMeasurements,
};
use rf_editor::session::{ActiveControl, GridResizeEdge, InteractionSession, Modifiers};
use rf_editor::strategy::{
    CanvasState, CustomStrategyState, default_strategies, find_canvas_strategy,
};

// ─── Fixture ─────────────────────────────────────────────────────────────

fn cell_frames() -> Vec<Vec<CanvasRect>> {
    (0..3)
        .map(|row| {
            (0..3)
                .map(|col| canvas_rect(col as f64 * 100.0, row as f64 * 100.0, 100.0, 100.0))
                .collect()
        })
        .collect()
}

fn grid_template() -> GridTemplate {
    GridTemplate {
        rows: vec![GridTrack::Fr(1.0); 3],
        columns: parse_grid_template("repeat(3, 1fr)").unwrap(),
    }
}

fn grid_path() -> ElementPath {
    ElementPath::from_strs(&["sb", "grid"])
}

fn item_path() -> ElementPath {
    grid_path().append(Uid::intern("item"))
}

/// A 3×3 grid with one fill-sized item occupying cell (0, 0).
fn canvas_state() -> CanvasState {
    let mut metadata = ElementMetadataMap::new();
    metadata.insert(
        grid_path(),
        ElementMetadata {
            global_frame: Some(canvas_rect(0.0, 0.0, 300.0, 300.0)),
            special: SpecialSizeMeasurements {
                display: Some(Display::Grid),
                ..Default::default()
            },
            element: None,
        },
    );
    metadata.insert(
        item_path(),
        ElementMetadata {
            global_frame: Some(canvas_rect(0.0, 0.0, 100.0, 100.0)),
            special: SpecialSizeMeasurements {
                parent_grid_cell_global_frames: Some(cell_frames()),
                parent_container_grid_properties: grid_template(),
                width_sizing: SizingBehavior::Fill,
                ..Default::default()
            },
            element: None,
        },
    );

    CanvasState {
        selected_views: vec![item_path()],
        starting_metadata: metadata,
        project_uids: UidSet::new(),
    }
}

fn drag_session(control: ActiveControl, modifiers: Modifiers, drag: (f64, f64)) -> InteractionSession {
    let mut session = InteractionSession::begin_drag(canvas_vector(50.0, 50.0), control, modifiers);
    session.update_drag(canvas_vector(drag.0, drag.1), modifiers);
    session
}

fn placement_command(commands: &[CanvasCommand]) -> &CanvasCommand {
    commands
        .iter()
        .find(|c| matches!(c, CanvasCommand::SetGridPlacement { .. }))
        .expect("batch should contain a grid placement")
}

// ─── Strategy selection ──────────────────────────────────────────────────

#[test]
fn plain_drag_picks_the_move_strategy() {
    let state = canvas_state();
    let session = drag_session(ActiveControl::GridCellHandle, Modifiers::NONE, (100.0, 0.0));
    let winner = find_canvas_strategy(
        &default_strategies(),
        &state,
        &session,
        &CustomStrategyState::default(),
    )
    .expect("a strategy should apply");
    assert_eq!(winner.id(), "grid-change-element-location-strategy");
}

#[test]
fn alt_drag_outranks_the_plain_move() {
    let state = canvas_state();
    let session = drag_session(ActiveControl::GridCellHandle, Modifiers::ALT, (100.0, 0.0));
    let winner = find_canvas_strategy(
        &default_strategies(),
        &state,
        &session,
        &CustomStrategyState::default(),
    )
    .expect("a strategy should apply");
    assert_eq!(winner.id(), "grid-change-element-location-duplicate-strategy");
}

#[test]
fn resize_handle_picks_the_resize_strategy() {
    let state = canvas_state();
    let session = drag_session(
        ActiveControl::GridResizeHandle {
            edge: GridResizeEdge::ColumnEnd,
        },
        Modifiers::NONE,
        (80.0, 0.0),
    );
    let winner = find_canvas_strategy(
        &default_strategies(),
        &state,
        &session,
        &CustomStrategyState::default(),
    )
    .expect("a strategy should apply");
    assert_eq!(winner.id(), "GRID-CELL-RESIZE-STRATEGY");
}

#[test]
fn non_grid_selection_matches_nothing() {
    let mut state = canvas_state();
    state.selected_views = vec![ElementPath::from_strs(&["sb", "loose"])];
    let session = drag_session(ActiveControl::GridCellHandle, Modifiers::NONE, (10.0, 0.0));
    assert!(
        find_canvas_strategy(
            &default_strategies(),
            &state,
            &session,
            &CustomStrategyState::default(),
        )
        .is_none()
    );
}

// ─── Grid move ───────────────────────────────────────────────────────────

#[test]
fn moving_one_cell_right_reanchors_the_placement() {
    let state = canvas_state();
    let session = drag_session(ActiveControl::GridCellHandle, Modifiers::NONE, (100.0, 0.0));
    let strategy = find_canvas_strategy(
        &default_strategies(),
        &state,
        &session,
        &CustomStrategyState::default(),
    )
    .unwrap();

    let result = strategy.apply(&state, &session, &CustomStrategyState::default());
    assert_eq!(result.new_selected_views, vec![item_path()]);

    match placement_command(&result.commands) {
        CanvasCommand::SetGridPlacement {
            target, placement, ..
        } => {
            assert_eq!(*target, item_path());
            assert_eq!(placement.column_start, GridPosition::Line(2));
            assert_eq!(placement.column_end, GridPosition::Auto);
            assert_eq!(placement.row_start, GridPosition::Line(1));
            assert_eq!(placement.row_end, GridPosition::Auto);
        }
        other => panic!("expected placement, got {other:?}"),
    }
}

#[test]
fn move_before_first_pointer_move_is_a_no_op() {
    let state = canvas_state();
    // Pointer-down only: the session exists but has no drag vector yet.
    let session = InteractionSession::begin_drag(
        canvas_vector(50.0, 50.0),
        ActiveControl::GridCellHandle,
        Modifiers::NONE,
    );
    let strategy = find_canvas_strategy(
        &default_strategies(),
        &state,
        &session,
        &CustomStrategyState::default(),
    )
    .unwrap();
    let result = strategy.apply(&state, &session, &CustomStrategyState::default());
    assert!(result.is_empty());
}

// ─── Duplicate on alt-drag ───────────────────────────────────────────────

#[test]
fn duplicate_uid_is_stable_within_one_gesture() {
    let state = canvas_state();
    let session = drag_session(ActiveControl::GridCellHandle, Modifiers::ALT, (100.0, 0.0));
    let strategy = find_canvas_strategy(
        &default_strategies(),
        &state,
        &session,
        &CustomStrategyState::default(),
    )
    .unwrap();

    let first = strategy.apply(&state, &session, &CustomStrategyState::default());
    let threaded = first.custom_state.clone().expect("custom state update");
    let second = strategy.apply(&state, &session, &threaded);

    let uid_of = |result: &rf_editor::strategy::StrategyResult| match &result.commands[0] {
        CanvasCommand::DuplicateElement { new_uid, .. } => *new_uid,
        other => panic!("expected duplicate first, got {other:?}"),
    };

    let first_uid = uid_of(&first);
    assert_eq!(first_uid, uid_of(&second), "same gesture, same duplicate");
    assert!(first_uid.as_str().starts_with("dup-"));

    // A separate gesture starts with fresh custom state and mints a new one.
    let other_gesture = strategy.apply(&state, &session, &CustomStrategyState::default());
    assert_ne!(first_uid, uid_of(&other_gesture));
}

#[test]
fn duplicate_batch_retargets_selection_and_cursor() {
    let state = canvas_state();
    let session = drag_session(ActiveControl::GridCellHandle, Modifiers::ALT, (100.0, 0.0));
    let strategy = find_canvas_strategy(
        &default_strategies(),
        &state,
        &session,
        &CustomStrategyState::default(),
    )
    .unwrap();
    let result = strategy.apply(&state, &session, &CustomStrategyState::default());

    let new_uid = match &result.commands[0] {
        CanvasCommand::DuplicateElement { new_uid, .. } => *new_uid,
        other => panic!("expected duplicate first, got {other:?}"),
    };
    let duplicate_path = grid_path().append(new_uid);

    assert!(result.commands.iter().any(|c| matches!(
        c,
        CanvasCommand::UpdateSelectedViews { views, .. } if views == &vec![duplicate_path.clone()]
    )));
    assert!(result.commands.iter().any(|c| matches!(
        c,
        CanvasCommand::UpdateHighlightedViews { views, .. } if views == &vec![duplicate_path.clone()]
    )));
    assert!(result
        .commands
        .iter()
        .any(|c| matches!(c, CanvasCommand::SetCursor { .. })));
    // Both the original and the duplicate end up selected.
    assert_eq!(result.new_selected_views, vec![item_path(), duplicate_path]);
}

// ─── Grid resize ─────────────────────────────────────────────────────────

#[test]
fn resizing_right_edge_across_a_column_extends_the_end_line() {
    let state = canvas_state();
    let session = drag_session(
        ActiveControl::GridResizeHandle {
            edge: GridResizeEdge::ColumnEnd,
        },
        Modifiers::NONE,
        (80.0, 0.0),
    );
    let strategy = find_canvas_strategy(
        &default_strategies(),
        &state,
        &session,
        &CustomStrategyState::default(),
    )
    .unwrap();
    let result = strategy.apply(&state, &session, &CustomStrategyState::default());

    match placement_command(&result.commands) {
        CanvasCommand::SetGridPlacement { placement, .. } => {
            assert_eq!(placement.column_start, GridPosition::Line(1));
            assert_eq!(placement.column_end, GridPosition::Line(3));
            assert_eq!(placement.row_start, GridPosition::Line(1));
            assert_eq!(placement.row_end, GridPosition::Line(2));
        }
        other => panic!("expected placement, got {other:?}"),
    }
    // The parent grid is re-selected after a resize.
    assert_eq!(result.new_selected_views, vec![grid_path()]);
}

#[test]
fn resize_with_missing_cell_bounds_is_a_no_op() {
    let mut state = canvas_state();
    // Strip the measured cell matrix from the item.
    let mut item = state.starting_metadata.find(&item_path()).unwrap().clone();
    item.special.parent_grid_cell_global_frames = None;
    state.starting_metadata.insert(item_path(), item);

    let session = drag_session(
        ActiveControl::GridResizeHandle {
            edge: GridResizeEdge::ColumnEnd,
        },
        Modifiers::NONE,
        (80.0, 0.0),
    );
    let strategy = find_canvas_strategy(
        &default_strategies(),
        &state,
        &session,
        &CustomStrategyState::default(),
    )
    .unwrap();
    let result = strategy.apply(&state, &session, &CustomStrategyState::default());
    assert!(result.commands.is_empty());
    assert!(result.new_selected_views.is_empty());
}

#[test]
fn fixed_size_items_do_not_get_the_resize_strategy() {
    let mut state = canvas_state();
    let mut item = state.starting_metadata.find(&item_path()).unwrap().clone();
    item.special.width_sizing = SizingBehavior::Fixed;
    item.special.height_sizing = SizingBehavior::Fixed;
    state.starting_metadata.insert(item_path(), item);

    let session = drag_session(
        ActiveControl::GridResizeHandle {
            edge: GridResizeEdge::ColumnEnd,
        },
        Modifiers::NONE,
        (80.0, 0.0),
    );
    assert!(
        find_canvas_strategy(
            &default_strategies(),
            &state,
            &session,
            &CustomStrategyState::default(),
        )
        .is_none()
    );
}
