//! Canvas strategies and their shared grid helpers.

pub mod grid_move;
pub mod grid_move_duplicate;
pub mod grid_resize;

use crate::command::{CanvasCommand, WhenToApply, set_grid_placement};
use crate::metadata::{ElementMetadata, SpecialSizeMeasurements};
use crate::session::GridResizeEdge;
use rf_core::geometry::{CanvasRect, CanvasVector, canvas_rect};
use rf_core::grid::{
    GridPlacement, GridPosition, GridTemplate, grid_line_bounds_from_resize_box,
};
use rf_core::path::ElementPath;

// ─── Resize helpers ──────────────────────────────────────────────────────

/// Grow or shrink `bounds` by dragging one edge while the opposite edge
/// stays fixed. Sizes clamp at zero instead of flipping.
pub fn resize_bounding_box_from_edge(
    bounds: CanvasRect,
    drag: CanvasVector,
    edge: GridResizeEdge,
) -> CanvasRect {
    match edge {
        GridResizeEdge::ColumnEnd => canvas_rect(
            bounds.x,
            bounds.y,
            (bounds.width + drag.x).max(0.0),
            bounds.height,
        ),
        GridResizeEdge::ColumnStart => {
            let new_x = (bounds.x + drag.x).min(bounds.right());
            canvas_rect(new_x, bounds.y, bounds.right() - new_x, bounds.height)
        }
        GridResizeEdge::RowEnd => canvas_rect(
            bounds.x,
            bounds.y,
            bounds.width,
            (bounds.height + drag.y).max(0.0),
        ),
        GridResizeEdge::RowStart => {
            let new_y = (bounds.y + drag.y).min(bounds.bottom());
            canvas_rect(bounds.x, new_y, bounds.width, bounds.bottom() - new_y)
        }
    }
}

// ─── Grid helpers ────────────────────────────────────────────────────────

/// The parent grid's template as measured on a child, or `None` when the
/// child has no measured container tracks at all.
pub fn parent_grid_templates_from_child_measurements(
    special: &SpecialSizeMeasurements,
) -> Option<GridTemplate> {
    let template = &special.parent_container_grid_properties;
    if template.rows.is_empty() && template.columns.is_empty() {
        return None;
    }
    Some(template.clone())
}

/// Template pinning around a grid move: freeze the container's measured
/// tracks while the gesture is live so auto tracks cannot reflow under the
/// pointer, and drop the freeze once it completes.
pub fn grid_move_extra_commands(
    grid_path: &ElementPath,
    template: &GridTemplate,
) -> (Vec<CanvasCommand>, Vec<CanvasCommand>) {
    let mid_interaction = vec![CanvasCommand::PinGridTemplate {
        when: WhenToApply::MidInteraction,
        target: grid_path.clone(),
        template: template.clone(),
    }];
    let on_complete = vec![CanvasCommand::UnpinGridTemplate {
        when: WhenToApply::OnComplete,
        target: grid_path.clone(),
    }];
    (mid_interaction, on_complete)
}

/// Compute the placement commands for moving a grid item by `drag`.
///
/// The item's current cell range is derived from its rendered frame; the
/// range is re-anchored at the cells under the shifted frame, preserving the
/// item's span sizes (an item spanning two columns still spans two columns
/// after the move, clamped inside the grid). Span-shaped props stay spans.
///
/// Returns an empty list when the frame, the cell matrix, or the shifted
/// intersection is missing — the caller must treat that as "no change this
/// frame".
pub fn run_grid_change_element_location(
    drag: CanvasVector,
    element_metadata: &ElementMetadata,
    target: &ElementPath,
    grid_template: &GridTemplate,
    cell_frames: &[Vec<CanvasRect>],
) -> Vec<CanvasCommand> {
    let Some(frame) = element_metadata.global_frame else {
        return Vec::new();
    };
    if frame.is_infinity() || cell_frames.is_empty() {
        return Vec::new();
    }

    let Some(original) = grid_line_bounds_from_resize_box(frame, cell_frames) else {
        return Vec::new();
    };
    let Some(shifted) = grid_line_bounds_from_resize_box(frame.shifted(drag), cell_frames) else {
        return Vec::new();
    };

    let row_span = original.row_end - original.row_start;
    let column_span = original.column_end - original.column_start;
    let row_count = cell_frames.len() as i64;
    let column_count = cell_frames.first().map(|row| row.len()).unwrap_or(0) as i64;

    // Re-anchor, clamped so the preserved span still fits inside the grid.
    let row_start = shifted.row_start.min((row_count - row_span + 1).max(1));
    let column_start = shifted
        .column_start
        .min((column_count - column_span + 1).max(1));

    let props = &element_metadata.special.element_grid_properties_from_props;
    let placement = GridPlacement {
        column_start: GridPosition::Line(column_start),
        column_end: moved_end_position(props.column_end, column_start, column_span),
        row_start: GridPosition::Line(row_start),
        row_end: moved_end_position(props.row_end, row_start, row_span),
    };

    vec![set_grid_placement(
        target.clone(),
        grid_template.clone(),
        placement,
    )]
}

/// The end-edge value after a move: spans survive as spans, multi-track
/// literals are re-anchored, single-track items stay `auto`.
fn moved_end_position(from_props: GridPosition, new_start: i64, span: i64) -> GridPosition {
    if from_props.is_span() {
        return GridPosition::Span(span);
    }
    if span > 1 {
        return GridPosition::Line(new_start + span);
    }
    GridPosition::Auto
}
