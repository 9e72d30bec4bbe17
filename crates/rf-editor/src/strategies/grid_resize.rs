//! Resize a grid item by dragging one of its edge handles.
//!
//! Only applies to items that already fill or stretch on at least one axis:
//! fixed-size items resize through the regular absolute-resize path, not by
//! re-assigning grid tracks.

use crate::command::set_grid_placement;
use crate::session::{ActiveControl, ActiveControlKind, InteractionSession};
use crate::strategies::resize_bounding_box_from_edge;
use crate::strategy::{
    CanvasState, CanvasStrategy, CustomStrategyState, StrategyResult,
    only_fit_when_dragging_this_control,
};
use rf_core::geometry::CanvasRect;
use rf_core::grid::{
    GridBound, GridPlacement, grid_line_bounds_from_resize_box, normalize_position_after_resize,
};
use rf_core::path::ElementPath;

pub fn grid_resize_element_strategy(
    canvas_state: &CanvasState,
    _session: &InteractionSession,
    _custom_state: &CustomStrategyState,
) -> Option<Box<dyn CanvasStrategy>> {
    if canvas_state.selected_views.len() != 1 {
        return None;
    }
    let selected = canvas_state.selected_views[0].clone();
    canvas_state.starting_metadata.find(&selected)?;
    if !canvas_state.starting_metadata.is_grid_item(&selected) {
        return None;
    }
    let selected_bounds = canvas_state
        .starting_metadata
        .frame_in_canvas_coords(&selected)?;
    if !canvas_state
        .starting_metadata
        .is_fill_or_stretch_on_any_side(&selected)
    {
        return None;
    }

    Some(Box::new(GridResizeElement {
        selected,
        selected_bounds,
    }))
}

struct GridResizeElement {
    selected: ElementPath,
    selected_bounds: CanvasRect,
}

impl CanvasStrategy for GridResizeElement {
    fn id(&self) -> &'static str {
        "GRID-CELL-RESIZE-STRATEGY"
    }

    fn name(&self) -> &'static str {
        "Resize Grid Cell"
    }

    fn fitness(&self, session: &InteractionSession) -> u32 {
        only_fit_when_dragging_this_control(session, ActiveControlKind::GridResizeHandle, 1)
    }

    fn apply(
        &self,
        canvas_state: &CanvasState,
        session: &InteractionSession,
        _custom_state: &CustomStrategyState,
    ) -> StrategyResult {
        let Some(drag) = session.drag() else {
            return StrategyResult::empty();
        };
        let ActiveControl::GridResizeHandle { edge } = session.active_control else {
            return StrategyResult::empty();
        };
        let Some(metadata) = canvas_state.starting_metadata.find(&self.selected) else {
            return StrategyResult::empty();
        };
        let Some(all_cell_bounds) = &metadata.special.parent_grid_cell_global_frames else {
            return StrategyResult::empty();
        };

        let resize_box = resize_bounding_box_from_edge(self.selected_bounds, drag, edge);
        let Some(lines) = grid_line_bounds_from_resize_box(resize_box, all_cell_bounds) else {
            return StrategyResult::empty();
        };

        let column_count = lines.column_end - lines.column_start;
        let row_count = lines.row_end - lines.row_start;
        let props = &metadata.special.element_grid_properties_from_props;

        let placement = GridPlacement {
            column_start: normalize_position_after_resize(
                props.column_start,
                lines.column_start,
                column_count,
                GridBound::Start,
                props.column_end,
                lines.column_end,
            ),
            column_end: normalize_position_after_resize(
                props.column_end,
                lines.column_end,
                column_count,
                GridBound::End,
                props.column_start,
                lines.column_start,
            ),
            row_start: normalize_position_after_resize(
                props.row_start,
                lines.row_start,
                row_count,
                GridBound::Start,
                props.row_end,
                lines.row_end,
            ),
            row_end: normalize_position_after_resize(
                props.row_end,
                lines.row_end,
                row_count,
                GridBound::End,
                props.row_start,
                lines.row_start,
            ),
        };

        let template = metadata.special.parent_container_grid_properties.clone();
        let new_selection = match self.selected.parent() {
            Some(parent) => vec![parent],
            None => Vec::new(),
        };

        StrategyResult::new(
            vec![set_grid_placement(self.selected.clone(), template, placement)],
            new_selection,
            None,
        )
    }
}
