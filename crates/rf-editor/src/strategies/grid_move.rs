//! Move a grid item to a different cell range by dragging its body.

use crate::session::{ActiveControl, ActiveControlKind, InteractionSession};
use crate::strategies::{
    grid_move_extra_commands, parent_grid_templates_from_child_measurements,
    run_grid_change_element_location,
};
use crate::strategy::{
    CanvasState, CanvasStrategy, CustomStrategyState, StrategyResult,
    only_fit_when_dragging_this_control,
};
use crate::command::{WhenToApply, update_selected_views};
use rf_core::grid::GridTemplate;
use rf_core::path::ElementPath;

pub fn grid_change_element_location_strategy(
    canvas_state: &CanvasState,
    session: &InteractionSession,
    _custom_state: &CustomStrategyState,
) -> Option<Box<dyn CanvasStrategy>> {
    if canvas_state.selected_views.len() != 1 {
        return None;
    }
    if !session.is_drag() || session.active_control != ActiveControl::GridCellHandle {
        return None;
    }

    let selected = canvas_state.selected_views[0].clone();
    if !canvas_state.starting_metadata.is_grid_item(&selected) {
        return None;
    }
    let metadata = canvas_state.starting_metadata.find(&selected)?;
    let initial_template = parent_grid_templates_from_child_measurements(&metadata.special)?;

    let parent_grid_path = canvas_state
        .starting_metadata
        .find_original_grid(&selected.parent()?)?;
    // An unmeasurable grid frame means nothing can be placed this gesture.
    canvas_state
        .starting_metadata
        .frame_in_canvas_coords(&parent_grid_path)?;

    Some(Box::new(GridChangeElementLocation {
        selected,
        parent_grid_path,
        initial_template,
    }))
}

struct GridChangeElementLocation {
    selected: ElementPath,
    parent_grid_path: ElementPath,
    initial_template: GridTemplate,
}

impl CanvasStrategy for GridChangeElementLocation {
    fn id(&self) -> &'static str {
        "grid-change-element-location-strategy"
    }

    fn name(&self) -> &'static str {
        "Change Location"
    }

    fn fitness(&self, session: &InteractionSession) -> u32 {
        only_fit_when_dragging_this_control(session, ActiveControlKind::GridCellHandle, 2)
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
        if session.active_control != ActiveControl::GridCellHandle {
            return StrategyResult::empty();
        }
        let Some(metadata) = canvas_state.starting_metadata.find(&self.selected) else {
            return StrategyResult::empty();
        };
        let Some(cell_frames) = &metadata.special.parent_grid_cell_global_frames else {
            return StrategyResult::empty();
        };

        let move_commands = run_grid_change_element_location(
            drag,
            metadata,
            &self.selected,
            &self.initial_template,
            cell_frames,
        );
        if move_commands.is_empty() {
            return StrategyResult::empty();
        }

        let (mid_interaction, on_complete) =
            grid_move_extra_commands(&self.parent_grid_path, &self.initial_template);

        let mut commands = move_commands;
        commands.extend(mid_interaction);
        commands.extend(on_complete);
        commands.push(update_selected_views(
            WhenToApply::Always,
            vec![self.selected.clone()],
        ));

        StrategyResult::new(commands, vec![self.selected.clone()], None)
    }
}
