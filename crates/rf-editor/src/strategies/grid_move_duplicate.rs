//! Alt-drag a grid item: duplicate it and place the copy.
//!
//! The duplicate's UID is decided once per gesture and cached in the custom
//! strategy state keyed by the original UID, so every `apply` during the
//! same drag reuses the same duplicate instead of minting one per frame.

use crate::command::{
    CssCursor, WhenToApply, duplicate_element, set_cursor_command, update_highlighted_views,
    update_selected_views,
};
use crate::session::{ActiveControl, ActiveControlKind, InteractionSession};
use crate::strategies::{
    grid_move_extra_commands, parent_grid_templates_from_child_measurements,
    run_grid_change_element_location,
};
use crate::strategy::{
    CanvasState, CanvasStrategy, CustomStrategyState, StrategyResult,
    only_fit_when_dragging_this_control,
};
use rf_core::grid::GridTemplate;
use rf_core::path::ElementPath;
use rf_core::uid::{Uid, generate_uid};

pub fn grid_change_element_location_duplicate_strategy(
    canvas_state: &CanvasState,
    session: &InteractionSession,
    _custom_state: &CustomStrategyState,
) -> Option<Box<dyn CanvasStrategy>> {
    if canvas_state.selected_views.is_empty() {
        return None;
    }
    if !session.is_drag()
        || session.drag().is_none()
        || session.active_control != ActiveControl::GridCellHandle
        || !session.modifiers().alt
    {
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
    canvas_state
        .starting_metadata
        .frame_in_canvas_coords(&parent_grid_path)?;

    Some(Box::new(GridChangeElementLocationDuplicate {
        selected,
        all_selected: canvas_state.selected_views.clone(),
        parent_grid_path,
        initial_template,
    }))
}

struct GridChangeElementLocationDuplicate {
    selected: ElementPath,
    all_selected: Vec<ElementPath>,
    parent_grid_path: ElementPath,
    initial_template: GridTemplate,
}

impl CanvasStrategy for GridChangeElementLocationDuplicate {
    fn id(&self) -> &'static str {
        "grid-change-element-location-duplicate-strategy"
    }

    fn name(&self) -> &'static str {
        "Change Location (Duplicate)"
    }

    fn fitness(&self, session: &InteractionSession) -> u32 {
        only_fit_when_dragging_this_control(session, ActiveControlKind::GridCellHandle, 3)
    }

    fn apply(
        &self,
        canvas_state: &CanvasState,
        session: &InteractionSession,
        custom_state: &CustomStrategyState,
    ) -> StrategyResult {
        let Some(drag) = session.drag() else {
            return StrategyResult::empty();
        };
        if session.active_control != ActiveControl::GridCellHandle {
            return StrategyResult::empty();
        }
        let Some(old_uid) = self.selected.to_uid() else {
            return StrategyResult::empty();
        };

        let mut duplicated_element_uids = custom_state.duplicated_element_uids.clone();
        let new_uid = match duplicated_element_uids.get(&old_uid) {
            Some(cached) => *cached,
            None => {
                let fresh = generate_uid(&canvas_state.project_uids);
                let uid = Uid::intern(&format!("dup-{fresh}"));
                duplicated_element_uids.insert(old_uid, uid);
                uid
            }
        };

        let target_element = self.parent_grid_path.append(new_uid);

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

        // One atomic batch: create the duplicate, place, pin, retarget the
        // selection and highlight at the duplicate, switch the cursor.
        let mut commands = vec![duplicate_element(
            WhenToApply::Always,
            self.selected.clone(),
            new_uid,
        )];
        commands.extend(move_commands);
        commands.extend(mid_interaction);
        commands.extend(on_complete);
        commands.push(update_selected_views(
            WhenToApply::Always,
            vec![target_element.clone()],
        ));
        commands.push(update_highlighted_views(
            WhenToApply::Always,
            vec![target_element.clone()],
        ));
        commands.push(set_cursor_command(CssCursor::Duplicate));

        let mut new_selection = self.all_selected.clone();
        new_selection.push(target_element);

        StrategyResult::new(
            commands,
            new_selection,
            Some(CustomStrategyState {
                duplicated_element_uids,
            }),
        )
    }
}
