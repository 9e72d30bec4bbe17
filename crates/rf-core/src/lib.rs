pub mod element;
pub mod geometry;
pub mod grid;
pub mod path;
pub mod transform;
pub mod uid;
pub mod uid_fix;

pub use element::*;
pub use geometry::{
    CanvasRect, CanvasVector, Sides, canvas_rect, canvas_vector, inset_rect, rect_intersection,
    round_up_to_nearest_half, sides, wrap_value,
};
pub use grid::{
    GridBound, GridLineBounds, GridPlacement, GridPosition, GridTemplate, GridTrack,
    grid_line_bounds_from_resize_box, normalize_position_after_resize, parse_grid_position,
    parse_grid_template,
};
pub use path::ElementPath;
pub use transform::{
    find_element_at_path, generate_uid_with_existing_components, get_all_unique_uids,
    guarantee_unique_uids, insert_element_child, remove_element_child, transform_element_at_path,
    z_index_of_element,
};
pub use uid::{Uid, UidSet, generate_consistent_uid, generate_uid};
pub use uid_fix::{UidMapping, fix_parse_success_uids, update_highlight_bounds};
