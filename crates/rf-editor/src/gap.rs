//! Gap control geometry for flex and grid containers.
//!
//! Each gap between two consecutive children gets one interactable
//! rectangle, sized to exactly the gap and positioned immediately after the
//! leading child's far edge. Reverse flex directions flip the visual order,
//! which changes what elements sit either side of each gap.

use crate::command::CssCursor;
use crate::metadata::{Display, ElementMetadataMap, FlexDirection};
use rf_core::geometry::{CanvasRect, CanvasVector, canvas_rect, inset_rect};
use rf_core::path::ElementPath;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Row,
    Column,
}

/// A child path together with its gap-control rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct PathWithBounds {
    pub path: ElementPath,
    pub bounds: CanvasRect,
}

/// The drag component that matters for a gap in the given flex direction,
/// sign-flipped for reverse directions.
pub fn drag_delta_for_orientation(direction: FlexDirection, delta: CanvasVector) -> f64 {
    match direction {
        FlexDirection::Row => delta.x,
        FlexDirection::RowReverse => -delta.x,
        FlexDirection::Column => delta.y,
        FlexDirection::ColumnReverse => -delta.y,
    }
}

pub fn cursor_from_flex_direction(direction: FlexDirection) -> CssCursor {
    match direction {
        FlexDirection::Column | FlexDirection::ColumnReverse => CssCursor::GapNs,
        FlexDirection::Row | FlexDirection::RowReverse => CssCursor::GapEw,
    }
}

pub fn cursor_from_axis(axis: Axis) -> CssCursor {
    match axis {
        Axis::Column => CssCursor::GapEw,
        Axis::Row => CssCursor::GapNs,
    }
}

/// The gap rectangle immediately after one child, spanning the parent's
/// cross axis.
pub fn gap_control_bounds(
    parent_bounds: CanvasRect,
    child_bounds: CanvasRect,
    flex_direction: FlexDirection,
    gap: f64,
) -> CanvasRect {
    if flex_direction.is_horizontal() {
        canvas_rect(
            child_bounds.right(),
            parent_bounds.y,
            gap,
            parent_bounds.height,
        )
    } else {
        canvas_rect(
            parent_bounds.x,
            child_bounds.bottom(),
            parent_bounds.width,
            gap,
        )
    }
}

/// One gap-control rectangle per gap between consecutive children of a flex
/// parent. Children that could not be measured are skipped; an unmeasurable
/// parent produces no controls at all.
pub fn gap_control_bounds_from_metadata(
    metadata: &ElementMetadataMap,
    parent_path: &ElementPath,
    children: &[ElementPath],
    gap: f64,
    flex_direction: FlexDirection,
) -> Vec<PathWithBounds> {
    let padding = metadata
        .find(parent_path)
        .map(|m| m.special.padding)
        .unwrap_or_default();
    let Some(parent_frame) = metadata.frame_in_canvas_coords(parent_path) else {
        return Vec::new();
    };
    let parent_bounds = inset_rect(padding, parent_frame);

    let mut ordered: Vec<&ElementPath> = children.iter().collect();
    if flex_direction.is_reversed() {
        ordered.reverse();
    }

    let mut measured: Vec<Option<PathWithBounds>> = ordered
        .into_iter()
        .map(|child_path| {
            metadata
                .frame_in_canvas_coords(child_path)
                .map(|bounds| PathWithBounds {
                    path: child_path.clone(),
                    bounds,
                })
        })
        .collect();
    // The last child has no gap after it, measured or not.
    measured.pop();

    measured
        .into_iter()
        .flatten()
        .map(|child| PathWithBounds {
            bounds: gap_control_bounds(parent_bounds, child.bounds, flex_direction, gap),
            path: child.path,
        })
        .collect()
}

// ─── Gap data extraction ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexGapData {
    pub gap: f64,
    pub direction: FlexDirection,
}

/// The flex gap of `element_path`, or `None` when it is not a flex container
/// or distributes children with a `space-*` justification (no fixed gaps to
/// grab).
pub fn maybe_flex_gap_data(
    metadata: &ElementMetadataMap,
    element_path: &ElementPath,
) -> Option<FlexGapData> {
    let element = metadata.find(element_path)?;
    if element.special.display != Some(Display::Flex) {
        return None;
    }
    if element
        .special
        .justify_content
        .as_deref()
        .is_some_and(|justify| justify.starts_with("space"))
    {
        return None;
    }
    Some(FlexGapData {
        gap: element.special.gap.unwrap_or(0.0),
        direction: element.special.flex_direction,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGapData {
    pub row: f64,
    pub column: f64,
}

/// The row/column gaps of a grid container, falling back to the shorthand
/// gap, or `None` for non-grid elements.
pub fn maybe_grid_gap_data(
    metadata: &ElementMetadataMap,
    element_path: &ElementPath,
) -> Option<GridGapData> {
    let element = metadata.find(element_path)?;
    if element.special.display != Some(Display::Grid) {
        return None;
    }
    let shorthand = element.special.gap;
    Some(GridGapData {
        row: element.special.row_gap.or(shorthand).unwrap_or(0.0),
        column: element.special.column_gap.or(shorthand).unwrap_or(0.0),
    })
}
