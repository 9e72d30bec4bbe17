//! The rendered-element metadata snapshot.
//!
//! Metadata is produced by the rendering/measurement pipeline after every
//! render pass and consumed here read-only: a strategy only ever sees the
//! snapshot captured at gesture start. Entries may be missing or carry the
//! infinity sentinel for anything the DOM could not measure — every lookup
//! returns an `Option` and callers bail out instead of computing on gaps.

use rf_core::element::ElementChild;
use rf_core::geometry::{CanvasRect, Sides};
use rf_core::grid::{GridPlacement, GridTemplate};
use rf_core::path::ElementPath;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─── Layout facts ────────────────────────────────────────────────────────

/// The rendered `display` of an element, reduced to what the strategies
/// dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Display {
    Block,
    Flex,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlexDirection {
    #[default]
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    /// Reverse directions flip the visual order of children, which changes
    /// what elements sit either side of each gap.
    pub fn is_reversed(&self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }
}

/// How an element sizes itself on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SizingBehavior {
    /// Stretches to fill the available space.
    Fill,
    /// Shrinks to its content.
    Hug,
    #[default]
    Fixed,
}

/// Per-element measurements beyond the global frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecialSizeMeasurements {
    pub padding: Sides,
    /// The parent grid's per-cell rendered frames, row-major. `None` when the
    /// parent is not a grid or its cells were not measurable.
    pub parent_grid_cell_global_frames: Option<Vec<Vec<CanvasRect>>>,
    /// The parent grid container's rendered template.
    pub parent_container_grid_properties: GridTemplate,
    /// The element's rendered grid placement.
    pub element_grid_properties: GridPlacement,
    /// The placement as written in the element's props (spans and `auto`
    /// survive here even when the rendered placement is numeric).
    pub element_grid_properties_from_props: GridPlacement,
    pub display: Option<Display>,
    pub flex_direction: FlexDirection,
    pub gap: Option<f64>,
    pub row_gap: Option<f64>,
    pub column_gap: Option<f64>,
    pub justify_content: Option<String>,
    pub width_sizing: SizingBehavior,
    pub height_sizing: SizingBehavior,
}

/// One entry of the metadata snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementMetadata {
    /// Rendered frame in canvas coordinates; `None` when unmeasured, the
    /// infinity sentinel when unmeasurable.
    pub global_frame: Option<CanvasRect>,
    pub special: SpecialSizeMeasurements,
    /// The parsed element this entry was measured from, when available.
    pub element: Option<ElementChild>,
}

// ─── Snapshot map ────────────────────────────────────────────────────────

/// The full snapshot, keyed by element path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementMetadataMap {
    entries: HashMap<ElementPath, ElementMetadata>,
}

impl ElementMetadataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: ElementPath, metadata: ElementMetadata) {
        self.entries.insert(path, metadata);
    }

    pub fn find(&self, path: &ElementPath) -> Option<&ElementMetadata> {
        self.entries.get(path)
    }

    /// The element's finite rendered frame, or `None` when missing or
    /// carrying the infinity sentinel.
    pub fn frame_in_canvas_coords(&self, path: &ElementPath) -> Option<CanvasRect> {
        let frame = self.find(path)?.global_frame?;
        if frame.is_infinity() {
            return None;
        }
        Some(frame)
    }

    /// True when the element's parent renders as a grid container.
    pub fn is_grid_item(&self, path: &ElementPath) -> bool {
        let Some(parent) = path.parent() else {
            return false;
        };
        self.find(&parent)
            .map(|parent_metadata| parent_metadata.special.display == Some(Display::Grid))
            .unwrap_or(false)
    }

    /// True when the element fills or stretches on at least one axis.
    pub fn is_fill_or_stretch_on_any_side(&self, path: &ElementPath) -> bool {
        self.find(path)
            .map(|metadata| {
                metadata.special.width_sizing == SizingBehavior::Fill
                    || metadata.special.height_sizing == SizingBehavior::Fill
            })
            .unwrap_or(false)
    }

    /// Walk up from `path` to the nearest ancestor rendering as a grid.
    /// Fragment-like wrappers between a grid and its items mean the direct
    /// parent is not always the grid itself.
    pub fn find_original_grid(&self, path: &ElementPath) -> Option<ElementPath> {
        let mut current = Some(path.clone());
        while let Some(candidate) = current {
            if let Some(metadata) = self.find(&candidate)
                && metadata.special.display == Some(Display::Grid)
            {
                return Some(candidate);
            }
            current = candidate.parent();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_core::geometry::canvas_rect;

    fn grid_parent_entry() -> ElementMetadata {
        ElementMetadata {
            global_frame: Some(canvas_rect(0.0, 0.0, 300.0, 300.0)),
            special: SpecialSizeMeasurements {
                display: Some(Display::Grid),
                ..Default::default()
            },
            element: None,
        }
    }

    #[test]
    fn grid_item_requires_grid_parent() {
        let mut metadata = ElementMetadataMap::new();
        let grid = ElementPath::from_strs(&["sb", "grid"]);
        let item = grid.append(rf_core::Uid::intern("item"));
        metadata.insert(grid, grid_parent_entry());
        metadata.insert(item.clone(), ElementMetadata::default());

        assert!(metadata.is_grid_item(&item));
        assert!(!metadata.is_grid_item(&ElementPath::from_strs(&["sb", "grid"])));
    }

    #[test]
    fn infinity_frames_are_filtered() {
        let mut metadata = ElementMetadataMap::new();
        let path = ElementPath::from_strs(&["sb", "unmeasured"]);
        metadata.insert(
            path.clone(),
            ElementMetadata {
                global_frame: Some(CanvasRect::INFINITY),
                ..Default::default()
            },
        );
        assert!(metadata.frame_in_canvas_coords(&path).is_none());
    }

    #[test]
    fn find_original_grid_walks_ancestors() {
        let mut metadata = ElementMetadataMap::new();
        let grid = ElementPath::from_strs(&["sb", "grid"]);
        let wrapper = grid.append(rf_core::Uid::intern("wrapper"));
        let item = wrapper.append(rf_core::Uid::intern("item"));
        metadata.insert(grid.clone(), grid_parent_entry());
        metadata.insert(wrapper.clone(), ElementMetadata::default());
        metadata.insert(item.clone(), ElementMetadata::default());

        assert_eq!(metadata.find_original_grid(&wrapper), Some(grid));
        assert!(
            metadata
                .find_original_grid(&ElementPath::from_strs(&["sb", "plain"]))
                .is_none()
        );
    }
}
