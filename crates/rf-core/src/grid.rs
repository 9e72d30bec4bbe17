//! CSS-grid placement math.
//!
//! Grid placements are the four `grid-{row,column}-{start,end}` fields, each
//! either a literal line index, `auto`, or a `span N`. Values arrive from
//! element props as CSS strings — parsed here with `winnow` — and are written
//! back in canonical CSS form by the `Display` impls.

use crate::geometry::{CanvasRect, rect_intersection};
use serde::{Deserialize, Serialize};
use std::fmt;
use winnow::ascii::{digit1, multispace0, multispace1};
use winnow::combinator::{alt, delimited, opt, preceded, separated};
use winnow::prelude::*;

// ─── Placement values ────────────────────────────────────────────────────

/// One `grid-row-start`-style field. A position is a literal line or a span,
/// never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GridPosition {
    #[default]
    Auto,
    Line(i64),
    Span(i64),
}

impl GridPosition {
    pub fn is_span(&self) -> bool {
        matches!(self, GridPosition::Span(_))
    }

    pub fn line(&self) -> Option<i64> {
        match self {
            GridPosition::Line(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridPosition::Auto => write!(f, "auto"),
            GridPosition::Line(n) => write!(f, "{n}"),
            GridPosition::Span(n) => write!(f, "span {n}"),
        }
    }
}

/// The four grid placement fields of one grid item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridPlacement {
    pub column_start: GridPosition,
    pub column_end: GridPosition,
    pub row_start: GridPosition,
    pub row_end: GridPosition,
}

/// Numeric 1-based start/end grid lines, the raw result of a geometric
/// cell-range computation (before span normalization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLineBounds {
    pub row_start: i64,
    pub row_end: i64,
    pub column_start: i64,
    pub column_end: i64,
}

// ─── Templates ───────────────────────────────────────────────────────────

/// One track of a grid template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GridTrack {
    Fr(f64),
    Px(f64),
    Auto,
}

impl fmt::Display for GridTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridTrack::Fr(n) => write!(f, "{n}fr"),
            GridTrack::Px(n) => write!(f, "{n}px"),
            GridTrack::Auto => write!(f, "auto"),
        }
    }
}

/// A grid container's row and column track lists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridTemplate {
    pub rows: Vec<GridTrack>,
    pub columns: Vec<GridTrack>,
}

impl GridTemplate {
    /// The template's track list as a CSS string, or `None` when empty.
    pub fn columns_string(&self) -> Option<String> {
        tracks_string(&self.columns)
    }

    pub fn rows_string(&self) -> Option<String> {
        tracks_string(&self.rows)
    }
}

fn tracks_string(tracks: &[GridTrack]) -> Option<String> {
    if tracks.is_empty() {
        return None;
    }
    Some(
        tracks
            .iter()
            .map(GridTrack::to_string)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

// ─── Parsers ─────────────────────────────────────────────────────────────

fn parse_integer(input: &mut &str) -> ModalResult<i64> {
    (opt('-'), digit1)
        .take()
        .try_map(str::parse::<i64>)
        .parse_next(input)
}

fn parse_float(input: &mut &str) -> ModalResult<f64> {
    (opt('-'), digit1, opt(('.', digit1)))
        .take()
        .try_map(str::parse::<f64>)
        .parse_next(input)
}

fn parse_position(input: &mut &str) -> ModalResult<GridPosition> {
    alt((
        "auto".value(GridPosition::Auto),
        preceded(("span", multispace1), parse_integer).map(GridPosition::Span),
        parse_integer.map(GridPosition::Line),
    ))
    .parse_next(input)
}

fn parse_track(input: &mut &str) -> ModalResult<GridTrack> {
    alt((
        "auto".value(GridTrack::Auto),
        (parse_float, "fr").map(|(n, _)| GridTrack::Fr(n)),
        (parse_float, "px").map(|(n, _)| GridTrack::Px(n)),
    ))
    .parse_next(input)
}

fn parse_track_group(input: &mut &str) -> ModalResult<Vec<GridTrack>> {
    alt((
        // repeat(3, 1fr) expands to three tracks
        preceded(
            ("repeat", multispace0, '('),
            (
                delimited(multispace0, parse_integer, (multispace0, ',')),
                delimited(multispace0, parse_track_list_inner, (multispace0, ')')),
            ),
        )
        .map(|(count, tracks)| {
            let count = count.max(0) as usize;
            let mut expanded = Vec::with_capacity(count * tracks.len());
            for _ in 0..count {
                expanded.extend_from_slice(&tracks);
            }
            expanded
        }),
        parse_track.map(|t| vec![t]),
    ))
    .parse_next(input)
}

fn parse_track_list_inner(input: &mut &str) -> ModalResult<Vec<GridTrack>> {
    separated(1.., parse_track_group, multispace1)
        .map(|groups: Vec<Vec<GridTrack>>| groups.into_iter().flatten().collect())
        .parse_next(input)
}

/// Parse a single CSS grid placement value: `auto`, `3`, or `span 2`.
pub fn parse_grid_position(input: &str) -> Result<GridPosition, String> {
    delimited(multispace0, parse_position, multispace0)
        .parse(input)
        .map_err(|e| format!("Grid position parse error in \"{input}\": {e}"))
}

/// Parse a CSS grid template track list: `1fr 1fr`, `repeat(3, 1fr)`, `auto 240px`.
pub fn parse_grid_template(input: &str) -> Result<Vec<GridTrack>, String> {
    delimited(multispace0, parse_track_list_inner, multispace0)
        .parse(input)
        .map_err(|e| format!("Grid template parse error in \"{input}\": {e}"))
}

// ─── Cell-range geometry ─────────────────────────────────────────────────

/// The minimal contiguous cell range whose cells intersect `resize_box`,
/// reported as 1-based start/end grid lines (end is exclusive: last
/// intersecting index + 2).
///
/// Returns `None` when no cell intersects — callers must no-op rather than
/// write an invalid placement.
pub fn grid_line_bounds_from_resize_box(
    resize_box: CanvasRect,
    cell_bounds: &[Vec<CanvasRect>],
) -> Option<GridLineBounds> {
    let mut row_start = i64::MAX;
    let mut row_end = i64::MIN;
    let mut column_start = i64::MAX;
    let mut column_end = i64::MIN;

    for (row_idx, row) in cell_bounds.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if rect_intersection(resize_box, *cell).is_some() {
                row_start = row_start.min(row_idx as i64 + 1);
                column_start = column_start.min(col_idx as i64 + 1);
                row_end = row_end.max(row_idx as i64 + 2);
                column_end = column_end.max(col_idx as i64 + 2);
            }
        }
    }

    if row_start == i64::MAX {
        return None;
    }

    Some(GridLineBounds {
        row_start,
        row_end,
        column_start,
        column_end,
    })
}

/// Which edge of a placement a resize affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridBound {
    Start,
    End,
}

/// Decide the stored placement for one edge after a resize.
///
/// A position defined as a span before the resize stays a span at the new
/// size (collapsing to `auto` when the span would be exactly 1), so resizing
/// a relatively-placed element does not freeze it into absolute coordinates.
/// The end edge also defaults to `auto` when its counterpart is a span
/// anchored at grid line 1.
pub fn normalize_position_after_resize(
    position: GridPosition,
    resized: i64,
    size: i64,
    bound: GridBound,
    counterpart: GridPosition,
    counterpart_resized: i64,
) -> GridPosition {
    if position.is_span() {
        if size == 1 {
            return GridPosition::Auto;
        }
        return GridPosition::Span(size);
    }
    if counterpart.is_span() && counterpart_resized == 1 && bound == GridBound::End {
        return GridPosition::Auto;
    }
    GridPosition::Line(resized)
}
