pub mod command;
pub mod gap;
pub mod metadata;
pub mod session;
pub mod strategies;
pub mod strategy;

pub use command::{CanvasCommand, CssCursor, WhenToApply, applies_in_phase};
pub use metadata::{
    Display, ElementMetadata, ElementMetadataMap, FlexDirection, SizingBehavior,
    SpecialSizeMeasurements,
};
pub use session::{
    ActiveControl, ActiveControlKind, GridResizeEdge, InteractionData, InteractionSession,
    Modifiers,
};
pub use strategy::{
    CanvasState, CanvasStrategy, CustomStrategyState, StrategyFactory, StrategyResult,
    default_strategies, find_canvas_strategy, only_fit_when_dragging_this_control,
};
