//! Ring configurator: option catalogs, the configuration state model and
//! the step machine that gates forward navigation.

pub mod options;
mod state;
mod steps;

pub use state::{
    derive_edge_metrics, ColorConfig, ConfigUpdate, ConfiguratorState, Dimensions, EdgeMetrics,
    EdgeSettings, EdgeSide, Engraving, FreeStone, GrooveSettings, GroovesAndEdges, PreciousMetal,
    ShapeConfig, StoneSettings, DEFAULT_GROOVE_WAVES, DEFAULT_GROOVE_WAVE_HEIGHT,
    DEFAULT_SHAPE_HEIGHT_PERCENTAGE, DEFAULT_SHAPE_WAVE_COUNT, MAX_GROOVES,
};
pub use steps::{
    can_proceed, validate_step, ConfiguratorStep, StepCursor, StepTransition,
    StepValidationError, ValidationReason,
};
