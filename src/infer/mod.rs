//! Connection inference for wiring diagrams
//!
//! Reconstructs point-to-point wires from label positions, naming
//! conventions and route geometry. The engine is best-effort: a primitive
//! nothing can be matched to yields no connection, never an error.
//!
//! # Submodules
//! - `types` - Labels, geometry primitives and connection records
//! - `error` - Boundary errors for structurally invalid input
//! - `labels` - Label text classification
//! - `geometry` - Route shape classification
//! - `rules` - Tunable heuristic thresholds
//! - `spatial` - R-tree label index
//! - `resolver` - Connector lookup for pin positions
//! - `wire_spec` - Wire spec attribution
//! - `ids` - Synthetic splice and connector ids
//! - `strategies` - Per-representation connection extraction
//! - `merge` - Deduplication and output ordering
//! - `runners` - Entry points for one diagram

mod error;
mod ids;
mod merge;
mod resolver;
mod runners;
mod spatial;
mod types;
mod wire_spec;

pub mod geometry;
pub mod labels;
pub mod rules;
pub mod strategies;

pub use error::InputError;
pub use ids::IdGenerator;
pub use merge::{merge, StrategyOutput};
pub use resolver::{ConnectorResolver, ResolvedConnector};
pub use rules::InferenceRules;
pub use runners::{infer_connections, prepare_labels, InferenceOutput};
pub use spatial::LabelIndex;
pub use types::{
    Connection, ConnectionPoint, Diagram, Dot, Geometry, Label, LineSegment, Path, Point,
    Polyline, WireSpec,
};
pub use wire_spec::{SpecGroup, WireSpecLocator};
