//! Connection extraction strategies
//!
//! Each strategy reads one visual wire representation and proposes
//! connections for it. Strategies never see each other's output except
//! through the read-only slices in [`StrategyContext`].
//!
//! # Submodules
//! - `horizontal` - Spec-bearing horizontal wires grouped by line
//! - `colored` - Colored wire runs without a printed spec
//! - `grid` - Dashed column and colored row routing grids
//! - `routing` - Vertical, L-shaped and fan-out routing paths
//! - `rectangular` - H-V-H routing polylines
//! - `ground` - Ground arrows
//! - `color_trace` - Multi-hop splice chains sharing one wire spec

mod color_trace;
mod colored;
mod grid;
mod ground;
mod horizontal;
mod rectangular;
mod routing;

use std::collections::{HashMap, HashSet};

use super::rules::InferenceRules;
use super::resolver::ConnectorResolver;
use super::spatial::LabelIndex;
use super::types::{Connection, ConnectionPoint, Geometry, WireSpec};
use super::wire_spec::WireSpecLocator;

pub use color_trace::ColorTraceStrategy;
pub use colored::ColoredSegmentStrategy;
pub use grid::GridStrategy;
pub use ground::GroundStrategy;
pub use horizontal::HorizontalWireStrategy;
pub use rectangular::RectangularStrategy;
pub use routing::RoutingStrategy;

/// Read-only inputs shared by every strategy of one run
#[derive(Clone, Copy)]
pub struct StrategyContext<'a> {
    pub labels: &'a LabelIndex,
    pub wire_specs: &'a [WireSpec],
    pub rules: &'a InferenceRules,
    pub resolver: ConnectorResolver<'a>,
    pub locator: WireSpecLocator<'a>,
    /// Output of the horizontal strategy
    pub horizontal: &'a [Connection],
    /// Output of every strategy that ran before this one
    pub prior: &'a [Connection],
}

impl<'a> StrategyContext<'a> {
    pub fn new(labels: &'a LabelIndex, wire_specs: &'a [WireSpec], rules: &'a InferenceRules) -> Self {
        Self {
            labels,
            wire_specs,
            rules,
            resolver: ConnectorResolver::new(labels, rules),
            locator: WireSpecLocator::new(wire_specs, rules),
            horizontal: &[],
            prior: &[],
        }
    }

    pub fn with_horizontal(self, horizontal: &'a [Connection]) -> Self {
        Self { horizontal, ..self }
    }

    pub fn with_prior(self, prior: &'a [Connection]) -> Self {
        Self { prior, ..self }
    }
}

/// One way of reading wires off the diagram
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs and summary counts
    fn name(&self) -> &'static str;

    fn extract(&self, geometry: &Geometry, ctx: &StrategyContext) -> Vec<Connection>;
}

/// Splices that already carry at least one incoming and one outgoing
/// horizontal connection
#[derive(Debug, Default, Clone)]
pub struct PassThroughSplices {
    ids: HashSet<String>,
}

impl PassThroughSplices {
    pub fn from_horizontal(horizontal: &[Connection]) -> Self {
        let mut incoming: HashMap<&str, usize> = HashMap::new();
        let mut outgoing: HashMap<&str, usize> = HashMap::new();
        for conn in horizontal {
            if conn.from.is_splice() {
                *outgoing.entry(conn.from.connector_id.as_str()).or_default() += 1;
            }
            if conn.to.is_splice() {
                *incoming.entry(conn.to.connector_id.as_str()).or_default() += 1;
            }
        }
        let ids = incoming
            .keys()
            .filter(|id| outgoing.contains_key(*id))
            .map(|id| id.to_string())
            .collect();
        Self { ids }
    }

    pub fn contains(&self, point: &ConnectionPoint) -> bool {
        point.is_splice() && self.ids.contains(&point.connector_id)
    }

    /// Two distinct pass-through splices
    pub fn both(&self, a: &ConnectionPoint, b: &ConnectionPoint) -> bool {
        self.contains(a) && self.contains(b) && !a.same_terminal(b)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// `(connector, pin)` pairs of pins touched by the given connections
pub(crate) fn wired_pins<'c>(
    connections: impl IntoIterator<Item = &'c Connection>,
) -> HashSet<(&'c str, &'c str)> {
    let mut pins = HashSet::new();
    for conn in connections {
        for end in [&conn.from, &conn.to] {
            if !end.pin.is_empty() && !end.is_splice() {
                pins.insert((end.connector_id.as_str(), end.pin.as_str()));
            }
        }
    }
    pins
}

/// The standard strategies run in parallel after the horizontal stage
pub fn parallel_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(ColoredSegmentStrategy),
        Box::new(GridStrategy),
        Box::new(RoutingStrategy),
        Box::new(RectangularStrategy),
        Box::new(GroundStrategy),
    ]
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_pass_through_needs_both_directions() {
        let horizontal = vec![
            wire(pin("MH097", "7", 0.0, 100.0), splice("SP001", 100.0, 100.0)),
            wire(splice("SP001", 100.0, 100.0), pin("MH020", "1", 200.0, 100.0)),
            wire(pin("MH097", "8", 0.0, 200.0), splice("SP002", 100.0, 200.0)),
        ];
        let pass = PassThroughSplices::from_horizontal(&horizontal);
        assert!(pass.contains(&splice("SP001", 0.0, 0.0)));
        assert!(!pass.contains(&splice("SP002", 0.0, 0.0)));
        assert_eq!(pass.len(), 1);
    }

    #[test]
    fn test_wired_pins_skip_splices() {
        let horizontal = vec![wire(pin("MH097", "7", 0.0, 100.0), splice("SP001", 100.0, 100.0))];
        let pins = wired_pins(&horizontal);
        assert!(pins.contains(&("MH097", "7")));
        assert_eq!(pins.len(), 1);
    }
}
