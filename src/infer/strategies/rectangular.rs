//! H-V-H routing polylines
//!
//! A rectangular route has four corners. Each corner may sit on a pin, a
//! splice or a connector label; consecutive terminals are wired together with
//! the wire spec printed on the longest horizontal leg.

use log::debug;

use super::{ExtractionStrategy, StrategyContext};
use crate::infer::geometry::{classify_path, classify_polyline, Route, RouteShape};
use crate::infer::labels::LabelCategory;
use crate::infer::types::{Connection, ConnectionPoint, Geometry, Label, WireSpec};

pub struct RectangularStrategy;

impl ExtractionStrategy for RectangularStrategy {
    fn name(&self) -> &'static str {
        "rectangular"
    }

    fn extract(&self, geometry: &Geometry, ctx: &StrategyContext) -> Vec<Connection> {
        let polylines = geometry
            .polylines
            .iter()
            .filter_map(|p| classify_polyline(&p.points));
        let paths = geometry
            .paths
            .iter()
            .filter(|p| ctx.rules.is_routing_class(p.class.as_deref()))
            .filter_map(|p| classify_path(&p.commands));
        let routes: Vec<Route> = polylines
            .chain(paths)
            .filter(|r| matches!(r.shape, RouteShape::Rectangular))
            .collect();

        let mut connections = Vec::new();
        for route in &routes {
            let spec = ctx.locator.for_rectangular(route);
            let terminals: Vec<ConnectionPoint> = route
                .points
                .iter()
                .filter_map(|corner| {
                    let (label, _) =
                        ctx.labels
                            .nearest_where(*corner, ctx.rules.corner_radius, is_corner_terminal)?;
                    terminal_at(label, spec, ctx)
                })
                .collect();

            for pair in terminals.windows(2) {
                if pair[0].same_terminal(&pair[1]) {
                    continue;
                }
                connections.push(Connection::with_spec(pair[0].clone(), pair[1].clone(), spec));
            }
        }

        debug!(
            "rectangular: {} routes, {} connections",
            routes.len(),
            connections.len()
        );
        connections
    }
}

fn is_corner_terminal(label: &Label) -> bool {
    matches!(
        label.category(),
        LabelCategory::ConnectorId
            | LabelCategory::JunctionConnector
            | LabelCategory::SpliceId
            | LabelCategory::PinNumber
            | LabelCategory::DashPin
    )
}

fn terminal_at(label: &Label, spec: Option<&WireSpec>, ctx: &StrategyContext) -> Option<ConnectionPoint> {
    if !label.category().is_pin() {
        return Some(ConnectionPoint::at_label(label));
    }
    let primary = ctx.resolver.resolve_above(label.position(), false, None)?;
    let connector = match spec {
        Some(spec) if conflicts(&primary.id, label.content(), spec, ctx) => ctx
            .resolver
            .connectors_above(label.position())
            .into_iter()
            .find(|c| c.id != primary.id)
            .unwrap_or(primary),
        _ => primary,
    };
    Some(ConnectionPoint::new(connector.id, label.content(), label.x, label.y))
}

/// The pin already starts a horizontal wire with a different spec, so the
/// route must belong to another connector sharing the pin column
fn conflicts(connector: &str, pin: &str, spec: &WireSpec, ctx: &StrategyContext) -> bool {
    ctx.horizontal.iter().any(|c| {
        c.from.connector_id == connector
            && c.from.pin == pin
            && (c.wire_diameter != spec.diameter || c.wire_color != spec.color)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::rules::InferenceRules;
    use crate::infer::spatial::LabelIndex;
    use crate::infer::strategies::test_support::{pin, splice, wire};
    use crate::infer::types::{Diagram, Point, Polyline};

    fn rectangle() -> Polyline {
        Polyline {
            class: Some("st27".to_string()),
            points: vec![
                Point::new(100.0, 100.0),
                Point::new(200.0, 100.0),
                Point::new(200.0, 300.0),
                Point::new(400.0, 300.0),
            ],
        }
    }

    fn run(labels: Vec<Label>, horizontal: &[Connection]) -> Vec<Connection> {
        let mut geometry = Geometry::default();
        geometry.polylines.push(rectangle());
        let diagram = Diagram::new(labels, geometry);
        let rules = InferenceRules::default();
        let index = LabelIndex::new(diagram.labels.clone());
        let ctx = StrategyContext::new(&index, &diagram.wire_specs, &rules).with_horizontal(horizontal);
        RectangularStrategy.extract(&diagram.geometry, &ctx)
    }

    #[test]
    fn test_corners_linked_with_long_leg_spec() {
        let found = run(
            vec![
                Label::new("MH097", 100.0, 80.0),
                Label::new("7", 100.0, 100.0),
                Label::new("SP010", 400.0, 300.0),
                Label::new("0.5,GN", 300.0, 290.0),
            ],
            &[],
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].from.connector_id, "MH097");
        assert_eq!(found[0].from.pin, "7");
        assert_eq!(found[0].to.connector_id, "SP010");
        assert_eq!(found[0].wire_diameter, "0.5");
        assert_eq!(found[0].wire_color, "GN");
    }

    #[test]
    fn test_spec_conflict_picks_alternate_connector() {
        let labels = vec![
            Label::new("MH097", 100.0, 80.0),
            Label::new("MH098", 120.0, 60.0),
            Label::new("7", 100.0, 100.0),
            Label::new("SP010", 400.0, 300.0),
            Label::new("0.5,GN", 300.0, 290.0),
        ];
        // MH097.7 already carries a 0.35 GY wire
        let horizontal = vec![wire(pin("MH097", "7", 100.0, 100.0), splice("SP001", 0.0, 100.0))];
        let found = run(labels.clone(), &horizontal);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].from.connector_id, "MH098");

        let found = run(labels, &[]);
        assert_eq!(found[0].from.connector_id, "MH097");
    }
}
