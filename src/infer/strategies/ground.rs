//! Ground arrows
//!
//! A ground arrow sits on a short horizontal wire between a pin (or splice)
//! and a ground connector. The arrow start anchors a small window; the widest
//! valid pair of endpoints inside it is the wire.

use log::debug;

use super::{ExtractionStrategy, StrategyContext};
use crate::infer::geometry::start_point;
use crate::infer::labels::LabelCategory;
use crate::infer::types::{Connection, ConnectionPoint, Geometry, Point};

pub struct GroundStrategy;

impl ExtractionStrategy for GroundStrategy {
    fn name(&self) -> &'static str {
        "ground"
    }

    fn extract(&self, geometry: &Geometry, ctx: &StrategyContext) -> Vec<Connection> {
        let anchors: Vec<Point> = geometry
            .paths
            .iter()
            .filter(|p| ctx.rules.is_ground_arrow_class(p.class.as_deref()))
            .filter_map(|p| start_point(&p.commands))
            .collect();

        let mut connections = Vec::new();
        for anchor in &anchors {
            let candidates = candidates_near(*anchor, ctx);
            let Some((a, b)) = widest_pair(&candidates, ctx.rules.ground_max_dx) else {
                continue;
            };

            let (from, to) = match (a.is_ground(), b.is_ground()) {
                (true, false) => (b, a),
                (false, true) => (a, b),
                _ if a.x <= b.x => (a, b),
                _ => (b, a),
            };
            if !from.is_ground() && already_specced(from, ctx) {
                continue;
            }
            let spec = ctx.locator.for_ground(from.position(), to.position());
            connections.push(Connection::with_spec(from.clone(), to.clone(), spec));
        }

        debug!(
            "ground: {} arrows, {} connections",
            anchors.len(),
            connections.len()
        );
        connections
    }
}

/// Endpoints level with the arrow anchor
fn candidates_near(anchor: Point, ctx: &StrategyContext) -> Vec<ConnectionPoint> {
    let rules = ctx.rules;
    ctx.labels
        .labels()
        .iter()
        .filter(|l| l.category().is_endpoint())
        .filter(|l| (l.y - anchor.y).abs() < rules.ground_dy && (l.x - anchor.x).abs() < rules.ground_max_dx)
        .filter_map(|l| match l.category() {
            LabelCategory::GroundConnector | LabelCategory::SpliceId => Some(ConnectionPoint::at_label(l)),
            _ => {
                let connector = ctx.resolver.resolve_above(l.position(), false, None)?;
                Some(ConnectionPoint::new(connector.id, l.content(), l.x, l.y))
            }
        })
        .collect()
}

/// Pair with at least one ground side and the largest X separation below
/// `max_dx`. Ties keep the first pair found.
fn widest_pair(candidates: &[ConnectionPoint], max_dx: f32) -> Option<(&ConnectionPoint, &ConnectionPoint)> {
    let mut best: Option<(&ConnectionPoint, &ConnectionPoint, f32)> = None;
    for (i, a) in candidates.iter().enumerate() {
        for b in &candidates[i + 1..] {
            if !(a.is_ground() || b.is_ground()) || a.same_terminal(b) {
                continue;
            }
            let dx = (a.x - b.x).abs();
            if dx >= max_dx {
                continue;
            }
            if best.map_or(true, |(_, _, widest)| dx > widest) {
                best = Some((a, b, dx));
            }
        }
    }
    best.map(|(a, b, _)| (a, b))
}

/// The pin is already wired by a spec-bearing horizontal connection
fn already_specced(point: &ConnectionPoint, ctx: &StrategyContext) -> bool {
    !point.is_splice()
        && ctx.horizontal.iter().any(|c| {
            c.has_spec() && (c.from.same_terminal(point) || c.to.same_terminal(point))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::geometry::PathCommand;
    use crate::infer::rules::InferenceRules;
    use crate::infer::spatial::LabelIndex;
    use crate::infer::strategies::test_support::{pin, splice, wire};
    use crate::infer::types::{Diagram, Label, Path};

    fn arrow(x: f32, y: f32) -> Path {
        Path {
            class: Some("st17".to_string()),
            commands: vec![
                PathCommand::MoveTo {
                    relative: false,
                    to: Point::new(x, y),
                },
                PathCommand::LineTo {
                    relative: true,
                    to: Point::new(0.0, 8.0),
                },
            ],
        }
    }

    fn run(labels: Vec<Label>, anchor: Point, horizontal: &[Connection]) -> Vec<Connection> {
        let mut geometry = Geometry::default();
        geometry.paths.push(arrow(anchor.x, anchor.y));
        let diagram = Diagram::new(labels, geometry);
        let rules = InferenceRules::default();
        let index = LabelIndex::new(diagram.labels.clone());
        let ctx = StrategyContext::new(&index, &diagram.wire_specs, &rules).with_horizontal(horizontal);
        GroundStrategy.extract(&diagram.geometry, &ctx)
    }

    #[test]
    fn test_ground_within_reach() {
        let found = run(
            vec![
                Label::new("MH097", 140.0, 80.0),
                Label::new("3", 140.0, 100.0),
                Label::new("G101(a)", 250.0, 100.0),
                Label::new("0.5,BK", 200.0, 95.0),
            ],
            Point::new(200.0, 100.0),
            &[],
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].from.connector_id, "MH097");
        assert_eq!(found[0].from.pin, "3");
        assert_eq!(found[0].to.connector_id, "G101(a)");
        assert_eq!(found[0].wire_diameter, "0.5");
        assert_eq!(found[0].wire_color, "BK");
    }

    #[test]
    fn test_ground_too_far_apart() {
        let found = run(
            vec![
                Label::new("MH097", 100.0, 80.0),
                Label::new("3", 100.0, 100.0),
                Label::new("G101(a)", 250.0, 100.0),
            ],
            Point::new(175.0, 100.0),
            &[],
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_pin_with_horizontal_spec_is_skipped() {
        let horizontal = vec![wire(pin("MH097", "3", 140.0, 100.0), splice("SP001", 40.0, 100.0))];
        let found = run(
            vec![
                Label::new("MH097", 140.0, 80.0),
                Label::new("3", 140.0, 100.0),
                Label::new("G101(a)", 250.0, 100.0),
            ],
            Point::new(200.0, 100.0),
            &horizontal,
        );
        assert!(found.is_empty());
    }
}
