//! Colored horizontal wires without a printed spec
//!
//! The stroke class gives the wire color. Pins and splices along the run are
//! linked left to right; a nearby spec only contributes the diameter.

use log::debug;

use super::{ExtractionStrategy, StrategyContext};
use crate::infer::geometry::{colored_runs, ColoredRun};
use crate::infer::labels::LabelCategory;
use crate::infer::types::{Connection, ConnectionPoint, Geometry, Label, WireSpec};

pub struct ColoredSegmentStrategy;

impl ExtractionStrategy for ColoredSegmentStrategy {
    fn name(&self) -> &'static str {
        "colored"
    }

    fn extract(&self, geometry: &Geometry, ctx: &StrategyContext) -> Vec<Connection> {
        let runs = colored_runs(geometry, |class| ctx.rules.wire_color(geometry, class));
        let mut connections = Vec::new();

        for run in &runs {
            let mut points: Vec<ConnectionPoint> = ctx
                .labels
                .labels()
                .iter()
                .filter(|l| on_run(l, run, ctx))
                .filter_map(|l| endpoint_on_run(l, run, ctx))
                .collect();
            points.sort_by(|a, b| a.x.total_cmp(&b.x));

            for pair in points.windows(2) {
                let (left, right) = (&pair[0], &pair[1]);
                if left.same_terminal(right) {
                    continue;
                }
                let diameter = diameter_for(left, right, run, ctx)
                    .map(|spec| spec.diameter.clone())
                    .unwrap_or_default();
                connections.push(Connection::new(
                    left.clone(),
                    right.clone(),
                    diameter,
                    run.color.clone(),
                ));
            }
        }

        debug!("colored: {} runs, {} connections", runs.len(), connections.len());
        connections
    }
}

fn on_run(label: &Label, run: &ColoredRun, ctx: &StrategyContext) -> bool {
    let category = label.category();
    let reach = ctx.rules.colored_x_tolerance;
    (category.is_pin() || category == LabelCategory::SpliceId)
        && (label.y - run.y).abs() <= ctx.rules.colored_y_tolerance
        && run.x1 - reach <= label.x
        && label.x <= run.x2 + reach
}

/// Splices stand for themselves; a pin takes the connector on the side of
/// the run end it is closest to
fn endpoint_on_run(label: &Label, run: &ColoredRun, ctx: &StrategyContext) -> Option<ConnectionPoint> {
    if label.category() == LabelCategory::SpliceId {
        return Some(ConnectionPoint::at_label(label));
    }
    let wire_end = if label.x <= (run.x1 + run.x2) / 2.0 {
        run.x1
    } else {
        run.x2
    };
    let candidates = ctx.resolver.connectors_above(label.position());
    let connector = if wire_end < label.x {
        candidates
            .into_iter()
            .reduce(|best, c| if c.x < best.x { c } else { best })
    } else {
        candidates
            .into_iter()
            .reduce(|best, c| if c.x > best.x { c } else { best })
    }?;
    Some(ConnectionPoint::new(connector.id, label.content(), label.x, label.y))
}

fn diameter_for<'a>(
    left: &ConnectionPoint,
    right: &ConnectionPoint,
    run: &ColoredRun,
    ctx: &StrategyContext<'a>,
) -> Option<&'a WireSpec> {
    let rules = ctx.rules;
    let avg_y = (left.y + right.y) / 2.0;
    let closest = |specs: Vec<&'a WireSpec>, y: f32| {
        specs
            .into_iter()
            .reduce(|best, s| if (s.y - y).abs() < (best.y - y).abs() { s } else { best })
    };

    let between: Vec<&WireSpec> = ctx
        .wire_specs
        .iter()
        .filter(|s| left.x < s.x && s.x < right.x && (s.y - avg_y).abs() < rules.colored_spec_dy)
        .collect();
    if !between.is_empty() {
        return closest(between, avg_y);
    }
    let on_run: Vec<&WireSpec> = ctx
        .wire_specs
        .iter()
        .filter(|s| (s.y - run.y).abs() < rules.colored_y_tolerance && run.x1 < s.x && s.x < run.x2)
        .collect();
    closest(on_run, run.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::rules::InferenceRules;
    use crate::infer::spatial::LabelIndex;
    use crate::infer::types::{Diagram, LineSegment};

    fn red_line(x1: f32, x2: f32, y: f32) -> LineSegment {
        LineSegment {
            x1,
            y1: y,
            x2,
            y2: y,
            color_class: Some("st21".to_string()),
        }
    }

    fn run(labels: Vec<Label>, geometry: Geometry) -> Vec<Connection> {
        let diagram = Diagram::new(labels, geometry);
        let rules = InferenceRules::default();
        let index = LabelIndex::new(diagram.labels.clone());
        let ctx = StrategyContext::new(&index, &diagram.wire_specs, &rules);
        ColoredSegmentStrategy.extract(&diagram.geometry, &ctx)
    }

    #[test]
    fn test_colored_run_links_pins() {
        let mut geometry = Geometry::default();
        geometry.line_segments.push(red_line(60.0, 300.0, 102.0));
        let found = run(
            vec![
                Label::new("MH097", 40.0, 80.0),
                Label::new("3", 50.0, 100.0),
                Label::new("MH020", 320.0, 80.0),
                Label::new("5", 310.0, 100.0),
            ],
            geometry,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].from.connector_id, "MH097");
        assert_eq!(found[0].to.connector_id, "MH020");
        assert_eq!(found[0].wire_color, "RD");
        assert_eq!(found[0].wire_diameter, "");
    }

    #[test]
    fn test_shared_pin_takes_connector_on_wire_side() {
        let mut geometry = Geometry::default();
        geometry.line_segments.push(red_line(100.0, 300.0, 100.0));
        let found = run(
            vec![
                // two connectors share the pin column at x=110
                Label::new("MAIN14", 80.0, 80.0),
                Label::new("SR01", 140.0, 80.0),
                Label::new("2", 110.0, 100.0),
                Label::new("SP010", 290.0, 100.0),
                Label::new("0.5,BK", 200.0, 95.0),
            ],
            geometry,
        );
        assert_eq!(found.len(), 1);
        // wire end x1=100 lies left of the pin, so the leftmost connector wins
        assert_eq!(found[0].from.connector_id, "MAIN14");
        assert_eq!(found[0].to.connector_id, "SP010");
        assert_eq!(found[0].wire_diameter, "0.5");
        assert_eq!(found[0].wire_color, "RD");
    }
}
