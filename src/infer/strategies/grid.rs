//! Routing grids
//!
//! Grid diagrams drop a dashed column from each pin and join columns with
//! colored rows. Two pins are wired when their columns meet the same row.

use log::debug;

use super::{ExtractionStrategy, StrategyContext};
use crate::infer::geometry::{colored_runs, dashed_columns, ColoredRun, DashedColumn};
use crate::infer::labels::LabelCategory;
use crate::infer::types::{Connection, ConnectionPoint, Geometry};

pub struct GridStrategy;

impl ExtractionStrategy for GridStrategy {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn extract(&self, geometry: &Geometry, ctx: &StrategyContext) -> Vec<Connection> {
        let columns = dashed_columns(geometry, &ctx.rules.dashed_classes);
        if columns.is_empty() {
            return Vec::new();
        }
        let rows = colored_runs(geometry, |class| ctx.rules.wire_color(geometry, class));
        let tolerance = ctx.rules.grid_tolerance;

        let terminals: Vec<(ConnectionPoint, &DashedColumn)> = ctx
            .labels
            .labels()
            .iter()
            .filter(|l| l.category().is_pin() || l.category() == LabelCategory::SpliceId)
            .filter_map(|l| {
                let connector = ctx.resolver.resolve_above(l.position(), false, None)?;
                let pin = if l.category() == LabelCategory::SpliceId {
                    ""
                } else {
                    l.content()
                };
                let column = columns.iter().find(|c| drops_from(c, l.x, l.y, tolerance))?;
                Some((ConnectionPoint::new(connector.id, pin, l.x, l.y), column))
            })
            .collect();

        let mut connections = Vec::new();
        for (i, (a, column_a)) in terminals.iter().enumerate() {
            for (b, column_b) in &terminals[i + 1..] {
                if a.connector_id == b.connector_id {
                    continue;
                }
                let Some(row) = rows
                    .iter()
                    .find(|r| crosses(column_a, r, tolerance) && crosses(column_b, r, tolerance))
                else {
                    continue;
                };
                let (from, to) = if a.x < b.x { (a, b) } else { (b, a) };
                connections.push(Connection::new(from.clone(), to.clone(), "", row.color.clone()));
            }
        }

        debug!(
            "grid: {} columns, {} rows, {} connections",
            columns.len(),
            rows.len(),
            connections.len()
        );
        connections
    }
}

fn drops_from(column: &DashedColumn, x: f32, y: f32, tolerance: f32) -> bool {
    (column.x - x).abs() <= tolerance && column.y1 - tolerance <= y && y <= column.y2 + tolerance
}

fn crosses(column: &DashedColumn, row: &ColoredRun, tolerance: f32) -> bool {
    row.x1 - tolerance <= column.x
        && column.x <= row.x2 + tolerance
        && column.y1 - tolerance <= row.y
        && row.y <= column.y2 + tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::rules::InferenceRules;
    use crate::infer::spatial::LabelIndex;
    use crate::infer::types::{Diagram, Label, LineSegment};

    fn line(x1: f32, y1: f32, x2: f32, y2: f32, class: &str) -> LineSegment {
        LineSegment {
            x1,
            y1,
            x2,
            y2,
            color_class: Some(class.to_string()),
        }
    }

    #[test]
    fn test_columns_joined_by_row() {
        let mut geometry = Geometry::default();
        geometry.line_segments.push(line(100.0, 105.0, 100.0, 300.0, "st16"));
        geometry.line_segments.push(line(400.0, 105.0, 400.0, 300.0, "st16"));
        geometry.line_segments.push(line(90.0, 250.0, 410.0, 250.0, "st19"));
        // a row that only reaches the first column
        geometry.line_segments.push(line(90.0, 200.0, 200.0, 200.0, "st21"));

        let diagram = Diagram::new(
            vec![
                Label::new("SR02", 400.0, 80.0),
                Label::new("4", 400.0, 100.0),
                Label::new("MH097", 100.0, 80.0),
                Label::new("7", 100.0, 100.0),
            ],
            geometry,
        );
        let rules = InferenceRules::default();
        let index = LabelIndex::new(diagram.labels.clone());
        let ctx = StrategyContext::new(&index, &diagram.wire_specs, &rules);
        let found = GridStrategy.extract(&diagram.geometry, &ctx);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].from.connector_id, "MH097");
        assert_eq!(found[0].to.connector_id, "SR02");
        assert_eq!(found[0].wire_color, "YE");
        assert!(!found[0].has_spec());
    }
}
