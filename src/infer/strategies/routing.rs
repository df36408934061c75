//! Vertical, L-shaped and fan-out routing paths
//!
//! Both ends of a route snap to the nearest pin, splice or ground label. A
//! splice end is always the destination, otherwise the higher end is. Routes
//! that pass through splices on the way are split into a chain.

use std::collections::HashSet;

use log::debug;

use super::{wired_pins, ExtractionStrategy, PassThroughSplices, StrategyContext};
use crate::infer::geometry::{classify_path, classify_polyline, Route, RouteShape};
use crate::infer::labels::LabelCategory;
use crate::infer::types::{Connection, ConnectionPoint, Geometry, Point, WireSpec};

pub struct RoutingStrategy;

impl ExtractionStrategy for RoutingStrategy {
    fn name(&self) -> &'static str {
        "routing"
    }

    fn extract(&self, geometry: &Geometry, ctx: &StrategyContext) -> Vec<Connection> {
        let routes = routes(geometry, ctx);
        let pass_through = PassThroughSplices::from_horizontal(ctx.horizontal);
        let wired = wired_pins(ctx.horizontal);
        let bounds = ctx.labels.bounds_where(ctx.rules.component_margin, |l| {
            let category = l.category();
            category.is_pin() || category.is_connector() || category == LabelCategory::SpliceId
        });

        let mut connections = Vec::new();
        let mut skipped_outside = 0usize;
        for route in &routes {
            if let Some((min, max)) = bounds {
                let outside = |p: Point| p.x < min.x || p.x > max.x || p.y < min.y || p.y > max.y;
                if outside(route.start()) && outside(route.end()) {
                    skipped_outside += 1;
                    continue;
                }
            }

            let radius = ctx.rules.endpoint_search_radius;
            let Some(first) = ctx.resolver.nearest_connection_point(route.start(), radius) else {
                continue;
            };
            let Some(last) = ctx.resolver.nearest_connection_point(route.end(), radius) else {
                continue;
            };
            if first.is_ground() || last.is_ground() {
                continue;
            }

            if route.points.len() > 2 {
                let hops = intermediate_splices(route, &first, &last, ctx);
                if !hops.is_empty() {
                    let spec = ctx.locator.near_path(&route.points, Some(route.start()));
                    link_chain(first, hops, last, spec, &wired, &pass_through, &mut connections);
                    continue;
                }
            }

            let (source, destination, source_point) = orient(first, last, route);
            if source.same_terminal(&destination) {
                continue;
            }
            if ctx.horizontal.iter().any(|c| c.links(&source, &destination)) {
                continue;
            }
            if pass_through.both(&source, &destination) {
                continue;
            }
            if source.is_splice()
                && destination.is_splice()
                && source.position().distance(&destination.position()) < ctx.rules.min_splice_route
            {
                continue;
            }
            let spec = ctx.locator.near_path(&route.points, Some(source_point));
            connections.push(Connection::with_spec(source, destination, spec));
        }

        debug!(
            "routing: {} routes, {} outside the component area, {} connections",
            routes.len(),
            skipped_outside,
            connections.len()
        );
        connections
    }
}

/// Routes this strategy owns: every polyline and routing-class path that is
/// neither a plain horizontal run nor a rectangular loop
fn routes(geometry: &Geometry, ctx: &StrategyContext) -> Vec<Route> {
    let polylines = geometry
        .polylines
        .iter()
        .filter_map(|p| classify_polyline(&p.points));
    let paths = geometry
        .paths
        .iter()
        .filter(|p| ctx.rules.is_routing_class(p.class.as_deref()))
        .filter_map(|p| classify_path(&p.commands));

    polylines
        .chain(paths)
        .filter(|r| {
            !matches!(
                r.shape,
                RouteShape::HorizontalRun | RouteShape::Rectangular
            )
        })
        .collect()
}

/// Splices the route passes through, excluding its own ends
fn intermediate_splices(
    route: &Route,
    first: &ConnectionPoint,
    last: &ConnectionPoint,
    ctx: &StrategyContext,
) -> Vec<ConnectionPoint> {
    let is_end = |p: &ConnectionPoint| p.same_terminal(first) || p.same_terminal(last);
    let mut hops: Vec<ConnectionPoint> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for segment in route.segments() {
        for splice in ctx.labels.by_category(LabelCategory::SpliceId) {
            if !segment.carries(splice.position(), ctx.rules.splice_on_segment) {
                continue;
            }
            let hop = ConnectionPoint::at_label(splice);
            if !is_end(&hop) && seen.insert(hop.connector_id.clone()) {
                hops.push(hop);
            }
        }
    }
    if !hops.is_empty() {
        return hops;
    }

    // T-junctions put the splice on a bend instead
    for vertex in route.interior() {
        let Some(hop) = ctx
            .resolver
            .nearest_connection_point(*vertex, ctx.rules.splice_at_vertex)
        else {
            continue;
        };
        if hop.is_splice() && !is_end(&hop) && seen.insert(hop.connector_id.clone()) {
            hops.push(hop);
        }
    }
    hops
}

/// Pins attach to their nearest splice; consecutive splices are chained
fn link_chain(
    first: ConnectionPoint,
    hops: Vec<ConnectionPoint>,
    last: ConnectionPoint,
    spec: Option<&WireSpec>,
    wired: &HashSet<(&str, &str)>,
    pass_through: &PassThroughSplices,
    out: &mut Vec<Connection>,
) {
    let vertical = (first.y - last.y).abs() > (first.x - last.x).abs();
    let mut chain = Vec::with_capacity(hops.len() + 2);
    chain.push(first);
    chain.extend(hops);
    chain.push(last);
    if vertical {
        chain.sort_by(|a, b| a.y.total_cmp(&b.y));
    } else {
        chain.sort_by(|a, b| a.x.total_cmp(&b.x));
    }

    for (i, point) in chain.iter().enumerate() {
        if point.is_splice() {
            continue;
        }
        let nearest = chain
            .iter()
            .enumerate()
            .filter(|(j, p)| *j != i && p.is_splice())
            .map(|(_, p)| p)
            .reduce(|best, p| {
                if p.position().distance(&point.position()) < best.position().distance(&point.position()) {
                    p
                } else {
                    best
                }
            });
        let Some(splice) = nearest else {
            continue;
        };
        if wired.contains(&(point.connector_id.as_str(), point.pin.as_str())) {
            continue;
        }
        out.push(Connection::with_spec(point.clone(), splice.clone(), spec));
    }

    let splices: Vec<&ConnectionPoint> = chain.iter().filter(|p| p.is_splice()).collect();
    for pair in splices.windows(2) {
        if pass_through.contains(pair[0]) && pass_through.contains(pair[1]) {
            continue;
        }
        out.push(Connection::with_spec(pair[0].clone(), pair[1].clone(), spec));
    }
}

/// Source, destination and the route point at the source end
fn orient(
    first: ConnectionPoint,
    last: ConnectionPoint,
    route: &Route,
) -> (ConnectionPoint, ConnectionPoint, Point) {
    match (first.is_splice(), last.is_splice()) {
        (true, false) => (last, first, route.end()),
        (false, true) => (first, last, route.start()),
        // the higher end (smaller Y) is the destination
        _ if route.start().y > route.end().y => (first, last, route.start()),
        _ => (last, first, route.end()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::rules::InferenceRules;
    use crate::infer::spatial::LabelIndex;
    use crate::infer::strategies::test_support::{pin, splice, wire};
    use crate::infer::types::{Diagram, Label, Polyline};

    fn polyline(points: &[(f32, f32)]) -> Polyline {
        Polyline {
            class: Some("st27".to_string()),
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }

    fn run(labels: Vec<Label>, polylines: Vec<Polyline>, horizontal: &[Connection]) -> Vec<Connection> {
        let mut geometry = Geometry::default();
        geometry.polylines = polylines;
        let diagram = Diagram::new(labels, geometry);
        let rules = InferenceRules::default();
        let index = LabelIndex::new(diagram.labels.clone());
        let ctx = StrategyContext::new(&index, &diagram.wire_specs, &rules).with_horizontal(horizontal);
        RoutingStrategy.extract(&diagram.geometry, &ctx)
    }

    #[test]
    fn test_splice_end_is_destination() {
        let found = run(
            vec![
                Label::new("MH097", 100.0, 80.0),
                Label::new("7", 100.0, 100.0),
                Label::new("SP001", 100.0, 400.0),
                Label::new("0.5,RD", 60.0, 300.0),
            ],
            vec![polyline(&[(100.0, 105.0), (100.0, 395.0)])],
            &[],
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].from.connector_id, "MH097");
        assert_eq!(found[0].to.connector_id, "SP001");
    }

    #[test]
    fn test_higher_end_is_destination() {
        let found = run(
            vec![
                Label::new("MH097", 100.0, 80.0),
                Label::new("7", 100.0, 100.0),
                Label::new("MH020", 300.0, 380.0),
                Label::new("2", 300.0, 400.0),
            ],
            vec![polyline(&[(100.0, 105.0), (100.0, 250.0), (300.0, 250.0)])],
            &[],
        );
        // ends are (100,105) and (300,250); pin 2 at (300,400) is out of reach
        assert!(found.is_empty());

        let found = run(
            vec![
                Label::new("MH097", 100.0, 80.0),
                Label::new("7", 100.0, 100.0),
                Label::new("MH020", 300.0, 380.0),
                Label::new("2", 300.0, 400.0),
                Label::new("0.35,BK", 200.0, 240.0),
            ],
            vec![polyline(&[(100.0, 105.0), (100.0, 250.0), (300.0, 250.0), (300.0, 395.0)])],
            &[],
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].from.connector_id, "MH020");
        assert_eq!(found[0].to.connector_id, "MH097");
        assert_eq!(found[0].wire_color, "BK");
    }

    #[test]
    fn test_pass_through_splices_are_not_linked() {
        let horizontal = vec![
            wire(pin("MH001", "1", 0.0, 100.0), splice("SP001", 100.0, 100.0)),
            wire(splice("SP001", 100.0, 100.0), pin("MH002", "1", 200.0, 100.0)),
            wire(pin("MH003", "1", 0.0, 600.0), splice("SP002", 100.0, 600.0)),
            wire(splice("SP002", 100.0, 600.0), pin("MH004", "1", 200.0, 600.0)),
        ];
        let labels = vec![
            Label::new("SP001", 100.0, 100.0),
            Label::new("SP002", 100.0, 600.0),
        ];
        let found = run(
            labels.clone(),
            vec![polyline(&[(100.0, 105.0), (100.0, 595.0)])],
            &horizontal,
        );
        assert!(found.is_empty());

        // without the horizontal context the long splice route is kept
        let found = run(labels, vec![polyline(&[(100.0, 105.0), (100.0, 595.0)])], &[]);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_fan_out_through_splice() {
        let found = run(
            vec![
                Label::new("MH097", 100.0, 80.0),
                Label::new("7", 100.0, 100.0),
                Label::new("SP005", 106.0, 250.0),
                Label::new("MH020", 100.0, 380.0),
                Label::new("2", 100.0, 400.0),
            ],
            vec![polyline(&[(100.0, 105.0), (100.0, 200.0), (100.0, 395.0)])],
            &[],
        );
        let pairs: Vec<(&str, &str)> = found
            .iter()
            .map(|c| (c.from.connector_id.as_str(), c.to.connector_id.as_str()))
            .collect();
        assert_eq!(pairs, vec![("MH097", "SP005"), ("MH020", "SP005")]);
    }
}
