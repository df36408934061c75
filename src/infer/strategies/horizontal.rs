//! Spec-bearing horizontal wires
//!
//! Endpoints that sit on the same line as a group of wire specs are sorted
//! left to right and linked pairwise. The left end is the source.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;

use super::{ExtractionStrategy, StrategyContext};
use crate::infer::geometry::Segment;
use crate::infer::labels::{is_junction_mirror, LabelCategory};
use crate::infer::types::{Connection, ConnectionPoint, EndpointKey, Geometry, Label};
use crate::infer::wire_spec::SpecGroup;

pub struct HorizontalWireStrategy;

type PairKey = (EndpointKey, EndpointKey);

/// A resolved wire end plus the X of the label that owns it
struct WireEnd {
    point: ConnectionPoint,
    owner_x: f32,
}

impl ExtractionStrategy for HorizontalWireStrategy {
    fn name(&self) -> &'static str {
        "horizontal"
    }

    fn extract(&self, geometry: &Geometry, ctx: &StrategyContext) -> Vec<Connection> {
        let vertical_splices = splices_on_vertical_segments(geometry, ctx);
        let endpoints: Vec<&Label> = ctx
            .labels
            .labels()
            .iter()
            .filter(|l| l.category().is_endpoint())
            .collect();

        let mut found: IndexMap<PairKey, Connection> = IndexMap::new();
        for group in ctx.locator.groups() {
            let on_line: Vec<&Label> = endpoints
                .iter()
                .copied()
                .filter(|l| group.contains_y(l.y, ctx.rules.spec_line_tolerance))
                .collect();
            if on_line.len() < 2 {
                continue;
            }
            for cluster in clusters(on_line, ctx) {
                let line = collapse_same_x(cluster, &group, ctx);
                link_line(&line, &group, &vertical_splices, ctx, &mut found);
            }
        }
        debug!(
            "horizontal: {} connections, {} splices on vertical legs",
            found.len(),
            vertical_splices.len()
        );
        found.into_values().collect()
    }
}

/// Split points into separate wires when they spread too far vertically
fn clusters<'l>(mut points: Vec<&'l Label>, ctx: &StrategyContext) -> Vec<Vec<&'l Label>> {
    let (min_y, max_y) = points
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    if max_y - min_y <= ctx.rules.line_cluster_range {
        return vec![points];
    }

    points.sort_by(|a, b| a.y.total_cmp(&b.y));
    let gap = ctx.rules.line_cluster_gap;
    let mut clusters: Vec<Vec<&Label>> = Vec::new();
    let mut current: Vec<&Label> = Vec::new();
    let (mut lo, mut hi) = (0.0f32, 0.0f32);

    for point in points {
        if current.is_empty() {
            lo = point.y;
            hi = point.y;
            current.push(point);
        } else if (point.y - lo).abs() <= gap || (point.y - hi).abs() <= gap {
            lo = lo.min(point.y);
            hi = hi.max(point.y);
            current.push(point);
        } else {
            clusters.push(std::mem::take(&mut current));
            lo = point.y;
            hi = point.y;
            current.push(point);
        }
    }
    clusters.push(current);
    clusters.retain(|c| c.len() >= 2);
    clusters
}

/// Sort left to right and keep one point per X column, the one nearest a spec
fn collapse_same_x<'l>(mut points: Vec<&'l Label>, group: &SpecGroup, ctx: &StrategyContext) -> Vec<&'l Label> {
    points.sort_by(|a, b| a.x.total_cmp(&b.x));
    let tolerance = ctx.rules.same_x_tolerance;
    let mut unique = Vec::with_capacity(points.len());
    let mut i = 0;
    while i < points.len() {
        let mut j = i + 1;
        while j < points.len() && (points[j].x - points[i].x).abs() < tolerance {
            j += 1;
        }
        let mut best = points[i];
        for &candidate in &points[i + 1..j] {
            if group.nearest_dy(candidate.y) < group.nearest_dy(best.y) {
                best = candidate;
            }
        }
        unique.push(best);
        i = j;
    }
    unique
}

fn link_line(
    line: &[&Label],
    group: &SpecGroup,
    vertical_splices: &HashSet<&str>,
    ctx: &StrategyContext,
    found: &mut IndexMap<PairKey, Connection>,
) {
    let rules = ctx.rules;
    let on_vertical = |l: &Label| {
        l.category() == LabelCategory::SpliceId && vertical_splices.contains(l.content())
    };

    for pair in line.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        let spec_between = group.has_between(left.x, right.x);

        if !spec_between
            && !group.has_near_x(left.x, rules.vertical_splice_left_reach)
            && (on_vertical(left) || on_vertical(right))
        {
            continue;
        }

        let Some(spec) = group.for_pair(left.position(), right.position()) else {
            continue;
        };
        let mismatch = ((left.y - spec.y).abs() - (right.y - spec.y).abs()).abs();
        if mismatch > rules.wire_mismatch_tolerance {
            continue;
        }

        let Some(from) = resolve_end(left, true, None, ctx) else {
            continue;
        };
        let Some(to) = resolve_end(right, false, Some(left.x), ctx) else {
            continue;
        };

        if right.x - left.x > rules.max_unlabelled_span && !spec_between {
            continue;
        }

        let (a, b) = (&from.point, &to.point);
        if a.connector_id == b.connector_id && a.pin != b.pin && !a.is_splice() {
            continue;
        }
        if !a.is_splice() && splice_between(left, right, ctx) {
            continue;
        }
        if (a.is_splice() || b.is_splice()) && crosses_boundary(left, right, a, b, ctx) {
            continue;
        }
        if !a.is_splice()
            && !b.is_splice()
            && a.connector_id != b.connector_id
            && (to.owner_x - from.owner_x).abs() > rules.max_connector_gap
            && !group.has_between(from.owner_x, to.owner_x)
        {
            continue;
        }

        let connection = Connection::with_spec(from.point, to.point, Some(spec));
        let key = connection.key();
        match found.get_mut(&key) {
            // a later pairing with its spec printed between the ends is the better read
            Some(existing) if spec_between => *existing = connection,
            Some(_) => {}
            None => {
                found.insert(key, connection);
            }
        }
    }
}

/// A splice label on the same wire strictly between two ends
fn splice_between(left: &Label, right: &Label, ctx: &StrategyContext) -> bool {
    let avg_y = (left.y + right.y) / 2.0;
    ctx.labels
        .by_category(LabelCategory::SpliceId)
        .any(|s| left.x < s.x && s.x < right.x && (s.y - avg_y).abs() <= ctx.rules.line_cluster_gap)
}

fn splices_on_vertical_segments<'a>(geometry: &Geometry, ctx: &StrategyContext<'a>) -> HashSet<&'a str> {
    let reach = ctx.rules.splice_on_segment;
    let mut on_vertical = HashSet::new();
    for polyline in &geometry.polylines {
        for pair in polyline.points.windows(2) {
            let segment = Segment::new(pair[0], pair[1]);
            if !segment.is_vertical() {
                continue;
            }
            for splice in ctx.labels.by_category(LabelCategory::SpliceId) {
                if segment.carries(splice.position(), reach) {
                    on_vertical.insert(splice.content());
                }
            }
        }
    }
    on_vertical
}

fn resolve_end(label: &Label, as_source: bool, source_x: Option<f32>, ctx: &StrategyContext) -> Option<WireEnd> {
    match label.category() {
        LabelCategory::SpliceId | LabelCategory::GroundConnector => Some(WireEnd {
            point: ConnectionPoint::at_label(label),
            owner_x: label.x,
        }),
        _ => {
            let connector = ctx
                .resolver
                .resolve_directed(label.position(), as_source, source_x)?;
            Some(WireEnd {
                owner_x: connector.x,
                point: ConnectionPoint::new(connector.id, label.content(), label.x, label.y),
            })
        }
    }
}

/// Connector labels between two splice-side ends that mark a module boundary
fn crosses_boundary(left: &Label, right: &Label, from: &ConnectionPoint, to: &ConnectionPoint, ctx: &StrategyContext) -> bool {
    let own: Vec<&str> = [from, to]
        .into_iter()
        .filter(|p| !p.is_splice())
        .map(|p| p.connector_id.as_str())
        .collect();
    let avg_y = (left.y + right.y) / 2.0;

    ctx.labels
        .labels()
        .iter()
        .filter(|l| {
            matches!(
                l.category(),
                LabelCategory::ConnectorId | LabelCategory::JunctionConnector
            )
        })
        .filter(|l| !own.contains(&l.content()))
        .filter(|l| left.x < l.x && l.x < right.x && (l.y - avg_y).abs() < ctx.rules.boundary_dy)
        .any(|l| {
            !is_junction_mirror(l.content(), &from.connector_id)
                && !is_junction_mirror(l.content(), &to.connector_id)
        })
}
