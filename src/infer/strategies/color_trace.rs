//! Multi-hop splice chains sharing one wire spec
//!
//! Long routing wires often leave no drawn path the other strategies can
//! follow. Counting spec-bearing wires in and out of every splice exposes
//! splices where a wire arrives but never leaves; the closest distant splice
//! carrying the same spec is taken as the other end.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::debug;

use super::{ExtractionStrategy, StrategyContext};
use crate::infer::labels::LabelCategory;
use crate::infer::types::{Connection, ConnectionPoint, Geometry, Point};

pub struct ColorTraceStrategy;

#[derive(Debug, Default, Clone, Copy)]
struct Flow {
    incoming: usize,
    outgoing: usize,
}

impl Flow {
    fn total(&self) -> usize {
        self.incoming + self.outgoing
    }
}

/// `diameter,color` key of a spec-bearing connection
type SpecKey = (String, String);

/// Per splice, per spec key, in first-seen order
type FlowTable = IndexMap<String, IndexMap<SpecKey, Flow>>;

fn flow_table(connections: &[Connection]) -> FlowTable {
    let mut table = FlowTable::new();
    for conn in connections.iter().filter(|c| c.has_spec()) {
        let key = (conn.wire_diameter.clone(), conn.wire_color.clone());
        if conn.from.is_splice() {
            let flow = table
                .entry(conn.from.connector_id.clone())
                .or_default()
                .entry(key.clone())
                .or_default();
            flow.outgoing += 1;
        }
        if conn.to.is_splice() {
            let flow = table
                .entry(conn.to.connector_id.clone())
                .or_default()
                .entry(key)
                .or_default();
            flow.incoming += 1;
        }
    }
    table
}

/// A minority spec on a splice that carries several (one wire against a
/// dominant spec) is most likely a misattribution
fn is_weak(flows: &IndexMap<SpecKey, Flow>, key: &SpecKey) -> bool {
    if flows.len() < 2 {
        return false;
    }
    let max = flows.values().map(Flow::total).max().unwrap_or(0);
    let count = flows.get(key).map(Flow::total).unwrap_or(0);
    count < max && count <= 1
}

impl ExtractionStrategy for ColorTraceStrategy {
    fn name(&self) -> &'static str {
        "color_trace"
    }

    fn extract(&self, _geometry: &Geometry, ctx: &StrategyContext) -> Vec<Connection> {
        let rules = ctx.rules;
        let table = flow_table(ctx.prior);

        let mut positions: HashMap<&str, Point> = HashMap::new();
        for label in ctx.labels.by_category(LabelCategory::SpliceId) {
            positions.entry(label.content()).or_insert_with(|| label.position());
        }

        // splices with more wires in than out, grouped by spec
        let mut unbalanced: IndexMap<&SpecKey, Vec<&str>> = IndexMap::new();
        for (splice, flows) in &table {
            for (key, flow) in flows {
                if flow.incoming > flow.outgoing {
                    unbalanced.entry(key).or_default().push(splice.as_str());
                }
            }
        }

        let linked = |a: &str, b: &str| {
            ctx.prior.iter().any(|c| {
                (c.from.connector_id == a && c.to.connector_id == b)
                    || (c.from.connector_id == b && c.to.connector_id == a)
            })
        };

        let mut paired: HashSet<&str> = HashSet::new();
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut connections = Vec::new();

        for (key, sources) in &unbalanced {
            for &source in sources {
                if paired.contains(source) {
                    continue;
                }
                let Some(&from) = positions.get(source) else {
                    continue;
                };
                if table.get(source).is_some_and(|flows| is_weak(flows, key)) {
                    continue;
                }

                let mut best: Option<(&str, Point, f32)> = None;
                for (target, flows) in &table {
                    let target = target.as_str();
                    if target == source || !flows.contains_key(*key) {
                        continue;
                    }
                    if seen.contains(&ordered(source, target)) || linked(source, target) {
                        continue;
                    }
                    let Some(&to) = positions.get(target) else {
                        continue;
                    };
                    let distance = from.distance(&to);
                    if distance <= rules.trace_min_distance || (to.y - from.y).abs() <= rules.trace_min_dy {
                        continue;
                    }
                    if best.map_or(true, |(_, _, d)| distance < d) {
                        best = Some((target, to, distance));
                    }
                }

                let Some((target, to, _)) = best else {
                    continue;
                };
                seen.insert(ordered(source, target));
                paired.insert(source);
                paired.insert(target);
                let (diameter, color) = key;
                connections.push(Connection::new(
                    ConnectionPoint::new(source, "", from.x, from.y),
                    ConnectionPoint::new(target, "", to.x, to.y),
                    diameter.clone(),
                    color.clone(),
                ));
            }
        }

        debug!(
            "color_trace: {} splices with flow, {} traced connections",
            table.len(),
            connections.len()
        );
        connections
    }
}

fn ordered<'s>(a: &'s str, b: &'s str) -> (&'s str, &'s str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
