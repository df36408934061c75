//! Candidate merging and deduplication
//!
//! Strategy outputs are concatenated in a fixed order, so the first-wins
//! tie-break on colliding keys is reproducible. The result is sorted by
//! source connector, then numerically by source pin.

use std::cmp::Ordering;

use indexmap::IndexMap;
use log::debug;

use super::strategies::PassThroughSplices;
use super::types::{Connection, EndpointKey};

/// Output of one strategy, tagged with the strategy name
#[derive(Debug, Clone)]
pub struct StrategyOutput {
    pub name: &'static str,
    pub connections: Vec<Connection>,
}

impl StrategyOutput {
    pub fn new(name: &'static str, connections: Vec<Connection>) -> Self {
        Self { name, connections }
    }
}

/// Self-loops, and spec-less wires between two pins of one connector
fn is_degenerate(conn: &Connection) -> bool {
    if conn.from.same_terminal(&conn.to) {
        return true;
    }
    conn.from.connector_id == conn.to.connector_id
        && !conn.has_spec()
        && !conn.from.is_splice()
}

/// Merge the horizontal stage with every later stage.
///
/// Connections from `others` whose ends are two distinct pass-through
/// splices are dropped; horizontal connections define pass-through and are
/// never suppressed.
pub fn merge(horizontal: &[Connection], others: &[StrategyOutput]) -> Vec<Connection> {
    let pass_through = PassThroughSplices::from_horizontal(horizontal);
    let mut unique: IndexMap<(EndpointKey, EndpointKey), Connection> = IndexMap::new();
    let mut duplicates = 0usize;
    let mut suppressed = 0usize;

    let tagged = horizontal
        .iter()
        .map(|c| (true, c))
        .chain(others.iter().flat_map(|o| o.connections.iter().map(|c| (false, c))));

    for (is_horizontal, conn) in tagged {
        if is_degenerate(conn) {
            continue;
        }
        if !is_horizontal && pass_through.both(&conn.from, &conn.to) {
            suppressed += 1;
            continue;
        }
        let key = conn.key();
        if unique.contains_key(&key) {
            duplicates += 1;
            continue;
        }
        unique.insert(key, conn.clone());
    }

    let mut merged: Vec<Connection> = unique.into_values().collect();
    merged.sort_by(compare_output_order);

    debug!(
        "merge: {} connections, {} duplicates, {} pass-through suppressed",
        merged.len(),
        duplicates,
        suppressed
    );
    merged
}

/// Pin as a number; non-numeric and empty pins sort after every number
fn pin_rank(pin: &str) -> (bool, u32) {
    match pin.parse::<u32>() {
        Ok(n) => (false, n),
        Err(_) => (true, 0),
    }
}

fn compare_output_order(a: &Connection, b: &Connection) -> Ordering {
    a.from
        .connector_id
        .cmp(&b.from.connector_id)
        .then_with(|| pin_rank(&a.from.pin).cmp(&pin_rank(&b.from.pin)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::strategies::test_support::{pin, splice, wire};
    use crate::infer::types::ConnectionPoint;

    fn ids(connections: &[Connection]) -> Vec<String> {
        connections
            .iter()
            .map(|c| {
                format!(
                    "{}.{}->{}.{}",
                    c.from.connector_id, c.from.pin, c.to.connector_id, c.to.pin
                )
            })
            .collect()
    }

    #[test]
    fn test_reversed_duplicate_collapses() {
        let a = pin("MH097", "7", 50.0, 100.0);
        let b = pin("MH020", "1", 150.0, 100.0);
        let horizontal = vec![wire(a.clone(), b.clone())];
        let others = vec![StrategyOutput::new("routing", vec![wire(b, a)])];
        let merged = merge(&horizontal, &others);
        assert_eq!(ids(&merged), vec!["MH097.7->MH020.1"]);
    }

    #[test]
    fn test_discovery_order_does_not_change_result() {
        let c1 = wire(pin("MH097", "7", 50.0, 100.0), splice("SP001", 150.0, 100.0));
        let c2 = wire(pin("MH020", "2", 50.0, 300.0), splice("SP001", 150.0, 100.0));
        let c3 = wire(pin("MH020", "1", 50.0, 200.0), pin("SR02", "4", 250.0, 200.0));

        let forward = merge(
            &[],
            &[
                StrategyOutput::new("colored", vec![c1.clone(), c2.clone()]),
                StrategyOutput::new("routing", vec![c3.clone(), c1.clone()]),
            ],
        );
        let backward = merge(
            &[],
            &[
                StrategyOutput::new("routing", vec![c3, c1.clone()]),
                StrategyOutput::new("colored", vec![c2, c1]),
            ],
        );
        assert_eq!(forward, backward);
        assert_eq!(
            ids(&forward),
            vec!["MH020.1->SR02.4", "MH020.2->SP001.", "MH097.7->SP001."]
        );
    }

    #[test]
    fn test_pass_through_edges_suppressed() {
        let s1 = splice("SP001", 100.0, 100.0);
        let s2 = splice("SP002", 100.0, 600.0);
        let horizontal = vec![
            wire(pin("MH001", "1", 0.0, 100.0), s1.clone()),
            wire(s1.clone(), pin("MH002", "1", 200.0, 100.0)),
            wire(pin("MH003", "1", 0.0, 600.0), s2.clone()),
            wire(s2.clone(), pin("MH004", "1", 200.0, 600.0)),
        ];
        let c = pin("MH005", "3", 100.0, 300.0);
        let others = vec![StrategyOutput::new(
            "routing",
            vec![wire(s1.clone(), s2), wire(c, s1)],
        )];
        let merged = merge(&horizontal, &others);
        assert_eq!(merged.len(), 5);
        assert!(!merged
            .iter()
            .any(|m| m.from.connector_id == "SP001" && m.to.connector_id == "SP002"));
        assert!(merged.iter().any(|m| m.from.connector_id == "MH005"));
    }

    #[test]
    fn test_degenerate_connections_dropped() {
        let same_connector = Connection::new(
            pin("MH097", "7", 50.0, 100.0),
            pin("MH097", "8", 80.0, 100.0),
            "",
            "",
        );
        let self_loop = wire(splice("SP001", 0.0, 0.0), splice("SP001", 0.0, 0.0));
        let specced = wire(pin("MH097", "7", 50.0, 100.0), pin("MH097", "8", 80.0, 100.0));
        let merged = merge(
            &[],
            &[StrategyOutput::new("colored", vec![same_connector, self_loop, specced])],
        );
        assert_eq!(merged.len(), 1);
        assert!(merged[0].has_spec());
    }

    #[test]
    fn test_pins_sort_numerically_then_empty() {
        let to = ConnectionPoint::new("SP009", "", 0.0, 0.0);
        let conns = vec![
            wire(pin("MH001", "", 0.0, 10.0), to.clone()),
            wire(pin("MH001", "10", 0.0, 20.0), to.clone()),
            wire(pin("MH001", "9", 0.0, 30.0), to.clone()),
            wire(pin("AB001", "x", 0.0, 40.0), to),
        ];
        let merged = merge(&[], &[StrategyOutput::new("colored", conns)]);
        let pins: Vec<(&str, &str)> = merged
            .iter()
            .map(|c| (c.from.connector_id.as_str(), c.from.pin.as_str()))
            .collect();
        assert_eq!(
            pins,
            vec![("AB001", "x"), ("MH001", "9"), ("MH001", "10"), ("MH001", "")]
        );
    }
}
