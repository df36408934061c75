//! Synthetic identifiers for unlabeled geometry
//!
//! The same position always maps to the same id within one run, so repeated
//! lookups of one dot or pin reuse their id instead of minting a new one.

use std::collections::HashMap;

use super::types::Point;

const SPLICE_PREFIX: &str = "SP_CUSTOM_";
const CONNECTOR_PREFIX: &str = "CON_CUSTOM_";

/// Position rounded to two decimals
fn position_key(position: Point) -> (i64, i64) {
    (
        (position.x * 100.0).round() as i64,
        (position.y * 100.0).round() as i64,
    )
}

#[derive(Debug, Default)]
struct Sequence {
    next: u32,
    assigned: HashMap<(i64, i64), String>,
}

impl Sequence {
    fn id_for(&mut self, prefix: &str, position: Point) -> String {
        let next = &mut self.next;
        self.assigned
            .entry(position_key(position))
            .or_insert_with(|| {
                *next += 1;
                format!("{}{:03}", prefix, *next)
            })
            .clone()
    }
}

/// Id source for one inference run. Splices and connectors count
/// independently.
#[derive(Debug, Default)]
pub struct IdGenerator {
    splices: Sequence,
    connectors: Sequence,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn splice_id(&mut self, position: Point) -> String {
        self.splices.id_for(SPLICE_PREFIX, position)
    }

    pub fn connector_id(&mut self, position: Point) -> String {
        self.connectors.id_for(CONNECTOR_PREFIX, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::labels::{classify, LabelCategory};

    #[test]
    fn test_same_position_same_id() {
        let mut ids = IdGenerator::new();
        let a = ids.splice_id(Point::new(10.001, 20.0));
        let b = ids.splice_id(Point::new(10.0, 20.0));
        let c = ids.splice_id(Point::new(30.0, 20.0));
        assert_eq!(a, "SP_CUSTOM_001");
        assert_eq!(a, b);
        assert_eq!(c, "SP_CUSTOM_002");
    }

    #[test]
    fn test_counters_are_independent() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.splice_id(Point::new(1.0, 1.0)), "SP_CUSTOM_001");
        assert_eq!(ids.connector_id(Point::new(1.0, 1.0)), "CON_CUSTOM_001");
        assert_eq!(ids.connector_id(Point::new(2.0, 1.0)), "CON_CUSTOM_002");
        assert_eq!(ids.splice_id(Point::new(2.0, 1.0)), "SP_CUSTOM_002");
    }

    #[test]
    fn test_generated_splice_ids_classify_as_splices() {
        let mut ids = IdGenerator::new();
        let id = ids.splice_id(Point::new(5.0, 5.0));
        assert_eq!(classify(&id), LabelCategory::SpliceId);
    }
}
