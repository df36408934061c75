//! Connection statistics

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::infer::{Connection, InferenceOutput};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    /// Connections carrying a wire diameter and color
    pub with_spec: usize,
    /// Routing and traced connections with no attributed spec
    pub without_spec: usize,
    /// Raw candidates per strategy before merging
    pub strategy_counts: IndexMap<String, usize>,
}

impl Summary {
    pub fn of(connections: &[Connection]) -> Self {
        let with_spec = connections.iter().filter(|c| c.has_spec()).count();
        Self {
            total: connections.len(),
            with_spec,
            without_spec: connections.len() - with_spec,
            strategy_counts: IndexMap::new(),
        }
    }

    pub fn from_output(output: &InferenceOutput) -> Self {
        Self {
            strategy_counts: output
                .strategy_counts
                .iter()
                .map(|(name, count)| (name.to_string(), *count))
                .collect(),
            ..Self::of(&output.connections)
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Connections with wire spec: {}", self.with_spec)?;
        writeln!(f, "Connections without wire spec: {}", self.without_spec)?;
        writeln!(f, "Total connections: {}", self.total)?;
        for (name, count) in &self.strategy_counts {
            writeln!(f, "  {:<12} {} candidates", name, count)?;
        }
        Ok(())
    }
}
