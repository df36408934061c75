//! User exclusion rules
//!
//! Applied to the merged connection list after inference. A connection is
//! dropped when either end is an excluded pin, or when it matches an
//! excluded connection in either direction.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::infer::{Connection, ConnectionPoint};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExcludedPin {
    pub connector: String,
    #[serde(default)]
    pub pin: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedConnection {
    pub from_connector: String,
    #[serde(default)]
    pub from_pin: String,
    pub to_connector: String,
    #[serde(default)]
    pub to_pin: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionRules {
    pub pins: Vec<ExcludedPin>,
    pub connections: Vec<ExcludedConnection>,
}

impl ExcludedPin {
    fn matches(&self, point: &ConnectionPoint) -> bool {
        self.connector == point.connector_id && self.pin == point.pin
    }
}

impl ExcludedConnection {
    fn matches(&self, connection: &Connection) -> bool {
        let end = |connector: &str, pin: &str, point: &ConnectionPoint| {
            connector == point.connector_id && pin == point.pin
        };
        let forward = end(&self.from_connector, &self.from_pin, &connection.from)
            && end(&self.to_connector, &self.to_pin, &connection.to);
        let reverse = end(&self.from_connector, &self.from_pin, &connection.to)
            && end(&self.to_connector, &self.to_pin, &connection.from);
        forward || reverse
    }
}

impl ExclusionRules {
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty() && self.connections.is_empty()
    }

    pub fn excludes(&self, connection: &Connection) -> bool {
        self.pins
            .iter()
            .any(|p| p.matches(&connection.from) || p.matches(&connection.to))
            || self.connections.iter().any(|c| c.matches(connection))
    }

    /// Remove excluded connections, keeping the order of the rest
    pub fn apply(&self, connections: Vec<Connection>) -> Vec<Connection> {
        if self.is_empty() {
            return connections;
        }
        let before = connections.len();
        let kept: Vec<Connection> = connections.into_iter().filter(|c| !self.excludes(c)).collect();
        info!("exclusions removed {} of {} connections", before - kept.len(), before);
        kept
    }
}

pub fn load_exclusions<P: AsRef<Path>>(path: P) -> Result<ExclusionRules> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading exclusions '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing exclusions '{}'", path.display()))
}
