//! JSON export of connections

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::infer::Connection;

pub fn to_json(connections: &[Connection]) -> Result<String> {
    Ok(serde_json::to_string_pretty(connections)?)
}

pub fn write_json<P: AsRef<Path>>(connections: &[Connection], path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, to_json(connections)?)
        .with_context(|| format!("writing JSON '{}'", path.display()))
}
