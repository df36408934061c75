//! Markdown connection report

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;

use crate::infer::Connection;

const TITLE: &str = "# Circuit Diagram Wire Connections";

/// Table cells cannot hold line breaks
fn cell(text: &str) -> String {
    text.replace('\n', "<br>")
}

fn table_row(cells: &[&str]) -> String {
    let cells: Vec<String> = cells.iter().map(|c| cell(c)).collect();
    format!("| {} |", cells.join(" | "))
}

/// Full report: a table of every connection, then one section per source
pub fn markdown_report(connections: &[Connection]) -> String {
    let mut lines = vec![
        TITLE.to_string(),
        String::new(),
        format!("**Total Connections:** {}", connections.len()),
        String::new(),
        "## All Connections (Sorted by From Connector)".to_string(),
        String::new(),
        "| From | From Pin | To | To Pin | Wire DM | Color |".to_string(),
        "|------|----------|-----|--------|---------|-------|".to_string(),
    ];
    for c in connections {
        lines.push(table_row(&[
            c.from.connector_id.as_str(),
            c.from.pin.as_str(),
            c.to.connector_id.as_str(),
            c.to.pin.as_str(),
            c.wire_diameter.as_str(),
            c.wire_color.as_str(),
        ]));
    }
    lines.push(String::new());
    lines.push("## Connections Grouped by Source Connector".to_string());

    let mut groups: IndexMap<&str, Vec<&Connection>> = IndexMap::new();
    for c in connections {
        groups.entry(c.from.connector_id.as_str()).or_default().push(c);
    }
    groups.sort_keys();

    for (source, group) in &groups {
        lines.push(String::new());
        lines.push(format!("### {} ({} connections)", cell(source), group.len()));
        lines.push(String::new());
        lines.push("| From Pin | To | To Pin | Wire DM | Color |".to_string());
        lines.push("|----------|-----|--------|---------|-------|".to_string());
        for c in group {
            lines.push(table_row(&[
                c.from.pin.as_str(),
                c.to.connector_id.as_str(),
                c.to.pin.as_str(),
                c.wire_diameter.as_str(),
                c.wire_color.as_str(),
            ]));
        }
    }
    lines.push(String::new());
    lines.join("\n")
}

pub fn write_markdown<P: AsRef<Path>>(connections: &[Connection], path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, markdown_report(connections))
        .with_context(|| format!("writing report '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::ConnectionPoint;

    fn connection(from: &str, from_pin: &str, to: &str, to_pin: &str) -> Connection {
        Connection::new(
            ConnectionPoint::new(from, from_pin, 0.0, 0.0),
            ConnectionPoint::new(to, to_pin, 0.0, 0.0),
            "0.35",
            "GY/PU",
        )
    }

    #[test]
    fn test_report_layout() {
        let report = markdown_report(&[
            connection("MH097", "7", "MH020", "1"),
            connection("MH097", "8", "SP001", ""),
            connection("FL2MH", "3", "MH020", "2"),
        ]);
        assert!(report.starts_with(TITLE));
        assert!(report.contains("**Total Connections:** 3"));
        assert!(report.contains("| MH097 | 7 | MH020 | 1 | 0.35 | GY/PU |"));
        assert!(report.contains("### MH097 (2 connections)"));

        // grouped sections are ordered by source id
        let fl = report.find("### FL2MH").unwrap();
        let mh = report.find("### MH097").unwrap();
        assert!(fl < mh);
    }

    #[test]
    fn test_multiline_ids_use_br() {
        let report = markdown_report(&[connection("MAIN202 (XR-)\nMAIN642 (XR+)", "4", "SP002", "")]);
        assert!(report.contains("| MAIN202 (XR-)<br>MAIN642 (XR+) | 4 | SP002 |  | 0.35 | GY/PU |"));
        assert!(report.contains("### MAIN202 (XR-)<br>MAIN642 (XR+) (1 connections)"));
    }
}
