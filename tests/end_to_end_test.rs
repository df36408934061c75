use std::fs;

use wire_extract::infer::{infer_connections, InferenceRules};
use wire_extract::report::{load_exclusions, markdown_report, to_json, write_markdown};
use wire_extract::svg::{parse_svg_file, parse_svg_str};

const SINGLE_WIRE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 300">
  <style type="text/css"><![CDATA[
    .st0{fill:none;stroke:#000000;stroke-width:0.5;}
  ]]></style>
  <text transform="matrix(1 0 0 1 48 90)">MH097</text>
  <text transform="matrix(1 0 0 1 50 100)">7</text>
  <text transform="matrix(1 0 0 1 100 100)">0.35,GY/PU</text>
  <text transform="matrix(1 0 0 1 149 85)">MH020</text>
  <text transform="matrix(1 0 0 1 150 100)">1</text>
  <path d="M0 0 X5"/>
</svg>
"#;

#[test]
fn test_single_horizontal_wire_from_svg() {
    let diagram = parse_svg_str(SINGLE_WIRE).unwrap();
    assert_eq!(diagram.labels.len(), 5);
    assert_eq!(diagram.wire_specs.len(), 1);
    // the malformed path is dropped, not fatal
    assert!(diagram.geometry.paths.is_empty());

    let output = infer_connections(&diagram, &InferenceRules::default()).unwrap();
    assert_eq!(output.connections.len(), 1);
    let wire = &output.connections[0];
    assert_eq!((wire.from.connector_id.as_str(), wire.from.pin.as_str()), ("MH097", "7"));
    assert_eq!((wire.to.connector_id.as_str(), wire.to.pin.as_str()), ("MH020", "1"));
    assert_eq!(wire.wire_diameter, "0.35");
    assert_eq!(wire.wire_color, "GY/PU");

    let report = markdown_report(&output.connections);
    assert!(report.contains("| MH097 | 7 | MH020 | 1 | 0.35 | GY/PU |"));
}

#[test]
fn test_repeated_runs_are_identical() {
    let diagram = parse_svg_str(SINGLE_WIRE).unwrap();
    let rules = InferenceRules::default();
    let first = infer_connections(&diagram, &rules).unwrap();
    let second = infer_connections(&diagram, &rules).unwrap();
    assert_eq!(first.connections, second.connections);
    assert_eq!(to_json(&first.connections).unwrap(), to_json(&second.connections).unwrap());
}

#[test]
fn test_file_pipeline_with_exclusions() {
    let dir = tempfile::tempdir().unwrap();
    let svg_path = dir.path().join("diagram.svg");
    fs::write(&svg_path, SINGLE_WIRE).unwrap();
    let exclusions_path = dir.path().join("exclusions.json");
    fs::write(
        &exclusions_path,
        r#"{ "connections": [{ "fromConnector": "MH020", "fromPin": "1", "toConnector": "MH097", "toPin": "7" }] }"#,
    )
    .unwrap();

    let diagram = parse_svg_file(&svg_path).unwrap();
    let output = infer_connections(&diagram, &InferenceRules::default()).unwrap();
    let exclusions = load_exclusions(&exclusions_path).unwrap();
    let connections = exclusions.apply(output.connections);
    assert!(connections.is_empty());

    let report_path = dir.path().join("diagram_connections.md");
    write_markdown(&connections, &report_path).unwrap();
    let report = fs::read_to_string(&report_path).unwrap();
    assert!(report.contains("**Total Connections:** 0"));
}

#[test]
fn test_non_svg_documents_are_rejected() {
    assert!(parse_svg_str("<html><body/></html>").is_err());
    assert!(parse_svg_file("does/not/exist.svg").is_err());
}
