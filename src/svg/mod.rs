//! SVG wiring diagram extraction
//!
//! Turns an SVG document into the label and geometry records the inference
//! engine consumes. Unreadable primitives are skipped, never fatal.
//!
//! # Submodules
//! - `text` - Text labels and multi-line connector merging
//! - `paths` - Path data parsing
//! - `shapes` - Lines, polylines, paths and splice dots
//! - `colors` - Stylesheet stroke colors

mod colors;
mod paths;
mod shapes;
mod text;

use std::path::Path as FsPath;

use anyhow::Context;
use log::debug;

use crate::infer::{Diagram, Geometry, Label};
use crate::parse_xml::{parse_xml_file, parse_xml_str, XmlNode};

pub use colors::{class_colors, wire_color_code};
pub use paths::parse_path_data;
pub use shapes::{dedup_polylines, parse_points};
pub use text::{merge_multiline_connectors, text_label, transform_position};

/// Build a diagram from a parsed SVG tree
pub fn extract_diagram(root: &XmlNode) -> Diagram {
    let mut labels: Vec<Label> = Vec::new();
    let mut geometry = Geometry::default();
    let mut polylines = Vec::new();
    let mut skipped = 0usize;

    root.walk(&mut |node| match node.local_name() {
        "text" => match text::text_label(node) {
            Some(label) => labels.push(label),
            None => skipped += 1,
        },
        "line" => match shapes::line_segment(node) {
            Some(segment) => geometry.line_segments.push(segment),
            None => skipped += 1,
        },
        "polyline" => match shapes::polyline(node) {
            Some(polyline) => polylines.push(polyline),
            None => skipped += 1,
        },
        "circle" => match shapes::circle_dot(node) {
            Some(dot) => geometry.dots.push(dot),
            None => skipped += 1,
        },
        "path" => match shapes::path_shape(node) {
            Some(shapes::PathShape::Dot(dot)) => geometry.dots.push(dot),
            Some(shapes::PathShape::Route(path)) => geometry.paths.push(path),
            None => skipped += 1,
        },
        "style" => geometry.class_colors.extend(colors::class_colors(&node.text_content)),
        _ => {}
    });

    let polyline_count = polylines.len();
    geometry.polylines = shapes::dedup_polylines(polylines);
    let labels = text::merge_multiline_connectors(labels);

    debug!(
        "svg: {} labels, {} lines, {} paths, {} polylines ({} duplicates), {} dots, {} skipped",
        labels.len(),
        geometry.line_segments.len(),
        geometry.paths.len(),
        geometry.polylines.len(),
        polyline_count - geometry.polylines.len(),
        geometry.dots.len(),
        skipped
    );
    Diagram::new(labels, geometry)
}

/// Parse an SVG file into a diagram
pub fn parse_svg_file<P: AsRef<FsPath>>(path: P) -> anyhow::Result<Diagram> {
    let path = path.as_ref();
    let root = parse_xml_file(path).with_context(|| format!("reading SVG '{}'", path.display()))?;
    anyhow::ensure!(
        root.local_name() == "svg",
        "'{}' is not an SVG document (root element '{}')",
        path.display(),
        root.name
    );
    Ok(extract_diagram(&root))
}

/// Parse an in-memory SVG document into a diagram
pub fn parse_svg_str(svg: &str) -> anyhow::Result<Diagram> {
    let root = parse_xml_str(svg)?;
    anyhow::ensure!(
        root.local_name() == "svg",
        "not an SVG document (root element '{}')",
        root.name
    );
    Ok(extract_diagram(&root))
}
