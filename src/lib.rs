//! Wire connection extraction for vector wiring diagrams
//!
//! Reads an SVG wiring diagram, infers the point-to-point wires between
//! connector pins, splices and ground symbols, and renders the result as a
//! markdown or JSON report.
//!
//! # Modules
//! - `parse_xml` - Generic XML tree parsing
//! - `svg` - SVG primitives to labels and geometry
//! - `infer` - Connection inference engine
//! - `config` - Rules file loading
//! - `report` - Markdown/JSON output, exclusions and statistics

pub mod config;
pub mod infer;
pub mod parse_xml;
pub mod report;
pub mod svg;

pub use infer::{infer_connections, Connection, ConnectionPoint, Diagram, InferenceRules, InputError};
pub use svg::{parse_svg_file, parse_svg_str};
