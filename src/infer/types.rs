//! Core data types for connection inference
//!
//! Labels, wire specs, geometry primitives and the connection records
//! produced by the extraction strategies.

use indexmap::IndexMap;
use serde::Serialize;

use super::error::InputError;
use super::geometry::PathCommand;
use super::labels::{self, LabelCategory};

/// A 2D point in diagram units (Y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A text label placed on the diagram.
///
/// The category is computed from the content when the label is built and
/// cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    content: String,
    pub x: f32,
    pub y: f32,
    category: LabelCategory,
}

impl Label {
    pub fn new(content: impl Into<String>, x: f32, y: f32) -> Self {
        let content = content.into();
        let category = labels::classify(&content);
        Self { content, x, y, category }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn category(&self) -> LabelCategory {
        self.category
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Same label anchored at a different position
    pub fn moved_to(&self, x: f32, y: f32) -> Self {
        Self { x, y, ..self.clone() }
    }
}

/// Diameter/color annotation anchored above the wire it describes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireSpec {
    pub diameter: String,
    pub color: String,
    pub x: f32,
    pub y: f32,
}

impl WireSpec {
    pub fn from_label(label: &Label) -> Option<Self> {
        if label.category() != LabelCategory::WireSpec {
            return None;
        }
        let (diameter, color) = labels::parse_wire_spec(label.content())?;
        Some(Self {
            diameter,
            color,
            x: label.x,
            y: label.y,
        })
    }
}

/// Straight `<line>` primitive, usually a colored wire run
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub color_class: Option<String>,
}

/// Path primitive as a list of drawing commands
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub class: Option<String>,
    pub commands: Vec<PathCommand>,
}

/// Polyline primitive with explicit vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub class: Option<String>,
    pub points: Vec<Point>,
}

/// Filled dot marking a splice point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
}

/// All geometry extracted from one diagram
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub line_segments: Vec<LineSegment>,
    pub paths: Vec<Path>,
    pub polylines: Vec<Polyline>,
    pub dots: Vec<Dot>,
    /// Stylesheet class to wire color code, when the source declared one
    pub class_colors: IndexMap<String, String>,
}

/// Input snapshot for one inference run
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub labels: Vec<Label>,
    pub wire_specs: Vec<WireSpec>,
    pub geometry: Geometry,
}

impl Diagram {
    /// Build a diagram, deriving wire specs from the labels
    pub fn new(labels: Vec<Label>, geometry: Geometry) -> Self {
        let wire_specs = labels.iter().filter_map(WireSpec::from_label).collect();
        Self {
            labels,
            wire_specs,
            geometry,
        }
    }

    /// Reject structurally invalid input before any strategy runs
    pub fn validate(&self) -> Result<(), InputError> {
        for label in &self.labels {
            if !label.position().is_finite() {
                return Err(InputError::NonFiniteLabel {
                    content: label.content().to_string(),
                });
            }
        }
        for spec in &self.wire_specs {
            if !(spec.x.is_finite() && spec.y.is_finite()) {
                return Err(InputError::NonFiniteWireSpec {
                    diameter: spec.diameter.clone(),
                    color: spec.color.clone(),
                });
            }
        }

        let geometry = &self.geometry;
        for (index, segment) in geometry.line_segments.iter().enumerate() {
            let ok = [segment.x1, segment.y1, segment.x2, segment.y2]
                .iter()
                .all(|v| v.is_finite());
            if !ok {
                return Err(InputError::NonFiniteGeometry { kind: "line segment", index });
            }
        }
        for (index, polyline) in geometry.polylines.iter().enumerate() {
            if !polyline.points.iter().all(Point::is_finite) {
                return Err(InputError::NonFiniteGeometry { kind: "polyline", index });
            }
        }
        for (index, path) in geometry.paths.iter().enumerate() {
            if !path.commands.iter().all(PathCommand::is_finite) {
                return Err(InputError::NonFiniteGeometry { kind: "path", index });
            }
        }
        for (index, dot) in geometry.dots.iter().enumerate() {
            if !(dot.cx.is_finite() && dot.cy.is_finite() && dot.radius.is_finite()) {
                return Err(InputError::NonFiniteGeometry { kind: "dot", index });
            }
        }
        Ok(())
    }
}

/// A resolved wire endpoint: connector (or splice/ground id) plus pin
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionPoint {
    pub connector_id: String,
    /// Empty for splices and ground connectors
    pub pin: String,
    pub x: f32,
    pub y: f32,
}

impl ConnectionPoint {
    pub fn new(connector_id: impl Into<String>, pin: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            connector_id: connector_id.into(),
            pin: pin.into(),
            x,
            y,
        }
    }

    /// Endpoint that is the label itself (splice or ground connector)
    pub fn at_label(label: &Label) -> Self {
        Self::new(label.content(), "", label.x, label.y)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_splice(&self) -> bool {
        labels::is_splice_id(&self.connector_id)
    }

    pub fn is_ground(&self) -> bool {
        labels::classify(&self.connector_id) == LabelCategory::GroundConnector
    }

    /// Same connector and pin, position ignored
    pub fn same_terminal(&self, other: &ConnectionPoint) -> bool {
        self.connector_id == other.connector_id && self.pin == other.pin
    }

    pub(crate) fn key(&self) -> EndpointKey {
        EndpointKey {
            connector_id: self.connector_id.clone(),
            pin: self.pin.clone(),
            x_bits: self.x.to_bits(),
            y_bits: self.y.to_bits(),
        }
    }
}

/// Hashable identity of an endpoint, position included
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct EndpointKey {
    connector_id: String,
    pin: String,
    x_bits: u32,
    y_bits: u32,
}

/// One inferred point-to-point wire
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub from: ConnectionPoint,
    pub to: ConnectionPoint,
    pub wire_diameter: String,
    pub wire_color: String,
}

impl Connection {
    pub fn new(
        from: ConnectionPoint,
        to: ConnectionPoint,
        wire_diameter: impl Into<String>,
        wire_color: impl Into<String>,
    ) -> Self {
        Self {
            from,
            to,
            wire_diameter: wire_diameter.into(),
            wire_color: wire_color.into(),
        }
    }

    /// Connection carrying the attributes of `spec`, or none
    pub fn with_spec(from: ConnectionPoint, to: ConnectionPoint, spec: Option<&WireSpec>) -> Self {
        match spec {
            Some(spec) => Self::new(from, to, spec.diameter.clone(), spec.color.clone()),
            None => Self::new(from, to, "", ""),
        }
    }

    pub fn has_spec(&self) -> bool {
        !self.wire_diameter.is_empty()
    }

    /// Unordered pair of endpoint keys
    pub(crate) fn key(&self) -> (EndpointKey, EndpointKey) {
        let a = self.from.key();
        let b = self.to.key();
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Same two terminals in either direction, positions ignored
    pub fn links(&self, a: &ConnectionPoint, b: &ConnectionPoint) -> bool {
        (self.from.same_terminal(a) && self.to.same_terminal(b))
            || (self.from.same_terminal(b) && self.to.same_terminal(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_category_follows_content() {
        let label = Label::new("MH097", 10.0, 20.0);
        assert_eq!(label.category(), LabelCategory::ConnectorId);
        let moved = label.moved_to(1.0, 2.0);
        assert_eq!(moved.category(), LabelCategory::ConnectorId);
        assert_eq!(moved.content(), "MH097");
    }

    #[test]
    fn test_diagram_derives_wire_specs() {
        let labels = vec![
            Label::new("0.35,GY/PU", 100.0, 95.0),
            Label::new("7", 50.0, 100.0),
        ];
        let diagram = Diagram::new(labels, Geometry::default());
        assert_eq!(diagram.wire_specs.len(), 1);
        assert_eq!(diagram.wire_specs[0].diameter, "0.35");
        assert_eq!(diagram.wire_specs[0].color, "GY/PU");
    }

    #[test]
    fn test_validate_rejects_nan() {
        let diagram = Diagram::new(vec![Label::new("7", f32::NAN, 1.0)], Geometry::default());
        assert!(matches!(diagram.validate(), Err(InputError::NonFiniteLabel { .. })));
    }

    #[test]
    fn test_connection_key_is_unordered() {
        let a = ConnectionPoint::new("MH097", "7", 50.0, 100.0);
        let b = ConnectionPoint::new("MH020", "1", 150.0, 100.0);
        let forward = Connection::new(a.clone(), b.clone(), "", "");
        let backward = Connection::new(b, a, "0.35", "GY");
        assert_eq!(forward.key(), backward.key());
    }
}
