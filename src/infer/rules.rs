//! Tuning rules for the inference heuristics
//!
//! Every distance threshold the strategies use lives here so that diagram
//! families with different drawing conventions can be tuned without code
//! changes. Defaults match the common wiring-diagram layout.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::InputError;
use super::types::Geometry;

/// Default style class to wire color code table
const DEFAULT_COLOR_CLASSES: &[(&str, &str)] = &[
    ("st5", "BU"),
    ("st6", "BUDK"),
    ("st7", "BK"),
    ("st8", "GN"),
    ("st9", "PU"),
    ("st10", "GY"),
    ("st11", "BK"),
    ("st12", "BN"),
    ("st19", "YE"),
    ("st21", "RD"),
    ("st22", "BK"),
    ("st23", "GN"),
    ("st24", "WH"),
    ("st26", "PU"),
    ("st27", "BU"),
    ("st28", "BN"),
    ("st29", "RD"),
    ("st30", "YE"),
    ("st31", "YE"),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceRules {
    // connector resolution
    /// Minimum height of a connector label above its pin
    pub pin_clearance: f32,
    pub connector_max_dx: f32,
    pub junction_max_dx: f32,
    /// Vertical reach of the between-source-and-pin promotion
    pub between_max_dy: f32,
    /// Prefix naming the hub side of junction pairs (`FL` in `FL2MH`)
    pub junction_hub: String,

    // spec-bearing horizontal wires
    pub spec_line_tolerance: f32,
    pub spec_bucket: f32,
    pub line_cluster_range: f32,
    pub line_cluster_gap: f32,
    pub same_x_tolerance: f32,
    pub wire_mismatch_tolerance: f32,
    pub max_unlabelled_span: f32,
    pub max_connector_gap: f32,
    pub boundary_dy: f32,
    pub vertical_splice_left_reach: f32,

    // wire spec proximity
    pub spec_above_max: f32,
    pub spec_max_weighted_distance: f32,
    pub rect_spec_dy: f32,
    pub rect_spec_margin: f32,

    // routing
    pub endpoint_search_radius: f32,
    pub component_margin: f32,
    pub splice_on_segment: f32,
    pub splice_at_vertex: f32,
    pub min_splice_route: f32,
    pub corner_radius: f32,

    // ground arrows
    pub ground_dy: f32,
    pub ground_max_dx: f32,

    // color trace
    pub trace_min_distance: f32,
    pub trace_min_dy: f32,

    // colored and grid wires
    pub colored_x_tolerance: f32,
    pub colored_y_tolerance: f32,
    pub colored_spec_dy: f32,
    pub grid_tolerance: f32,

    // splice dots and generated ids
    pub splice_snap_distance: f32,
    pub id_proximity: f32,
    /// Give pins with no connector above them a generated connector id
    pub synthesize_orphan_connectors: bool,

    // style classes
    pub routing_path_classes: Vec<String>,
    pub ground_arrow_classes: Vec<String>,
    pub dashed_classes: Vec<String>,
    pub color_classes: IndexMap<String, String>,
}

impl Default for InferenceRules {
    fn default() -> Self {
        Self {
            pin_clearance: 5.0,
            connector_max_dx: 50.0,
            junction_max_dx: 100.0,
            between_max_dy: 60.0,
            junction_hub: "FL".to_string(),

            spec_line_tolerance: 10.0,
            spec_bucket: 10.0,
            line_cluster_range: 15.0,
            line_cluster_gap: 3.0,
            same_x_tolerance: 0.5,
            wire_mismatch_tolerance: 5.0,
            max_unlabelled_span: 220.0,
            max_connector_gap: 100.0,
            boundary_dy: 15.0,
            vertical_splice_left_reach: 50.0,

            spec_above_max: 50.0,
            spec_max_weighted_distance: 150.0,
            rect_spec_dy: 15.0,
            rect_spec_margin: 50.0,

            endpoint_search_radius: 100.0,
            component_margin: 20.0,
            splice_on_segment: 10.0,
            splice_at_vertex: 20.0,
            min_splice_route: 400.0,
            corner_radius: 15.0,

            ground_dy: 10.0,
            ground_max_dx: 120.0,

            trace_min_distance: 400.0,
            trace_min_dy: 200.0,

            colored_x_tolerance: 30.0,
            colored_y_tolerance: 15.0,
            colored_spec_dy: 20.0,
            grid_tolerance: 5.0,

            splice_snap_distance: 35.0,
            id_proximity: 5.0,
            synthesize_orphan_connectors: false,

            routing_path_classes: vec!["st1".into(), "st3".into(), "st4".into()],
            ground_arrow_classes: vec!["st17".into()],
            dashed_classes: vec!["st16".into()],
            color_classes: DEFAULT_COLOR_CLASSES
                .iter()
                .map(|(class, color)| (class.to_string(), color.to_string()))
                .collect(),
        }
    }
}

impl InferenceRules {
    /// Reject thresholds that would make the heuristics meaningless
    pub fn validate(&self) -> Result<(), InputError> {
        let distances = [
            ("pin_clearance", self.pin_clearance),
            ("connector_max_dx", self.connector_max_dx),
            ("junction_max_dx", self.junction_max_dx),
            ("between_max_dy", self.between_max_dy),
            ("spec_line_tolerance", self.spec_line_tolerance),
            ("spec_bucket", self.spec_bucket),
            ("line_cluster_range", self.line_cluster_range),
            ("line_cluster_gap", self.line_cluster_gap),
            ("same_x_tolerance", self.same_x_tolerance),
            ("wire_mismatch_tolerance", self.wire_mismatch_tolerance),
            ("max_unlabelled_span", self.max_unlabelled_span),
            ("max_connector_gap", self.max_connector_gap),
            ("boundary_dy", self.boundary_dy),
            ("vertical_splice_left_reach", self.vertical_splice_left_reach),
            ("spec_above_max", self.spec_above_max),
            ("spec_max_weighted_distance", self.spec_max_weighted_distance),
            ("rect_spec_dy", self.rect_spec_dy),
            ("rect_spec_margin", self.rect_spec_margin),
            ("endpoint_search_radius", self.endpoint_search_radius),
            ("component_margin", self.component_margin),
            ("splice_on_segment", self.splice_on_segment),
            ("splice_at_vertex", self.splice_at_vertex),
            ("min_splice_route", self.min_splice_route),
            ("corner_radius", self.corner_radius),
            ("ground_dy", self.ground_dy),
            ("ground_max_dx", self.ground_max_dx),
            ("trace_min_distance", self.trace_min_distance),
            ("trace_min_dy", self.trace_min_dy),
            ("colored_x_tolerance", self.colored_x_tolerance),
            ("colored_y_tolerance", self.colored_y_tolerance),
            ("colored_spec_dy", self.colored_spec_dy),
            ("grid_tolerance", self.grid_tolerance),
            ("splice_snap_distance", self.splice_snap_distance),
            ("id_proximity", self.id_proximity),
        ];

        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(InputError::InvalidRule {
                    name,
                    reason: format!("expected a finite non-negative distance, got {}", value),
                });
            }
        }
        if self.spec_bucket == 0.0 {
            return Err(InputError::InvalidRule {
                name: "spec_bucket",
                reason: "bucket size must be positive".to_string(),
            });
        }
        if self.junction_hub.is_empty() {
            return Err(InputError::InvalidRule {
                name: "junction_hub",
                reason: "hub prefix must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Wire color for a style class: the diagram's own stylesheet wins over
    /// the configured table
    pub fn wire_color(&self, geometry: &Geometry, class: &str) -> Option<String> {
        geometry
            .class_colors
            .get(class)
            .or_else(|| self.color_classes.get(class))
            .cloned()
    }

    pub fn is_routing_class(&self, class: Option<&str>) -> bool {
        class.is_some_and(|c| self.routing_path_classes.iter().any(|r| r == c))
    }

    pub fn is_ground_arrow_class(&self, class: Option<&str>) -> bool {
        class.is_some_and(|c| self.ground_arrow_classes.iter().any(|g| g == c))
    }
}
