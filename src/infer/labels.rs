//! Label classification
//!
//! Maps the text content of a diagram label onto one closed set of
//! categories. Rules are tried in priority order, so every string lands in
//! exactly one category.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Semantic role of a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LabelCategory {
    /// Bidirectional junction symbol such as `FL2MH`
    JunctionConnector,
    /// Ground tie point such as `G101(a)`
    GroundConnector,
    /// Splice point, `SP012` or a generated `SP_CUSTOM_004`
    SpliceId,
    /// Wire annotation such as `0.35,GY/PU`
    WireSpec,
    /// Ordinary connector such as `MH097`, or a generated `CON_CUSTOM_001`
    ConnectorId,
    /// Plain pin number
    PinNumber,
    /// Shielded pin variant such as `3-4`
    DashPin,
    Unrecognized,
}

impl LabelCategory {
    /// Labels that may govern the pins below them
    pub fn is_connector(self) -> bool {
        matches!(
            self,
            Self::ConnectorId | Self::JunctionConnector | Self::GroundConnector
        )
    }

    pub fn is_pin(self) -> bool {
        matches!(self, Self::PinNumber | Self::DashPin)
    }

    /// Labels that can terminate a wire directly: pins, splices, grounds
    pub fn is_endpoint(self) -> bool {
        self.is_pin() || matches!(self, Self::SpliceId | Self::GroundConnector)
    }
}

static JUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{2,3})2([A-Z]{2,3})$").expect("junction pattern"));
static GROUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z_]+\d+[A-Z_]*\([a-z]\)$").expect("ground pattern"));
static SPLICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^SP(?:\d+|_CUSTOM_\d+)$").expect("splice pattern"));
static WIRE_SPEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d*\.?\d+),([A-Z]{2,}(?:/[A-Z]{2,})?)$").expect("wire spec pattern")
});
static CONNECTOR_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{2,4}\d{1,5}[A-Z_]{0,3}(?: \([A-Z]+[+-]\))?$").expect("connector pattern")
});
static GENERATED_CONNECTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^CON_CUSTOM_\d+$").expect("generated connector pattern"));
static GROUND_DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^GND\d*$").expect("ground description pattern"));
static PIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("pin pattern"));
static DASH_PIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+-\d+$").expect("dash pin pattern"));

/// Classify label text. Total: unknown text is `Unrecognized`.
pub fn classify(text: &str) -> LabelCategory {
    let text = text.trim();

    if JUNCTION.is_match(text) {
        LabelCategory::JunctionConnector
    } else if GROUND.is_match(text) {
        LabelCategory::GroundConnector
    } else if SPLICE.is_match(text) {
        LabelCategory::SpliceId
    } else if WIRE_SPEC.is_match(text) {
        LabelCategory::WireSpec
    } else if GENERATED_CONNECTOR.is_match(text) || is_connector_text(text) {
        LabelCategory::ConnectorId
    } else if PIN.is_match(text) {
        LabelCategory::PinNumber
    } else if DASH_PIN.is_match(text) {
        LabelCategory::DashPin
    } else {
        LabelCategory::Unrecognized
    }
}

/// Every line must be a connector id (with an optional option suffix)
fn is_connector_text(text: &str) -> bool {
    !text.is_empty()
        && text.lines().all(|line| {
            let line = line.trim();
            CONNECTOR_LINE.is_match(line)
                && !line.starts_with("SP")
                && !GROUND_DESCRIPTION.is_match(line)
        })
}

pub fn is_splice_id(text: &str) -> bool {
    classify(text) == LabelCategory::SpliceId
}

/// Split `0.35,GY/PU` into diameter and color
pub fn parse_wire_spec(text: &str) -> Option<(String, String)> {
    let caps = WIRE_SPEC.captures(text.trim())?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Which side of a junction pair an id names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunctionVariant {
    /// `HUB2X`, valid only as the start of a wire
    Source,
    /// `X2HUB`, valid only as the end of a wire
    Destination,
}

/// The two name parts of a junction id
pub fn junction_parts(id: &str) -> Option<(&str, &str)> {
    let caps = JUNCTION.captures(id.trim())?;
    let first = caps.get(1)?.as_str();
    let second = caps.get(2)?.as_str();
    Some((first, second))
}

/// Variant of `id` relative to the hub prefix
pub fn junction_variant(id: &str, hub: &str) -> Option<JunctionVariant> {
    let (first, second) = junction_parts(id)?;
    if first == hub {
        Some(JunctionVariant::Source)
    } else if second == hub {
        Some(JunctionVariant::Destination)
    } else {
        None
    }
}

/// `A2B` and `B2A`
pub fn is_junction_mirror(a: &str, b: &str) -> bool {
    match (junction_parts(a), junction_parts(b)) {
        (Some((a1, a2)), Some((b1, b2))) => a1 == b2 && a2 == b1,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_ids() {
        assert_eq!(classify("MH097"), LabelCategory::ConnectorId);
        assert_eq!(classify("MAIN202"), LabelCategory::ConnectorId);
        assert_eq!(classify("RS800A"), LabelCategory::ConnectorId);
        assert_eq!(classify("UH07_"), LabelCategory::ConnectorId);
        assert_eq!(classify("CON_CUSTOM_003"), LabelCategory::ConnectorId);
        assert_eq!(classify("M1"), LabelCategory::Unrecognized);
        assert_eq!(classify("MAINS123456"), LabelCategory::Unrecognized);
    }

    #[test]
    fn test_ground_descriptions_are_not_connectors() {
        assert_eq!(classify("GND1"), LabelCategory::Unrecognized);
        assert_eq!(classify("SP12A"), LabelCategory::Unrecognized);
    }

    #[test]
    fn test_junction_has_priority_over_connector() {
        // MH2FL also fits the connector grammar
        assert_eq!(classify("MH2FL"), LabelCategory::JunctionConnector);
        assert_eq!(classify("FL2MH"), LabelCategory::JunctionConnector);
        assert_eq!(classify("FTL2FL"), LabelCategory::JunctionConnector);
    }

    #[test]
    fn test_ground_and_splice() {
        assert_eq!(classify("G101(a)"), LabelCategory::GroundConnector);
        assert_eq!(classify("GE_12(b)"), LabelCategory::GroundConnector);
        assert_eq!(classify("SP082"), LabelCategory::SpliceId);
        assert_eq!(classify("SP_CUSTOM_001"), LabelCategory::SpliceId);
        assert!(is_splice_id("SP7"));
        assert!(!is_splice_id("SPX7"));
    }

    #[test]
    fn test_wire_specs() {
        assert_eq!(classify("0.35,GY/PU"), LabelCategory::WireSpec);
        assert_eq!(classify("4.0,PU"), LabelCategory::WireSpec);
        // four-letter shielded color codes
        assert_eq!(classify("0.5,BUDK"), LabelCategory::WireSpec);
        assert_eq!(classify("0.5,G"), LabelCategory::Unrecognized);
        assert_eq!(
            parse_wire_spec("0.35,GY/PU"),
            Some(("0.35".to_string(), "GY/PU".to_string()))
        );
        assert_eq!(parse_wire_spec("MH097"), None);
        // leading-dot diameters
        assert_eq!(classify(".5,RD"), LabelCategory::WireSpec);
        assert_eq!(parse_wire_spec(".5,RD"), Some((".5".to_string(), "RD".to_string())));
        assert_eq!(classify("5.,RD"), LabelCategory::Unrecognized);
    }

    #[test]
    fn test_pins() {
        assert_eq!(classify("7"), LabelCategory::PinNumber);
        assert_eq!(classify("12-13"), LabelCategory::DashPin);
        assert!(classify("12-13").is_pin());
        assert_eq!(classify("Seat Memory"), LabelCategory::Unrecognized);
        assert_eq!(classify(""), LabelCategory::Unrecognized);
    }

    #[test]
    fn test_compound_labels() {
        assert_eq!(classify("MAIN202 (XR-)"), LabelCategory::ConnectorId);
        assert_eq!(
            classify("MAIN202 (XR-)\nMAIN642 (XR+)"),
            LabelCategory::ConnectorId
        );
        assert_eq!(classify("MAIN202\nsome note"), LabelCategory::Unrecognized);
    }

    #[test]
    fn test_junction_variants() {
        assert_eq!(junction_variant("FL2MH", "FL"), Some(JunctionVariant::Source));
        assert_eq!(junction_variant("MH2FL", "FL"), Some(JunctionVariant::Destination));
        assert_eq!(junction_variant("MH2AB", "FL"), None);
        assert_eq!(junction_variant("MH097", "FL"), None);
        assert!(is_junction_mirror("FL2MH", "MH2FL"));
        assert!(!is_junction_mirror("FL2MH", "FL2MH"));
    }

    #[test]
    fn test_categories_are_exclusive() {
        for text in ["MH2FL", "G1(a)", "SP1", "1.5,RD", "AB12", "3", "3-4", "?"] {
            let category = classify(text);
            let flags = [
                category.is_connector() && category != LabelCategory::GroundConnector,
                category == LabelCategory::SpliceId,
                category == LabelCategory::WireSpec,
            ];
            assert!(flags.iter().filter(|f| **f).count() <= 1, "{}", text);
        }
    }
}
