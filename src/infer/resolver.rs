//! Connector resolution
//!
//! Finds the connector label that governs a pin. Connectors are drawn above
//! their pins, so candidates must clear the pin vertically and stay within a
//! horizontal window that is wider for junction symbols.

use super::labels::{is_junction_mirror, junction_variant, JunctionVariant, LabelCategory};
use super::rules::InferenceRules;
use super::spatial::LabelIndex;
use super::types::{ConnectionPoint, Label, Point};

/// Closest candidates searched for a mirrored junction pair
const JUNCTION_PAIR_WINDOW: usize = 3;

/// Connector chosen for a pin
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConnector {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

impl ResolvedConnector {
    fn from_label(label: &Label) -> Self {
        Self {
            id: label.content().to_string(),
            x: label.x,
            y: label.y,
        }
    }
}

struct Candidate<'l> {
    label: &'l Label,
    distance: f32,
    dy: f32,
}

#[derive(Clone, Copy)]
pub struct ConnectorResolver<'a> {
    index: &'a LabelIndex,
    rules: &'a InferenceRules,
}

impl<'a> ConnectorResolver<'a> {
    pub fn new(index: &'a LabelIndex, rules: &'a InferenceRules) -> Self {
        Self { index, rules }
    }

    pub fn labels(&self) -> &'a LabelIndex {
        self.index
    }

    fn variant(&self, id: &str) -> Option<JunctionVariant> {
        junction_variant(id, &self.rules.junction_hub)
    }

    /// Connector-like labels above `pin` that pass the distance gates,
    /// ranked by Euclidean distance
    fn candidates(&self, pin: Point) -> Vec<Candidate<'a>> {
        let rules = self.rules;
        let reach = rules.junction_max_dx.max(rules.connector_max_dx);
        let area = self.index.in_box(
            Point::new(pin.x - reach, f32::MIN),
            Point::new(pin.x + reach, pin.y - rules.pin_clearance),
        );

        let mut found: Vec<Candidate<'a>> = area
            .into_iter()
            .filter(|label| label.category().is_connector())
            .filter_map(|label| {
                let dy = pin.y - label.y;
                let max_dx = if label.category() == LabelCategory::JunctionConnector {
                    rules.junction_max_dx
                } else {
                    rules.connector_max_dx
                };
                if dy > rules.pin_clearance && (label.x - pin.x).abs() < max_dx {
                    Some(Candidate {
                        label,
                        distance: label.position().distance(&pin),
                        dy,
                    })
                } else {
                    None
                }
            })
            .collect();
        found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        found
    }

    /// Destination lookups promote connectors standing between the source
    /// and the pin, as long as they are close enough vertically
    fn promote_between(&self, ranked: &mut Vec<Candidate<'a>>, pin_x: f32, source_x: f32) {
        let (lo, hi) = if source_x < pin_x {
            (source_x, pin_x)
        } else {
            (pin_x, source_x)
        };
        let max_dy = self.rules.between_max_dy;
        let (between, others): (Vec<_>, Vec<_>) = ranked
            .drain(..)
            .partition(|c| lo < c.label.x && c.label.x < hi && c.dy < max_dy);
        ranked.extend(between);
        ranked.extend(others);
    }

    /// Nearest candidate, unless a mirrored junction pair (`FL2MH` and
    /// `MH2FL`) is among the closest few; then the preferred side of the
    /// pair wins. `forbidden` variants are never returned.
    fn pick(
        &self,
        ranked: &[Candidate<'a>],
        preferred: JunctionVariant,
        forbidden: Option<JunctionVariant>,
    ) -> Option<ResolvedConnector> {
        let top = &ranked[..ranked.len().min(JUNCTION_PAIR_WINDOW)];
        let paired = top.iter().find(|c| {
            self.variant(c.label.content()) == Some(preferred)
                && top
                    .iter()
                    .any(|other| is_junction_mirror(c.label.content(), other.label.content()))
        });
        paired
            .or_else(|| {
                ranked.iter().find(|c| {
                    forbidden.map_or(true, |f| self.variant(c.label.content()) != Some(f))
                })
            })
            .map(|c| ResolvedConnector::from_label(c.label))
    }

    /// Governing connector of the pin at `pin`.
    ///
    /// `prefer_as_source` selects which junction variant wins when both sides
    /// of a junction pair sit above the pin. `source_x` enables between
    /// promotion for destination lookups.
    pub fn resolve_above(
        &self,
        pin: Point,
        prefer_as_source: bool,
        source_x: Option<f32>,
    ) -> Option<ResolvedConnector> {
        let mut ranked = self.candidates(pin);
        if !prefer_as_source {
            if let Some(source_x) = source_x {
                self.promote_between(&mut ranked, pin.x, source_x);
            }
        }
        let preferred = if prefer_as_source {
            JunctionVariant::Source
        } else {
            JunctionVariant::Destination
        };
        self.pick(&ranked, preferred, None)
    }

    /// Like [`resolve_above`](Self::resolve_above), but never returns a
    /// junction variant that is invalid for the requested direction
    pub fn resolve_directed(
        &self,
        pin: Point,
        as_source: bool,
        source_x: Option<f32>,
    ) -> Option<ResolvedConnector> {
        let (preferred, forbidden) = if as_source {
            (JunctionVariant::Source, JunctionVariant::Destination)
        } else {
            (JunctionVariant::Destination, JunctionVariant::Source)
        };
        let mut ranked = self.candidates(pin);
        if !as_source {
            if let Some(source_x) = source_x {
                self.promote_between(&mut ranked, pin.x, source_x);
            }
        }
        self.pick(&ranked, preferred, Some(forbidden))
    }

    /// Every candidate connector above the pin, nearest vertically first
    pub fn connectors_above(&self, pin: Point) -> Vec<ResolvedConnector> {
        let mut ranked = self.candidates(pin);
        ranked.sort_by(|a, b| a.dy.total_cmp(&b.dy));
        ranked
            .into_iter()
            .map(|c| ResolvedConnector::from_label(c.label))
            .collect()
    }

    /// Nearest pin, splice or ground connector strictly within `max_distance`.
    ///
    /// Pins are reported with their governing connector; pins without one are
    /// passed over in favour of the next nearest endpoint.
    pub fn nearest_connection_point(&self, target: Point, max_distance: f32) -> Option<ConnectionPoint> {
        self.index
            .within(target, max_distance)
            .into_iter()
            .find_map(|(label, _)| self.endpoint_at(label))
    }

    /// Connection point for an endpoint label
    pub fn endpoint_at(&self, label: &Label) -> Option<ConnectionPoint> {
        match label.category() {
            LabelCategory::SpliceId | LabelCategory::GroundConnector => {
                Some(ConnectionPoint::at_label(label))
            }
            category if category.is_pin() => {
                let connector = self.resolve_above(label.position(), false, None)?;
                Some(ConnectionPoint::new(
                    connector.id,
                    label.content(),
                    label.x,
                    label.y,
                ))
            }
            _ => None,
        }
    }
}
