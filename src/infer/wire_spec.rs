//! Wire spec attribution
//!
//! Specs are printed just above the wire they describe. Horizontal wires look
//! specs up by line group; routed wires look for a spec sitting above one of
//! their horizontal legs.

use indexmap::IndexMap;

use super::geometry::{Route, RouteShape, Segment};
use super::rules::InferenceRules;
use super::types::{Point, WireSpec};

/// Item with the smallest key. Ties keep the earliest.
fn min_by_key<T, F>(items: impl IntoIterator<Item = T>, key: F) -> Option<T>
where
    F: Fn(&T) -> f32,
{
    let mut best: Option<(T, f32)> = None;
    for item in items {
        let k = key(&item);
        match &best {
            Some((_, current)) if k >= *current => {}
            _ => best = Some((item, k)),
        }
    }
    best.map(|(item, _)| item)
}

/// Wire specs sharing one horizontal line bucket
#[derive(Debug, Clone)]
pub struct SpecGroup<'s> {
    specs: Vec<&'s WireSpec>,
}

impl<'s> SpecGroup<'s> {
    pub fn specs(&self) -> &[&'s WireSpec] {
        &self.specs
    }

    /// Whether `y` lies strictly within `tolerance` of any spec in the group
    pub fn contains_y(&self, y: f32, tolerance: f32) -> bool {
        self.specs.iter().any(|s| (y - s.y).abs() < tolerance)
    }

    /// Vertical distance from `y` to the nearest spec of the group
    pub fn nearest_dy(&self, y: f32) -> f32 {
        self.specs
            .iter()
            .map(|s| (y - s.y).abs())
            .fold(f32::INFINITY, f32::min)
    }

    /// Specs strictly between two X positions
    pub fn between(&self, a: f32, b: f32) -> impl Iterator<Item = &'s WireSpec> + '_ {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.specs
            .iter()
            .copied()
            .filter(move |s| lo < s.x && s.x < hi)
    }

    pub fn has_between(&self, a: f32, b: f32) -> bool {
        self.between(a, b).next().is_some()
    }

    pub fn has_near_x(&self, x: f32, reach: f32) -> bool {
        self.specs.iter().any(|s| (s.x - x).abs() < reach)
    }

    /// Spec for the wire between two points: specs between them in X are
    /// preferred, then the one closest to the pair's average Y
    pub fn for_pair(&self, left: Point, right: Point) -> Option<&'s WireSpec> {
        let avg_y = (left.y + right.y) / 2.0;
        let between: Vec<&'s WireSpec> = self.between(left.x, right.x).collect();
        let pool = if between.is_empty() {
            self.specs.clone()
        } else {
            between
        };
        min_by_key(pool, |s| (s.y - avg_y).abs())
    }
}

/// Stateless spec lookup service shared by the strategies
#[derive(Clone, Copy)]
pub struct WireSpecLocator<'a> {
    specs: &'a [WireSpec],
    rules: &'a InferenceRules,
}

impl<'a> WireSpecLocator<'a> {
    pub fn new(specs: &'a [WireSpec], rules: &'a InferenceRules) -> Self {
        Self { specs, rules }
    }

    pub fn specs(&self) -> &'a [WireSpec] {
        self.specs
    }

    /// Specs bucketed by rounded line Y, in first-seen order
    pub fn groups(&self) -> Vec<SpecGroup<'a>> {
        let bucket = self.rules.spec_bucket;
        let mut lines: IndexMap<i64, Vec<&'a WireSpec>> = IndexMap::new();
        for spec in self.specs {
            let key = (spec.y / bucket).round() as i64;
            lines.entry(key).or_default().push(spec);
        }
        lines
            .into_values()
            .map(|specs| SpecGroup { specs })
            .collect()
    }

    /// Spec on the longest horizontal leg of a rectangular route
    pub fn for_rectangular(&self, route: &Route) -> Option<&'a WireSpec> {
        let legs = match route.shape {
            RouteShape::Rectangular => route.longest_horizontal_segments(),
            _ => return None,
        };
        let rules = self.rules;

        let candidates = legs.iter().flat_map(|leg| {
            let leg_y = (leg.start.y + leg.end.y) / 2.0;
            let (min_x, max_x) = (leg.min_x(), leg.max_x());
            self.specs.iter().filter_map(move |spec| {
                let dy = (spec.y - leg_y).abs();
                let on_leg = dy < rules.rect_spec_dy
                    && min_x - rules.rect_spec_margin < spec.x
                    && spec.x < max_x + rules.rect_spec_margin;
                on_leg.then_some((spec, dy))
            })
        });
        min_by_key(candidates, |(_, dy)| *dy).map(|(spec, _)| spec)
    }

    /// Spec printed above the leg of a route nearest to its source
    pub fn near_path(&self, points: &[Point], source: Option<Point>) -> Option<&'a WireSpec> {
        if points.len() < 2 {
            return None;
        }
        let legs: Vec<Segment> = points
            .windows(2)
            .map(|w| Segment::new(w[0], w[1]))
            .filter(Segment::is_horizontal)
            .collect();

        let target: Vec<Point> = source
            .and_then(|source| min_by_key(legs.iter(), |leg| leg.mid().distance(&source)))
            .or_else(|| legs.first())
            .map(|leg| vec![leg.start, leg.end])
            .unwrap_or_else(|| points.iter().take(3).copied().collect());

        let (span_min, span_max) = target.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.x), hi.max(p.x))
        });
        let above = self.rules.spec_above_max;

        let candidates = self
            .specs
            .iter()
            .filter(|spec| span_min < spec.x && spec.x < span_max)
            .flat_map(|spec| {
                target.iter().filter_map(move |p| {
                    let dy = spec.y - p.y;
                    (-above < dy && dy < 0.0).then(|| (spec, weighted_distance(spec.x - p.x, dy)))
                })
            });
        min_by_key(candidates, |(_, d)| *d)
            .filter(|(_, d)| *d < self.rules.spec_max_weighted_distance)
            .map(|(spec, _)| spec)
    }

    /// Spec for a wire from a pin to a ground connector
    pub fn for_ground(&self, pin: Point, ground: Point) -> Option<&'a WireSpec> {
        let (lo, hi) = if pin.x < ground.x {
            (pin.x, ground.x)
        } else {
            (ground.x, pin.x)
        };
        let above = self.rules.spec_above_max;

        let candidates = self.specs.iter().filter_map(|spec| {
            let dy = spec.y - ground.y;
            let placed = lo < spec.x && spec.x < hi && -above < dy && dy < 0.0;
            placed.then(|| (spec, weighted_distance(spec.x - pin.x, dy)))
        });
        min_by_key(candidates, |(_, d)| *d)
            .filter(|(_, d)| *d < self.rules.spec_max_weighted_distance)
            .map(|(spec, _)| spec)
    }
}

/// Distance that counts vertical offset double
fn weighted_distance(dx: f32, dy: f32) -> f32 {
    (dx * dx + (2.0 * dy) * (2.0 * dy)).sqrt()
}
