//! Spatial indexing of labels
//!
//! Wraps the working label set in an R-tree so radius and box lookups do not
//! scan every label. Results are ordered by distance, then by input order,
//! which keeps tie-breaks identical to a linear scan.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use super::labels::LabelCategory;
use super::types::{Label, Point};

/// Label position entry stored in the R-tree
#[derive(Clone, Debug)]
pub struct IndexedLabel {
    pub index: usize,
    position: [f32; 2],
}

impl RTreeObject for IndexedLabel {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedLabel {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Immutable label set with an R-tree over label positions
#[derive(Debug)]
pub struct LabelIndex {
    labels: Vec<Label>,
    tree: RTree<IndexedLabel>,
}

impl LabelIndex {
    pub fn new(labels: Vec<Label>) -> Self {
        let entries = labels
            .iter()
            .enumerate()
            .map(|(index, label)| IndexedLabel {
                index,
                position: [label.x, label.y],
            })
            .collect();
        Self {
            labels,
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn by_category(&self, category: LabelCategory) -> impl Iterator<Item = &Label> {
        self.labels.iter().filter(move |l| l.category() == category)
    }

    /// Labels strictly closer than `radius`, nearest first
    pub fn within(&self, center: Point, radius: f32) -> Vec<(&Label, f32)> {
        let query = [center.x, center.y];
        let mut hits: Vec<(usize, f32)> = self
            .tree
            .locate_within_distance(query, radius * radius)
            .map(|entry| (entry.index, entry.distance_2(&query).sqrt()))
            .filter(|(_, distance)| *distance < radius)
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits.into_iter()
            .map(|(index, distance)| (&self.labels[index], distance))
            .collect()
    }

    /// Nearest label strictly within `radius` that satisfies `accept`
    pub fn nearest_where<F>(&self, center: Point, radius: f32, accept: F) -> Option<(&Label, f32)>
    where
        F: Fn(&Label) -> bool,
    {
        self.within(center, radius)
            .into_iter()
            .find(|(label, _)| accept(label))
    }

    /// Labels inside an axis-aligned box (inclusive), in input order
    pub fn in_box(&self, min: Point, max: Point) -> Vec<&Label> {
        let envelope = AABB::from_corners([min.x, min.y], [max.x, max.y]);
        let mut indices: Vec<usize> = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|entry| entry.index)
            .collect();
        indices.sort_unstable();
        indices.into_iter().map(|i| &self.labels[i]).collect()
    }

    /// Bounding box of labels matching `accept`, grown by `margin`
    pub fn bounds_where<F>(&self, margin: f32, accept: F) -> Option<(Point, Point)>
    where
        F: Fn(&Label) -> bool,
    {
        let mut matching = self.labels.iter().filter(|l| accept(l));
        let first = matching.next()?;
        let (mut min, mut max) = (first.position(), first.position());
        for label in matching {
            min = Point::new(min.x.min(label.x), min.y.min(label.y));
            max = Point::new(max.x.max(label.x), max.y.max(label.y));
        }
        Some((
            Point::new(min.x - margin, min.y - margin),
            Point::new(max.x + margin, max.y + margin),
        ))
    }
}
