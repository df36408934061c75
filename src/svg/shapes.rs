//! Lines, polylines, paths and splice dots

use log::debug;

use super::paths::{cubic_command_count, parse_path_data};
use crate::infer::geometry::trace_points;
use crate::infer::{Dot, LineSegment, Path, Point, Polyline};
use crate::parse_xml::XmlNode;

/// Dot paths are short closed curves; longer data is decoration
const DOT_MAX_DATA_LEN: usize = 200;
const DOT_MIN_CUBICS: usize = 3;
/// Per-point Manhattan distance under which two polylines are one wire
const DUPLICATE_POLYLINE_TOLERANCE: f32 = 2.0;

fn class_of(node: &XmlNode) -> Option<String> {
    node.attr("class")
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

fn float_attr(node: &XmlNode, key: &str) -> Option<f32> {
    node.attr(key)?.trim().parse::<f32>().ok()
}

pub fn line_segment(node: &XmlNode) -> Option<LineSegment> {
    Some(LineSegment {
        x1: float_attr(node, "x1")?,
        y1: float_attr(node, "y1")?,
        x2: float_attr(node, "x2")?,
        y2: float_attr(node, "y2")?,
        color_class: class_of(node),
    })
}

/// Vertices of a `points` attribute. Odd or short coordinate lists are malformed.
pub fn parse_points(points: &str) -> Option<Vec<Point>> {
    let values: Vec<f32> = points
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse::<f32>)
        .collect::<Result<_, _>>()
        .ok()?;
    if values.len() < 4 || values.len() % 2 != 0 {
        return None;
    }
    Some(values.chunks(2).map(|c| Point::new(c[0], c[1])).collect())
}

pub fn polyline(node: &XmlNode) -> Option<Polyline> {
    let points = parse_points(node.attr("points")?)?;
    Some(Polyline {
        class: class_of(node),
        points,
    })
}

fn near_duplicate(a: &Polyline, b: &Polyline) -> bool {
    a.points.len() == b.points.len()
        && a.points.iter().zip(&b.points).all(|(p, q)| {
            (p.x - q.x).abs() + (p.y - q.y).abs() <= DUPLICATE_POLYLINE_TOLERANCE
        })
}

/// Drop outline copies of polylines already in the list
pub fn dedup_polylines(polylines: Vec<Polyline>) -> Vec<Polyline> {
    let mut kept: Vec<Polyline> = Vec::with_capacity(polylines.len());
    for polyline in polylines {
        if kept.iter().any(|k| near_duplicate(k, &polyline)) {
            continue;
        }
        kept.push(polyline);
    }
    kept
}

pub fn circle_dot(node: &XmlNode) -> Option<Dot> {
    Some(Dot {
        cx: float_attr(node, "cx")?,
        cy: float_attr(node, "cy")?,
        radius: float_attr(node, "r").unwrap_or(0.0),
    })
}

/// A `<path>` element is either a splice dot or a drawn route
pub enum PathShape {
    Dot(Dot),
    Route(Path),
}

pub fn path_shape(node: &XmlNode) -> Option<PathShape> {
    let data = node.attr("d")?.trim();
    if data.is_empty() {
        return None;
    }
    let commands = match parse_path_data(data) {
        Ok(commands) => commands,
        Err(e) => {
            debug!("skipping path with unparseable data: {}", e);
            return None;
        }
    };
    let class = class_of(node);

    if class.is_none() && data.len() < DOT_MAX_DATA_LEN && cubic_command_count(data) >= DOT_MIN_CUBICS {
        let points = trace_points(&commands);
        let first = *points.first()?;
        let (min, max) = points.iter().fold((first, first), |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            )
        });
        return Some(PathShape::Dot(Dot {
            cx: (min.x + max.x) / 2.0,
            cy: (min.y + max.y) / 2.0,
            radius: (max.x - min.x).max(max.y - min.y) / 2.0,
        }));
    }
    Some(PathShape::Route(Path { class, commands }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_xml::parse_xml_str;

    #[test]
    fn test_points_attribute() {
        let points = parse_points("10,20 30,20 30 40").unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2], Point::new(30.0, 40.0));
        assert!(parse_points("10,20 30").is_none());
        assert!(parse_points("10,20").is_none());
        assert!(parse_points("a,b c,d").is_none());
    }

    #[test]
    fn test_outline_copies_are_dropped() {
        let line = |dy: f32| Polyline {
            class: None,
            points: vec![Point::new(0.0, dy), Point::new(0.0, 100.0 + dy)],
        };
        let kept = dedup_polylines(vec![line(0.0), line(1.0), line(5.0)]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_cubic_circle_is_a_dot() {
        let node = parse_xml_str(r#"<path d="M100,98c1.1,0,2,0.9,2,2c0,1.1-0.9,2-2,2c-1.1,0-2-0.9-2-2c0-1.1,0.9-2,2-2z"/>"#).unwrap();
        match path_shape(&node) {
            Some(PathShape::Dot(dot)) => {
                assert_eq!(dot.cx, 100.0);
                assert_eq!(dot.cy, 100.0);
            }
            _ => panic!("expected a dot"),
        }

        let styled = parse_xml_str(r#"<path class="st17" d="M100,98c1.1,0,2,0.9,2,2c0,1.1-0.9,2-2,2c-1.1,0-2-0.9-2-2c0-1.1,0.9-2,2-2z"/>"#).unwrap();
        assert!(matches!(path_shape(&styled), Some(PathShape::Route(_))));
    }
}
