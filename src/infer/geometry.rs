//! Route geometry classification
//!
//! Turns path commands and polyline vertices into absolute point lists and
//! decides which kind of wire route they draw. Also extracts the colored
//! horizontal runs and dashed vertical columns used by the color-based
//! strategies.

use super::types::{Geometry, Path, Point};

/// Below this delta a segment counts as axis-aligned
pub const AXIS_TOLERANCE: f32 = 5.0;

/// Tolerance for colored runs and dashed columns, which are drawn exactly
const STRAIGHT_RUN_TOLERANCE: f32 = 1.0;

/// One SVG path drawing command. Coordinates are relative when `relative`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo { relative: bool, to: Point },
    LineTo { relative: bool, to: Point },
    Horizontal { relative: bool, x: f32 },
    Vertical { relative: bool, y: f32 },
    CubicTo { relative: bool, ctrl1: Point, ctrl2: Point, to: Point },
    SmoothCubicTo { relative: bool, ctrl2: Point, to: Point },
    QuadTo { relative: bool, ctrl: Point, to: Point },
    SmoothQuadTo { relative: bool, to: Point },
    Arc {
        relative: bool,
        rx: f32,
        ry: f32,
        rotation: f32,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    Close,
}

impl PathCommand {
    pub fn is_finite(&self) -> bool {
        let finite = |p: &Point| p.x.is_finite() && p.y.is_finite();
        match self {
            Self::MoveTo { to, .. } | Self::LineTo { to, .. } | Self::SmoothQuadTo { to, .. } => {
                finite(to)
            }
            Self::Horizontal { x, .. } => x.is_finite(),
            Self::Vertical { y, .. } => y.is_finite(),
            Self::CubicTo { ctrl1, ctrl2, to, .. } => finite(ctrl1) && finite(ctrl2) && finite(to),
            Self::SmoothCubicTo { ctrl2, to, .. } => finite(ctrl2) && finite(to),
            Self::QuadTo { ctrl, to, .. } => finite(ctrl) && finite(to),
            Self::Arc { rx, ry, rotation, to, .. } => {
                rx.is_finite() && ry.is_finite() && rotation.is_finite() && finite(to)
            }
            Self::Close => true,
        }
    }

    /// Absolute end point of this command given the current point
    fn end_point(&self, current: Point, subpath_start: Point) -> Point {
        let resolve = |relative: bool, to: Point| {
            if relative {
                Point::new(current.x + to.x, current.y + to.y)
            } else {
                to
            }
        };
        match *self {
            Self::MoveTo { relative, to }
            | Self::LineTo { relative, to }
            | Self::CubicTo { relative, to, .. }
            | Self::SmoothCubicTo { relative, to, .. }
            | Self::QuadTo { relative, to, .. }
            | Self::SmoothQuadTo { relative, to }
            | Self::Arc { relative, to, .. } => resolve(relative, to),
            Self::Horizontal { relative, x } => {
                Point::new(if relative { current.x + x } else { x }, current.y)
            }
            Self::Vertical { relative, y } => {
                Point::new(current.x, if relative { current.y + y } else { y })
            }
            Self::Close => subpath_start,
        }
    }
}

/// Absolute vertices visited by a path, one per command end point
pub fn trace_points(commands: &[PathCommand]) -> Vec<Point> {
    let mut points = Vec::with_capacity(commands.len());
    let mut current = Point::new(0.0, 0.0);
    let mut subpath_start = current;

    for command in commands {
        let next = command.end_point(current, subpath_start);
        match command {
            PathCommand::MoveTo { .. } => subpath_start = next,
            PathCommand::Close if next == current => continue,
            _ => {}
        }
        points.push(next);
        current = next;
    }
    points
}

/// Number of drawing commands that move the pen vertically
pub fn vertical_command_count(commands: &[PathCommand]) -> usize {
    let mut count = 0;
    let mut current = Point::new(0.0, 0.0);
    let mut subpath_start = current;

    for command in commands {
        let next = command.end_point(current, subpath_start);
        match command {
            PathCommand::MoveTo { .. } => subpath_start = next,
            PathCommand::Vertical { .. } if next.y != current.y => count += 1,
            _ if (next.y - current.y).abs() >= AXIS_TOLERANCE => count += 1,
            _ => {}
        }
        current = next;
    }
    count
}

/// Straight piece between two consecutive route vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn is_horizontal(&self) -> bool {
        (self.end.y - self.start.y).abs() < AXIS_TOLERANCE
    }

    pub fn is_vertical(&self) -> bool {
        (self.end.x - self.start.x).abs() < AXIS_TOLERANCE
    }

    pub fn length(&self) -> f32 {
        self.start.distance(&self.end)
    }

    pub fn min_x(&self) -> f32 {
        self.start.x.min(self.end.x)
    }

    pub fn max_x(&self) -> f32 {
        self.start.x.max(self.end.x)
    }

    pub fn mid(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    /// Whether `p` lies on this axis-aligned segment: within `across` of the
    /// line and strictly inside its span
    pub fn carries(&self, p: Point, across: f32) -> bool {
        if self.is_horizontal() {
            (p.y - self.start.y).abs() < across && self.min_x() < p.x && p.x < self.max_x()
        } else if self.is_vertical() {
            let (lo, hi) = (self.start.y.min(self.end.y), self.start.y.max(self.end.y));
            (p.x - self.start.x).abs() < across && lo < p.y && p.y < hi
        } else {
            false
        }
    }
}

/// Role a route plays on the diagram
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteShape {
    /// Horizontal-only path, already covered by the horizontal strategy
    HorizontalRun,
    Straight,
    /// Exactly one vertical leg
    LShaped,
    /// Four points H-V-H
    Rectangular,
    /// More than two vertices, possibly fanning out through splices
    MultiSegment,
}

/// A classified route with its absolute vertices (always at least two)
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub shape: RouteShape,
    pub points: Vec<Point>,
}

impl Route {
    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Vertices between the two endpoints
    pub fn interior(&self) -> &[Point] {
        &self.points[1..self.points.len() - 1]
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.points.windows(2).map(|w| Segment::new(w[0], w[1]))
    }

    pub fn horizontal_segments(&self) -> Vec<Segment> {
        self.segments().filter(Segment::is_horizontal).collect()
    }

    /// All horizontal segments sharing the maximal length
    pub fn longest_horizontal_segments(&self) -> Vec<Segment> {
        let horizontal = self.horizontal_segments();
        let max = horizontal
            .iter()
            .map(|s| (s.end.x - s.start.x).abs())
            .fold(0.0f32, f32::max);
        horizontal
            .into_iter()
            .filter(|s| (s.end.x - s.start.x).abs() == max)
            .collect()
    }
}

fn is_rectangular(points: &[Point]) -> bool {
    points.len() == 4
        && (points[0].y - points[1].y).abs() < AXIS_TOLERANCE
        && (points[1].x - points[2].x).abs() < AXIS_TOLERANCE
        && (points[2].y - points[3].y).abs() < AXIS_TOLERANCE
}

fn rectangular(points: Vec<Point>) -> Route {
    Route {
        shape: RouteShape::Rectangular,
        points,
    }
}

/// Classify polyline vertices. Fewer than two points is malformed.
pub fn classify_polyline(points: &[Point]) -> Option<Route> {
    if points.len() < 2 {
        return None;
    }
    let points = points.to_vec();
    if is_rectangular(&points) {
        return Some(rectangular(points));
    }
    let shape = if points.len() == 2 {
        RouteShape::Straight
    } else {
        RouteShape::MultiSegment
    };
    Some(Route { shape, points })
}

/// Classify a path by its commands
pub fn classify_path(commands: &[PathCommand]) -> Option<Route> {
    let points = trace_points(commands);
    if points.len() < 2 {
        return None;
    }
    let vertical = vertical_command_count(commands);
    if vertical == 0 {
        return Some(Route {
            shape: RouteShape::HorizontalRun,
            points,
        });
    }
    if is_rectangular(&points) {
        return Some(rectangular(points));
    }
    let shape = if vertical == 1 {
        RouteShape::LShaped
    } else if points.len() == 2 {
        RouteShape::Straight
    } else {
        RouteShape::MultiSegment
    };
    Some(Route { shape, points })
}

/// First pen position of a path
pub fn start_point(commands: &[PathCommand]) -> Option<Point> {
    match commands.first()? {
        PathCommand::MoveTo { to, .. } => Some(*to),
        _ => None,
    }
}

/// Horizontal wire run drawn in a wire color
#[derive(Debug, Clone, PartialEq)]
pub struct ColoredRun {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub color: String,
}

/// Vertical dashed column of a grid routing diagram
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashedColumn {
    pub x: f32,
    pub y1: f32,
    pub y2: f32,
}

fn path_extent(path: &Path) -> Option<(Point, Point)> {
    let points = trace_points(&path.commands);
    let first = *points.first()?;
    let (min, max) = points.iter().fold((first, first), |(min, max), p| {
        (
            Point::new(min.x.min(p.x), min.y.min(p.y)),
            Point::new(max.x.max(p.x), max.y.max(p.y)),
        )
    });
    Some((min, max))
}

/// Colored horizontal runs from lines and single-row paths.
///
/// `color_of` maps a style class to a wire color code.
pub fn colored_runs<F>(geometry: &Geometry, color_of: F) -> Vec<ColoredRun>
where
    F: Fn(&str) -> Option<String>,
{
    let mut runs = Vec::new();

    for line in &geometry.line_segments {
        let Some(color) = line.color_class.as_deref().and_then(&color_of) else {
            continue;
        };
        if (line.y1 - line.y2).abs() < STRAIGHT_RUN_TOLERANCE {
            runs.push(ColoredRun {
                x1: line.x1.min(line.x2),
                x2: line.x1.max(line.x2),
                y: (line.y1 + line.y2) / 2.0,
                color,
            });
        }
    }

    for path in &geometry.paths {
        let Some(color) = path.class.as_deref().and_then(&color_of) else {
            continue;
        };
        let Some((min, max)) = path_extent(path) else {
            continue;
        };
        if max.y - min.y < STRAIGHT_RUN_TOLERANCE && max.x > min.x {
            runs.push(ColoredRun {
                x1: min.x,
                x2: max.x,
                y: (min.y + max.y) / 2.0,
                color,
            });
        }
    }
    runs
}

/// Vertical dashed columns drawn with one of `classes`
pub fn dashed_columns(geometry: &Geometry, classes: &[String]) -> Vec<DashedColumn> {
    let is_dashed = |class: Option<&str>| class.is_some_and(|c| classes.iter().any(|d| d == c));
    let mut columns = Vec::new();

    for line in &geometry.line_segments {
        if is_dashed(line.color_class.as_deref())
            && (line.x1 - line.x2).abs() < STRAIGHT_RUN_TOLERANCE
        {
            columns.push(DashedColumn {
                x: line.x1,
                y1: line.y1.min(line.y2),
                y2: line.y1.max(line.y2),
            });
        }
    }
    for path in &geometry.paths {
        if !is_dashed(path.class.as_deref()) {
            continue;
        }
        if let Some((min, max)) = path_extent(path) {
            if max.x - min.x < STRAIGHT_RUN_TOLERANCE && max.y > min.y {
                columns.push(DashedColumn {
                    x: min.x,
                    y1: min.y,
                    y2: max.y,
                });
            }
        }
    }
    columns
}
