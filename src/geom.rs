use serde::{Deserialize, Serialize};

/// Tolerance for point equality; canvas coordinates are in pixels, so
/// anything below a thousandth of a pixel is noise.
pub const POINT_EPSILON: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Equality within [`POINT_EPSILON`] on both axes.
    pub fn approx_eq(&self, other: Point) -> bool {
        (self.x - other.x).abs() < POINT_EPSILON && (self.y - other.y).abs() < POINT_EPSILON
    }

    pub fn add(&self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(&self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    pub fn distance(&self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation along the segment `self -> other`.
    pub fn lerp(&self, other: Point, t: f64) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

/// Axis-aligned rectangle. `min.x <= max.x` and `min.y <= max.y`; the
/// all-zero rectangle doubles as the "no obstacle" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub const EMPTY: Rect = Rect {
        min: Point::new(0.0, 0.0),
        max: Point::new(0.0, 0.0),
    };

    /// Build from two arbitrary corners, normalizing the min/max order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Rect {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect::from_corners(Point::new(x, y), Point::new(x + width, y + height))
    }

    pub fn left(&self) -> f64 {
        self.min.x
    }

    pub fn top(&self) -> f64 {
        self.min.y
    }

    pub fn right(&self) -> f64 {
        self.max.x
    }

    pub fn bottom(&self) -> f64 {
        self.max.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() < POINT_EPSILON || self.height() < POINT_EPSILON
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Grow (or shrink, for negative margins) on all four sides.
    pub fn expand(&self, margin: f64) -> Rect {
        Rect::from_corners(
            Point::new(self.min.x - margin, self.min.y - margin),
            Point::new(self.max.x + margin, self.max.y + margin),
        )
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min.x, self.min.y),
            Point::new(self.max.x, self.min.y),
            Point::new(self.max.x, self.max.y),
            Point::new(self.min.x, self.max.y),
        ]
    }

    /// Rect equality within the point epsilon, used to recognize a node's
    /// own rectangle in an obstacle list.
    pub fn approx_eq(&self, other: &Rect) -> bool {
        self.min.approx_eq(other.min) && self.max.approx_eq(other.max)
    }
}

/// Closed polygon with a cached bounding box. The routing pipeline only ever
/// consults `bounds`; the full outline exists so shapes can later carry
/// non-rectangular geometry without changing the registry API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
    bounds: Rect,
}

impl Polygon {
    /// Panics if `points` is empty; a polygon has at least one vertex.
    pub fn new(points: Vec<Point>) -> Self {
        assert!(!points.is_empty(), "polygon requires at least one point");
        let bounds = Self::compute_bounds(&points);
        Self { points, bounds }
    }

    /// Four-corner polygon backing a rectangular shape.
    pub fn rectangle(rect: Rect) -> Self {
        Polygon::new(rect.corners().to_vec())
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        for point in &mut self.points {
            point.x += dx;
            point.y += dy;
        }
        self.bounds = Self::compute_bounds(&self.points);
    }

    pub fn set_points(&mut self, points: Vec<Point>) {
        assert!(!points.is_empty(), "polygon requires at least one point");
        self.points = points;
        self.bounds = Self::compute_bounds(&self.points);
    }

    pub fn centroid(&self) -> Point {
        let mut sum = Point::default();
        for point in &self.points {
            sum = sum.add(*point);
        }
        sum.scale(1.0 / self.points.len() as f64)
    }

    /// Ray-casting point-in-polygon test.
    pub fn contains(&self, point: Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = self.points[i];
            let pj = self.points[j];
            if (pi.y > point.y) != (pj.y > point.y)
                && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    fn compute_bounds(points: &[Point]) -> Rect {
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for point in points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        Rect {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        }
    }
}

/// Which side of a node a port sits on, which is also the direction the
/// connector leaves (or enters) the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Top,
    Bottom,
    Left,
    Right,
}

/// How two port directions relate; drives strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionRelation {
    Opposite,
    Perpendicular,
    Same,
}

impl PortDirection {
    pub fn is_horizontal(&self) -> bool {
        matches!(self, PortDirection::Left | PortDirection::Right)
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, PortDirection::Top | PortDirection::Bottom)
    }

    pub fn opposite(&self) -> PortDirection {
        match self {
            PortDirection::Top => PortDirection::Bottom,
            PortDirection::Bottom => PortDirection::Top,
            PortDirection::Left => PortDirection::Right,
            PortDirection::Right => PortDirection::Left,
        }
    }

    /// Unit step along the facing direction, in screen coordinates
    /// (y grows downward).
    pub fn unit(&self) -> Point {
        match self {
            PortDirection::Top => Point::new(0.0, -1.0),
            PortDirection::Bottom => Point::new(0.0, 1.0),
            PortDirection::Left => Point::new(-1.0, 0.0),
            PortDirection::Right => Point::new(1.0, 0.0),
        }
    }

    pub fn relation_to(&self, other: PortDirection) -> DirectionRelation {
        if *self == other {
            DirectionRelation::Same
        } else if self.opposite() == other {
            DirectionRelation::Opposite
        } else {
            DirectionRelation::Perpendicular
        }
    }
}
