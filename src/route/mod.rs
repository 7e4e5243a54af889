mod avoid;
mod builders;
mod collide;
mod scene;
mod strategy;

pub use collide::{path_intersects_rect, segment_intersects_rect};
pub use scene::{SceneComplexity, SceneReport};
pub use strategy::PathStrategy;

use serde::{Deserialize, Serialize};

use crate::config::RouterConfig;
use crate::geom::{Point, PortDirection, Rect, POINT_EPSILON};

/// A resolved port: world position, facing direction, and the bounds of the
/// node the port sits on (`Rect::EMPTY` when unknown).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortRef {
    pub point: Point,
    pub direction: PortDirection,
    pub node: Rect,
}

impl PortRef {
    pub fn new(point: Point, direction: PortDirection, node: Rect) -> Self {
        Self {
            point,
            direction,
            node,
        }
    }

    /// Port with no known owning node.
    pub fn detached(point: Point, direction: PortDirection) -> Self {
        Self::new(point, direction, Rect::EMPTY)
    }
}

/// Everything the pipeline needs to route one connector. The target point is
/// the arrow-tail position; the arrow tip is recovered for [`ArrowPose`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteQuery {
    pub source: PortRef,
    pub target: PortRef,
}

impl RouteQuery {
    pub fn new(source: PortRef, target: PortRef) -> Self {
        Self { source, target }
    }

    pub fn dx(&self) -> f64 {
        self.target.point.x - self.source.point.x
    }

    pub fn dy(&self) -> f64 {
        self.target.point.y - self.source.point.y
    }
}

/// Whether the avoidance budget sufficed. A `Degraded` path may still cross
/// an obstacle; it is always returned rather than failing the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteQuality {
    Clean,
    Degraded,
}

/// Arrowhead placement: tip position plus a fixed angle in degrees
/// (0 points right, 90 down, 180 left, 270 up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowPose {
    pub position: Point,
    pub angle_degrees: f64,
}

impl ArrowPose {
    /// Recover the tip from the path's final point (the arrow tail) by
    /// stepping back toward the node; the angle depends only on the target
    /// port's facing direction, never on the final segment.
    pub fn for_target(tail: Point, direction: PortDirection, arrow_length: f64) -> Self {
        let position = tail.sub(direction.unit().scale(arrow_length));
        let angle_degrees = match direction {
            PortDirection::Left => 0.0,
            PortDirection::Top => 90.0,
            PortDirection::Right => 180.0,
            PortDirection::Bottom => 270.0,
        };
        Self {
            position,
            angle_degrees,
        }
    }
}

/// A routed connector: the orthogonal polyline, the strategy that produced
/// its draft, the post-avoidance quality, and the arrowhead pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedPath {
    pub points: Vec<Point>,
    pub strategy: PathStrategy,
    pub quality: RouteQuality,
    pub arrow: ArrowPose,
}

/// Which endpoint of the current query an obstacle rectangle belongs to.
/// Drives avoidance margins and the classifier's relevant-obstacle filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ObstacleRole {
    Source,
    Target,
    Other,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Obstacle {
    pub(crate) rect: Rect,
    pub(crate) role: ObstacleRole,
}

/// Tag each non-empty obstacle rect with its role for this query. Rects not
/// matching either endpoint's node grow by the configured obstacle margin;
/// the endpoint nodes keep their raw bounds because the avoider applies
/// role-scaled margins to them instead.
pub(crate) fn collect_obstacles(
    query: &RouteQuery,
    rects: &[Rect],
    config: &RouterConfig,
) -> Vec<Obstacle> {
    let mut obstacles = Vec::with_capacity(rects.len());
    for rect in rects {
        if rect.is_empty() {
            continue;
        }
        let role = if rect.approx_eq(&query.source.node) {
            ObstacleRole::Source
        } else if rect.approx_eq(&query.target.node) {
            ObstacleRole::Target
        } else {
            ObstacleRole::Other
        };
        let rect = match role {
            ObstacleRole::Other => rect.expand(config.obstacle_margin),
            _ => *rect,
        };
        obstacles.push(Obstacle { rect, role });
    }
    obstacles
}

/// Drop consecutive duplicates and merge collinear runs. Builders emit stub
/// points that degenerate when the ports happen to align; rendering wants
/// the minimal polyline. Output always keeps at least two points, even for
/// coincident ports.
fn compress(points: Vec<Point>) -> Vec<Point> {
    if points.len() <= 2 {
        return points;
    }
    let tail = points[points.len() - 1];
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if let Some(last) = out.last() {
            if last.approx_eq(point) {
                continue;
            }
        }
        while out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            let same_column =
                (a.x - b.x).abs() < POINT_EPSILON && (b.x - point.x).abs() < POINT_EPSILON;
            let same_row =
                (a.y - b.y).abs() < POINT_EPSILON && (b.y - point.y).abs() < POINT_EPSILON;
            if same_column || same_row {
                out.pop();
            } else {
                break;
            }
        }
        out.push(point);
    }
    if out.len() < 2 {
        out.push(tail);
    }
    out
}

/// Route one connector: classify the scene, pick a strategy, build the draft
/// polyline, repair collisions, and attach the arrowhead pose.
pub fn route_path(query: &RouteQuery, obstacle_rects: &[Rect], config: &RouterConfig) -> RoutedPath {
    let obstacles = collect_obstacles(query, obstacle_rects, config);
    let report = scene::classify(query, &obstacles, config);
    let strategy = strategy::select_strategy(query, &report, &obstacles, config);
    let draft = builders::build_path(strategy, query, config);
    let (points, quality) = avoid::avoid_obstacles(draft, query, &obstacles, config);
    let points = compress(points);
    let arrow = ArrowPose::for_target(
        query.target.point,
        query.target.direction,
        config.arrow_length,
    );
    RoutedPath {
        points,
        strategy,
        quality,
        arrow,
    }
}
