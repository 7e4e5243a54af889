//! Iterative obstacle-avoidance post-processor.
//!
//! The draft path is scanned segment by segment; the first colliding segment
//! gets a detour spliced in, then the scan restarts from the top. Each
//! successful splice spends one unit of the iteration budget, so the loop
//! always terminates: a path the budget cannot repair is returned as-is and
//! flagged [`RouteQuality::Degraded`].
//!
//! Detour candidates run a ladder from cheapest to most disruptive:
//! 1. a channel on the side suggested by the source's position, at the
//!    role-scaled shape-preserving margin;
//! 2. a channel on the side the target port direction dictates, at the
//!    role-scaled strategy margin;
//! 3. channels on both sides at 1.5x the safe distance;
//! 4. a bypass through each corner of the expanded obstacle.
//! A candidate is accepted only when the spliced sub-path clears every
//! obstacle, so tight channels (margins under the clearance) reject
//! themselves and the ladder falls through to the wider detours.

use std::collections::HashSet;

use super::collide::segment_intersects_rect;
use super::{Obstacle, ObstacleRole, RouteQuality, RouteQuery};
use crate::config::RouterConfig;
use crate::geom::{Point, PortDirection, Rect};

pub(super) fn avoid_obstacles(
    mut path: Vec<Point>,
    query: &RouteQuery,
    obstacles: &[Obstacle],
    config: &RouterConfig,
) -> (Vec<Point>, RouteQuality) {
    if path.len() < 2 || obstacles.is_empty() {
        return (path, RouteQuality::Clean);
    }

    'passes: for _ in 0..config.max_avoidance_iterations {
        let mut skipped: HashSet<usize> = HashSet::new();
        loop {
            match first_collision(&path, obstacles, config, &skipped) {
                None if skipped.is_empty() => return (path, RouteQuality::Clean),
                // Only unrepairable collisions remain; more passes would
                // retry the exact same candidates.
                None => break 'passes,
                Some((segment, obstacle)) => {
                    match repair(&path, segment, &obstacle, query, obstacles, config) {
                        Some(detour) => {
                            path.splice(segment + 1..segment + 1, detour);
                            continue 'passes;
                        }
                        None => {
                            skipped.insert(segment);
                        }
                    }
                }
            }
        }
    }

    let clean = first_collision(&path, obstacles, config, &HashSet::new()).is_none();
    let quality = if clean {
        RouteQuality::Clean
    } else {
        RouteQuality::Degraded
    };
    (path, quality)
}

/// First (segment index, obstacle) pair in path order that collides.
fn first_collision(
    path: &[Point],
    obstacles: &[Obstacle],
    config: &RouterConfig,
    skipped: &HashSet<usize>,
) -> Option<(usize, Obstacle)> {
    let last = path.len() - 2;
    for i in 0..=last {
        if skipped.contains(&i) {
            continue;
        }
        for obstacle in obstacles {
            if exempted(obstacle, path[i], path[i + 1], i == 0, i == last, config.clearance) {
                continue;
            }
            if segment_intersects_rect(path[i], path[i + 1], &obstacle.rect, config.clearance) {
                return Some((i, *obstacle));
            }
        }
    }
    None
}

/// Own-node exemption. A port's boundary segment is never tested against its
/// own node, and neither is a segment starting (source) or ending (target)
/// inside the node's keep-out ring: the exit stub turns exactly `clearance`
/// past the node edge, which the inclusive containment test would otherwise
/// flag on every route between two real nodes.
fn exempted(
    obstacle: &Obstacle,
    start: Point,
    end: Point,
    first: bool,
    last: bool,
    clearance: f64,
) -> bool {
    match obstacle.role {
        ObstacleRole::Source => first || obstacle.rect.expand(clearance).contains(start),
        ObstacleRole::Target => last || obstacle.rect.expand(clearance).contains(end),
        ObstacleRole::Other => false,
    }
}

/// Try the candidate ladder for one colliding segment. Returns the interior
/// points to splice between the segment's endpoints, or `None` when every
/// candidate re-collides.
fn repair(
    path: &[Point],
    segment: usize,
    obstacle: &Obstacle,
    query: &RouteQuery,
    obstacles: &[Obstacle],
    config: &RouterConfig,
) -> Option<Vec<Point>> {
    let p1 = path[segment];
    let p2 = path[segment + 1];
    let last = path.len() - 2;
    let horizontal = (p2.y - p1.y).abs() <= (p2.x - p1.x).abs();

    for candidate in candidates(p1, p2, horizontal, obstacle, query, config) {
        if candidate_clear(
            &candidate,
            p1,
            p2,
            segment == 0,
            segment == last,
            obstacles,
            config,
        ) {
            return Some(candidate);
        }
    }
    None
}

/// Which side of the obstacle a detour channel runs on: the low-coordinate
/// side (above / left of the rect) or the high side (below / right).
#[derive(Clone, Copy)]
enum ChannelSide {
    Low,
    High,
}

fn candidates(
    p1: Point,
    p2: Point,
    horizontal: bool,
    obstacle: &Obstacle,
    query: &RouteQuery,
    config: &RouterConfig,
) -> Vec<Vec<Point>> {
    let rect = &obstacle.rect;
    let safe = config.node_safe_distance;
    let (shape_factor, strategy_factor) = match obstacle.role {
        ObstacleRole::Source => (2.0, 2.0),
        ObstacleRole::Target => (1.5, 1.5),
        ObstacleRole::Other => (0.7, 1.0),
    };

    let mut out = Vec::with_capacity(8);
    out.push(channel(
        p1,
        p2,
        horizontal,
        shape_side(query.source.point, rect, horizontal),
        rect,
        shape_factor * safe,
    ));
    out.push(channel(
        p1,
        p2,
        horizontal,
        strategy_side(query.target.direction, horizontal),
        rect,
        strategy_factor * safe,
    ));
    for side in [ChannelSide::Low, ChannelSide::High] {
        out.push(channel(p1, p2, horizontal, side, rect, 1.5 * safe));
    }
    for corner in rect.expand(1.5 * safe).corners() {
        out.push(corner_bypass(p1, p2, horizontal, corner));
    }
    out
}

/// Two-point detour running parallel to the blocked segment on one side of
/// the obstacle.
fn channel(
    p1: Point,
    p2: Point,
    horizontal: bool,
    side: ChannelSide,
    rect: &Rect,
    margin: f64,
) -> Vec<Point> {
    if horizontal {
        let y = match side {
            ChannelSide::Low => rect.top() - margin,
            ChannelSide::High => rect.bottom() + margin,
        };
        vec![Point::new(p1.x, y), Point::new(p2.x, y)]
    } else {
        let x = match side {
            ChannelSide::Low => rect.left() - margin,
            ChannelSide::High => rect.right() + margin,
        };
        vec![Point::new(x, p1.y), Point::new(x, p2.y)]
    }
}

/// Three-point detour stepping through one corner of the expanded obstacle.
fn corner_bypass(p1: Point, p2: Point, horizontal: bool, corner: Point) -> Vec<Point> {
    if horizontal {
        vec![
            Point::new(p1.x, corner.y),
            corner,
            Point::new(corner.x, p2.y),
        ]
    } else {
        vec![
            Point::new(corner.x, p1.y),
            corner,
            Point::new(p2.x, corner.y),
        ]
    }
}

/// Side choice that keeps the detour on the source's side of the obstacle,
/// preserving the overall path shape.
fn shape_side(source: Point, rect: &Rect, horizontal: bool) -> ChannelSide {
    if horizontal {
        if source.x > rect.right() || source.y > rect.bottom() {
            ChannelSide::Low
        } else if source.x < rect.left() || source.y < rect.top() {
            ChannelSide::High
        } else {
            ChannelSide::Low
        }
    } else if source.x > rect.right() || source.y < rect.top() {
        ChannelSide::Low
    } else if source.x < rect.left() || source.y > rect.bottom() {
        ChannelSide::High
    } else {
        ChannelSide::Low
    }
}

/// Side choice dictated by the target port's facing direction, so the detour
/// lands on the side the final approach wants to come from.
fn strategy_side(target: PortDirection, horizontal: bool) -> ChannelSide {
    if horizontal {
        match target {
            PortDirection::Top => ChannelSide::High,
            _ => ChannelSide::Low,
        }
    } else {
        match target {
            PortDirection::Left => ChannelSide::High,
            _ => ChannelSide::Low,
        }
    }
}

/// Validate a detour: every segment of `[p1, candidate.., p2]` must clear
/// every obstacle, with the same port-boundary exemptions as the scan.
fn candidate_clear(
    candidate: &[Point],
    p1: Point,
    p2: Point,
    is_first: bool,
    is_last: bool,
    obstacles: &[Obstacle],
    config: &RouterConfig,
) -> bool {
    let mut sub = Vec::with_capacity(candidate.len() + 2);
    sub.push(p1);
    sub.extend_from_slice(candidate);
    sub.push(p2);

    let last = sub.len() - 2;
    for (i, pair) in sub.windows(2).enumerate() {
        for obstacle in obstacles {
            if exempted(
                obstacle,
                pair[0],
                pair[1],
                is_first && i == 0,
                is_last && i == last,
                config.clearance,
            ) {
                continue;
            }
            if segment_intersects_rect(pair[0], pair[1], &obstacle.rect, config.clearance) {
                return false;
            }
        }
    }
    true
}
