#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod geom;
pub mod route;
pub mod router;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{load_config, RouterConfig};
pub use geom::{DirectionRelation, Point, Polygon, PortDirection, Rect};
pub use route::{
    path_intersects_rect, route_path, segment_intersects_rect, ArrowPose, PathStrategy, PortRef,
    RouteQuality, RouteQuery, RoutedPath, SceneComplexity, SceneReport,
};
pub use router::{ConnectorId, Router, RouterError, ShapeId};
