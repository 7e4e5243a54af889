//! Shape and connector registry with cached, generation-stamped routes.
//!
//! The registry owns every shape and connector in plain `Vec` arenas and
//! hands out small integer ids. Any shape mutation bumps a global generation
//! counter; a connector's cached route is reused only while its stamp matches
//! the current generation, so invalidation is a single counter compare
//! instead of per-connector dirty flags.

use thiserror::Error;

use crate::config::RouterConfig;
use crate::geom::{Polygon, Rect};
use crate::route::{route_path, PortRef, RouteQuery, RoutedPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectorId(u32);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("unknown shape id {0}")]
    UnknownShape(u32),
    #[error("unknown connector id {0}")]
    UnknownConnector(u32),
}

#[derive(Debug, Clone)]
struct ShapeSlot {
    id: ShapeId,
    polygon: Polygon,
}

#[derive(Debug, Clone)]
struct ConnectorSlot {
    id: ConnectorId,
    query: RouteQuery,
    cached: Option<RoutedPath>,
    stamp: u64,
}

#[derive(Debug)]
pub struct Router {
    config: RouterConfig,
    shapes: Vec<ShapeSlot>,
    connectors: Vec<ConnectorSlot>,
    next_shape: u32,
    next_connector: u32,
    generation: u64,
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            shapes: Vec::new(),
            connectors: Vec::new(),
            next_shape: 0,
            next_connector: 0,
            generation: 0,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Current invalidation generation; bumped by every shape mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // -- shapes ------------------------------------------------------------

    pub fn create_shape(&mut self, polygon: Polygon) -> ShapeId {
        let id = ShapeId(self.next_shape);
        self.next_shape += 1;
        self.shapes.push(ShapeSlot { id, polygon });
        self.generation += 1;
        id
    }

    pub fn create_rectangle_shape(&mut self, rect: Rect) -> ShapeId {
        self.create_shape(Polygon::rectangle(rect))
    }

    pub fn delete_shape(&mut self, id: ShapeId) -> Result<(), RouterError> {
        let index = self.shape_index(id)?;
        self.shapes.remove(index);
        self.generation += 1;
        Ok(())
    }

    /// Replace a shape's outline wholesale.
    pub fn move_shape_to(&mut self, id: ShapeId, polygon: Polygon) -> Result<(), RouterError> {
        let index = self.shape_index(id)?;
        self.shapes[index].polygon = polygon;
        self.generation += 1;
        Ok(())
    }

    pub fn move_shape_by(&mut self, id: ShapeId, dx: f64, dy: f64) -> Result<(), RouterError> {
        let index = self.shape_index(id)?;
        self.shapes[index].polygon.translate(dx, dy);
        self.generation += 1;
        Ok(())
    }

    pub fn shape_bounds(&self, id: ShapeId) -> Result<Rect, RouterError> {
        Ok(self.shapes[self.shape_index(id)?].polygon.bounds())
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    // -- connectors ----------------------------------------------------------

    pub fn create_connector(&mut self, source: PortRef, target: PortRef) -> ConnectorId {
        let id = ConnectorId(self.next_connector);
        self.next_connector += 1;
        self.connectors.push(ConnectorSlot {
            id,
            query: RouteQuery::new(source, target),
            cached: None,
            stamp: 0,
        });
        id
    }

    pub fn delete_connector(&mut self, id: ConnectorId) -> Result<(), RouterError> {
        let index = self.connector_index(id)?;
        self.connectors.remove(index);
        Ok(())
    }

    /// Re-anchor one connector; only its own cache is dropped.
    pub fn set_endpoints(
        &mut self,
        id: ConnectorId,
        source: PortRef,
        target: PortRef,
    ) -> Result<(), RouterError> {
        let index = self.connector_index(id)?;
        let slot = &mut self.connectors[index];
        slot.query = RouteQuery::new(source, target);
        slot.cached = None;
        Ok(())
    }

    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    /// Force every connector to reroute on its next read, matching the bulk
    /// commit point of transactional callers.
    pub fn process_transaction(&mut self) {
        self.generation += 1;
    }

    /// The connector's current route, recomputed only when the cache stamp
    /// trails the registry generation.
    pub fn display_route(&mut self, id: ConnectorId) -> Result<&RoutedPath, RouterError> {
        let index = self.connector_index(id)?;
        let generation = self.generation;
        let fresh = self.connectors[index].stamp == generation
            && self.connectors[index].cached.is_some();
        if !fresh {
            let obstacles = self.obstacle_bounds();
            let slot = &mut self.connectors[index];
            slot.cached = Some(route_path(&slot.query, &obstacles, &self.config));
            slot.stamp = generation;
        }
        self.connectors[index]
            .cached
            .as_ref()
            .ok_or(RouterError::UnknownConnector(id.0))
    }

    /// Raw shape bounds; the pipeline applies the obstacle margin itself so
    /// endpoint-node recognition still works on exact rects.
    fn obstacle_bounds(&self) -> Vec<Rect> {
        self.shapes.iter().map(|s| s.polygon.bounds()).collect()
    }

    fn shape_index(&self, id: ShapeId) -> Result<usize, RouterError> {
        self.shapes
            .iter()
            .position(|s| s.id == id)
            .ok_or(RouterError::UnknownShape(id.0))
    }

    fn connector_index(&self, id: ConnectorId) -> Result<usize, RouterError> {
        self.connectors
            .iter()
            .position(|c| c.id == id)
            .ok_or(RouterError::UnknownConnector(id.0))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Point, PortDirection};

    fn port(x: f64, y: f64, direction: PortDirection) -> PortRef {
        PortRef::detached(Point::new(x, y), direction)
    }

    #[test]
    fn ids_are_never_reused() {
        let mut router = Router::default();
        let a = router.create_rectangle_shape(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
        router.delete_shape(a).unwrap();
        let b = router.create_rectangle_shape(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
        assert_ne!(a, b);
        assert_eq!(router.shape_bounds(a), Err(RouterError::UnknownShape(0)));
    }

    #[test]
    fn unknown_connector_is_an_error() {
        let mut router = Router::default();
        let id = router.create_connector(
            port(0.0, 0.0, PortDirection::Right),
            port(100.0, 0.0, PortDirection::Left),
        );
        router.delete_connector(id).unwrap();
        assert!(matches!(
            router.display_route(id),
            Err(RouterError::UnknownConnector(_))
        ));
    }

    #[test]
    fn routes_are_cached_until_a_shape_moves() {
        let mut router = Router::default();
        let shape = router.create_rectangle_shape(Rect::from_xywh(150.0, -40.0, 80.0, 80.0));
        let id = router.create_connector(
            port(0.0, 0.0, PortDirection::Right),
            port(400.0, 0.0, PortDirection::Left),
        );

        let first = router.display_route(id).unwrap().clone();
        let second = router.display_route(id).unwrap().clone();
        assert_eq!(first, second);

        // Moving the shape out of the corridor must change the route.
        router.move_shape_by(shape, 0.0, 500.0).unwrap();
        let third = router.display_route(id).unwrap().clone();
        assert_ne!(first.points, third.points);
        assert_eq!(third.points.len(), 2);
    }

    #[test]
    fn process_transaction_invalidates_everything() {
        let mut router = Router::default();
        let id = router.create_connector(
            port(0.0, 0.0, PortDirection::Right),
            port(200.0, 0.0, PortDirection::Left),
        );
        let before = router.generation();
        router.display_route(id).unwrap();
        router.process_transaction();
        assert_eq!(router.generation(), before + 1);
        // Still routable after the bulk invalidation.
        assert!(router.display_route(id).is_ok());
    }

    #[test]
    fn set_endpoints_reroutes_one_connector() {
        let mut router = Router::default();
        let id = router.create_connector(
            port(0.0, 0.0, PortDirection::Right),
            port(200.0, 0.0, PortDirection::Left),
        );
        let before = router.display_route(id).unwrap().clone();
        router
            .set_endpoints(
                id,
                port(0.0, 0.0, PortDirection::Right),
                port(200.0, 300.0, PortDirection::Left),
            )
            .unwrap();
        let after = router.display_route(id).unwrap().clone();
        assert_ne!(before.points, after.points);
        assert!(after.points.last().unwrap().approx_eq(Point::new(200.0, 300.0)));
    }
}
