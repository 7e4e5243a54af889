use crate::config::{load_config, RouterConfig};
use crate::geom::{Point, PortDirection, Rect};
use crate::route::{PortRef, RoutedPath};
use crate::router::Router;
use anyhow::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "orr", version, about = "Orthogonal connector router for diagram scenes")]
pub struct Args {
    /// Scene JSON file, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the routed JSON. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file (RouterConfig fields, all optional)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,
}

#[derive(Deserialize, Debug)]
struct SceneNode {
    id: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Deserialize, Debug)]
struct SceneEndpoint {
    node: String,
    side: PortDirection,
}

#[derive(Deserialize, Debug)]
struct SceneConnector {
    from: SceneEndpoint,
    to: SceneEndpoint,
}

/// On-disk scene: nodes by id, connectors by node reference. An inline
/// `config` overrides the one from `--configFile`.
#[derive(Deserialize, Debug)]
struct SceneFile {
    config: Option<RouterConfig>,
    #[serde(default)]
    nodes: Vec<SceneNode>,
    #[serde(default)]
    connectors: Vec<SceneConnector>,
}

#[derive(Serialize, Debug)]
struct Output {
    routes: Vec<RoutedPath>,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let base_config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;
    let scene: SceneFile = serde_json::from_str(&input)?;
    let output = route_scene(scene, base_config)?;
    let json = serde_json::to_string_pretty(&output)?;
    write_output(&json, args.output.as_deref())?;
    Ok(())
}

fn route_scene(scene: SceneFile, base_config: RouterConfig) -> Result<Output> {
    let config = scene.config.unwrap_or(base_config);
    let arrow_length = config.arrow_length;
    let mut router = Router::new(config);

    let mut bounds = std::collections::HashMap::new();
    for node in &scene.nodes {
        let rect = Rect::from_xywh(node.x, node.y, node.width, node.height);
        router.create_rectangle_shape(rect);
        if bounds.insert(node.id.clone(), rect).is_some() {
            anyhow::bail!("duplicate node id '{}'", node.id);
        }
    }

    let mut ids = Vec::with_capacity(scene.connectors.len());
    for connector in &scene.connectors {
        let source = resolve_port(&bounds, &connector.from, 0.0)?;
        // The routed path ends at the arrow tail, one arrow-length out from
        // the node side; the pose puts the tip back on the boundary.
        let target = resolve_port(&bounds, &connector.to, arrow_length)?;
        ids.push(router.create_connector(source, target));
    }

    let mut routes = Vec::with_capacity(ids.len());
    for id in ids {
        routes.push(router.display_route(id)?.clone());
    }
    Ok(Output { routes })
}

fn resolve_port(
    bounds: &std::collections::HashMap<String, Rect>,
    endpoint: &SceneEndpoint,
    outset: f64,
) -> Result<PortRef> {
    let rect = bounds
        .get(&endpoint.node)
        .ok_or_else(|| anyhow::anyhow!("unknown node id '{}'", endpoint.node))?;
    let point = side_midpoint(rect, endpoint.side).add(endpoint.side.unit().scale(outset));
    Ok(PortRef::new(point, endpoint.side, *rect))
}

fn side_midpoint(rect: &Rect, side: PortDirection) -> Point {
    let center = rect.center();
    match side {
        PortDirection::Top => Point::new(center.x, rect.top()),
        PortDirection::Bottom => Point::new(center.x, rect.bottom()),
        PortDirection::Left => Point::new(rect.left(), center.y),
        PortDirection::Right => Point::new(rect.right(), center.y),
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => Ok(std::fs::read_to_string(p)?),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn write_output(contents: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => std::fs::write(p, contents)?,
        None => println!("{contents}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteQuality;

    const SCENE: &str = r#"{
        "nodes": [
            { "id": "a", "x": 0, "y": 0, "width": 120, "height": 60 },
            { "id": "b", "x": 400, "y": 0, "width": 120, "height": 60 }
        ],
        "connectors": [
            { "from": { "node": "a", "side": "right" }, "to": { "node": "b", "side": "left" } }
        ]
    }"#;

    #[test]
    fn scene_routes_between_side_midpoints() {
        let scene: SceneFile = serde_json::from_str(SCENE).unwrap();
        let output = route_scene(scene, RouterConfig::default()).unwrap();
        assert_eq!(output.routes.len(), 1);
        let route = &output.routes[0];
        assert_eq!(route.quality, RouteQuality::Clean);
        assert!(route.points.first().unwrap().approx_eq(Point::new(120.0, 30.0)));
        // Tail sits one arrow-length left of b; tip back on b's border.
        assert!(route.points.last().unwrap().approx_eq(Point::new(385.0, 30.0)));
        assert!(route.arrow.position.approx_eq(Point::new(400.0, 30.0)));
    }

    #[test]
    fn unknown_node_reference_fails() {
        let scene: SceneFile = serde_json::from_str(
            r#"{
                "nodes": [],
                "connectors": [
                    { "from": { "node": "a", "side": "right" },
                      "to": { "node": "b", "side": "left" } }
                ]
            }"#,
        )
        .unwrap();
        assert!(route_scene(scene, RouterConfig::default()).is_err());
    }

    #[test]
    fn inline_config_overrides_the_base() {
        let scene: SceneFile = serde_json::from_str(
            r#"{ "config": { "arrow_length": 30.0 }, "nodes": [], "connectors": [] }"#,
        )
        .unwrap();
        assert_eq!(scene.config.as_ref().unwrap().arrow_length, 30.0);
    }
}
