use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable distances and budgets for the routing pipeline. Defaults mirror
/// the reference canvas (pixel units, nodes around 180x80).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Minimum perpendicular distance a route keeps from an obstacle edge.
    pub clearance: f64,
    /// Base stub length leaving a port, and the unit all avoidance margins
    /// scale from.
    pub node_safe_distance: f64,
    /// Below this, two coordinates count as coincident for classification.
    pub near_zero_threshold: f64,
    /// Below this, ports count as axis-aligned for classification.
    pub alignment_threshold: f64,
    /// Shortest segment worth emitting; feeds the five-segment extension.
    pub min_segment_length: f64,
    /// Distance from the arrow tip back to the path's final point.
    pub arrow_length: f64,
    /// Margin added around registered shapes when they act as obstacles.
    pub obstacle_margin: f64,
    /// Avoidance repair passes before a still-colliding path is accepted.
    pub max_avoidance_iterations: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            clearance: 15.0,
            node_safe_distance: 15.0,
            near_zero_threshold: 3.0,
            alignment_threshold: 20.0,
            min_segment_length: 10.0,
            arrow_length: 15.0,
            obstacle_margin: 5.0,
            max_avoidance_iterations: 5,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<RouterConfig> {
    let Some(path) = path else {
        return Ok(RouterConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config: RouterConfig = serde_json::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_positive() {
        let config = RouterConfig::default();
        assert!(config.clearance > 0.0);
        assert!(config.node_safe_distance > 0.0);
        assert!(config.max_avoidance_iterations >= 1);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: RouterConfig = serde_json::from_str(r#"{"clearance": 8.0}"#).unwrap();
        assert_eq!(config.clearance, 8.0);
        assert_eq!(config.arrow_length, RouterConfig::default().arrow_length);
    }
}
