use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunables of the force-directed layout. Every field may be omitted from
/// a config file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Barnes-Hut accuracy threshold; a region is approximated when
    /// `side / distance < theta`. Zero disables approximation.
    pub theta: f32,
    pub time_step: f32,
    /// Velocity multiplier applied every tick, in `[0, 1)`.
    pub damping: f32,
    pub spring_strength: f32,
    pub rest_length: f32,
    pub repulsion_strength: f32,
    /// Distances below this are clamped before computing repulsion.
    pub min_distance: f32,
    pub max_speed: f32,
    /// Subdivision limit of the spatial tree; deeper points share a leaf.
    pub max_depth: usize,
    /// Nodes slower than this, under a negligible force, come to rest.
    pub rest_speed: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            theta: 0.7,
            time_step: 1.0,
            damping: 0.85,
            spring_strength: 0.02,
            rest_length: 60.0,
            repulsion_strength: 400.0,
            min_distance: 0.01,
            max_speed: 60.0,
            max_depth: 24,
            rest_speed: 0.001,
        }
    }
}

impl LayoutConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("invalid layout config {}", path.display()))?;
        Ok(config.validated())
    }

    /// Clamps every field into a range the integrator stays stable in.
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f32, fallback: f32| {
            if value.is_finite() { value } else { fallback }
        };

        Self {
            theta: finite_or(self.theta, defaults.theta).clamp(0.0, 2.0),
            time_step: finite_or(self.time_step, defaults.time_step).clamp(0.01, 4.0),
            damping: finite_or(self.damping, defaults.damping).clamp(0.0, 0.99),
            spring_strength: finite_or(self.spring_strength, defaults.spring_strength)
                .clamp(0.0, 1.0),
            rest_length: finite_or(self.rest_length, defaults.rest_length).max(0.0),
            repulsion_strength: finite_or(self.repulsion_strength, defaults.repulsion_strength)
                .max(0.0),
            min_distance: finite_or(self.min_distance, defaults.min_distance).max(1.0e-4),
            max_speed: finite_or(self.max_speed, defaults.max_speed).max(0.1),
            max_depth: self.max_depth.clamp(1, 64),
            rest_speed: finite_or(self.rest_speed, defaults.rest_speed).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        fs::write(&path, r#"{ "theta": 0.4, "damping": 0.5 }"#).unwrap();

        let config = LayoutConfig::load(&path).unwrap();
        assert_eq!(config.theta, 0.4);
        assert_eq!(config.damping, 0.5);
        assert_eq!(config.rest_length, LayoutConfig::default().rest_length);
    }

    #[test]
    fn validation_clamps_unstable_values() {
        let config = LayoutConfig {
            damping: 1.5,
            time_step: -1.0,
            theta: f32::NAN,
            max_depth: 0,
            ..LayoutConfig::default()
        }
        .validated();

        assert!(config.damping < 1.0);
        assert!(config.time_step > 0.0);
        assert_eq!(config.theta, LayoutConfig::default().theta);
        assert_eq!(config.max_depth, 1);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(LayoutConfig::load(&path).is_err());
    }
}
