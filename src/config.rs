//! Application configuration.
//!
//! The configuration is loaded from a JSON file at
//! `$XDG_CONFIG_HOME/deskpager/config.json`.  Every section and every field
//! is optional: a minimal `{}` file is valid and everything falls back to
//! the compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "output": { "name": "DP-1", "width": 2560, "height": 1440 },
//!   "pager": { "workspaces": 6, "slide_ms": 250, "curve": "EaseOutCubic" },
//!   "move_grab": { "edge_dwell_ms": 300 },
//!   "overview": { "binding": "super+tab", "drag_threshold": 8.0 }
//! }
//! ```

use crate::command::KeyChord;
use crate::curve::Curve;
use crate::output::Output;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Geometry of the output the shell drives.
    #[serde(default)]
    pub output: OutputConfig,

    /// Workspace count and slide animation.
    #[serde(default)]
    pub pager: PagerConfig,

    /// Cross-workspace window dragging.
    #[serde(default)]
    pub move_grab: MoveGrabConfig,

    /// Grid overview effect.
    #[serde(default)]
    pub overview: OverviewConfig,
}

/// Output geometry.  Used by the headless daemon, which has no compositor
/// to ask.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            name: "HEADLESS-1".into(),
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
        }
    }
}

impl OutputConfig {
    pub fn build(&self) -> Output {
        Output::new(self.name.clone(), self.x, self.y, self.width, self.height)
    }
}

/// Pager settings.  Durations are in **milliseconds**.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    /// Number of workspaces created at startup (at least one is always
    /// created).
    pub workspaces: usize,
    /// Duration of the slide between workspaces.
    pub slide_ms: u32,
    /// Easing applied to workspace slides and the overview zoom.
    pub curve: Curve,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            workspaces: 4,
            slide_ms: 300,
            curve: Curve::Linear,
        }
    }
}

/// Settings for dragging a window across workspaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveGrabConfig {
    /// Width of the edge zone on the left and right of the output (pixels).
    pub edge_margin: f32,
    /// How long the pointer must stay in the edge zone before the pager
    /// switches workspace.
    pub edge_dwell_ms: u32,
    /// After a switch the pointer reappears this far inside the opposite
    /// edge (pixels), so it does not immediately dwell there.
    pub warp_inset: f32,
}

impl Default for MoveGrabConfig {
    fn default() -> Self {
        Self {
            edge_margin: 1.0,
            edge_dwell_ms: 200,
            warp_inset: 5.0,
        }
    }
}

/// Grid overview settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverviewConfig {
    /// Key chord that toggles the overview.
    pub binding: KeyChord,
    /// Duration of the zoom in and out of the grid.
    pub animation_ms: u32,
    /// Manhattan distance (pixels) a pressed window must travel before it
    /// starts being dragged.
    pub drag_threshold: f32,
    /// Cell margins are `1 / margin_divisor` of the output size.
    pub margin_divisor: u32,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            binding: KeyChord::ctrl('g'),
            animation_ms: 300,
            drag_threshold: 5.0,
            margin_divisor: 70,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "output": { "name": "DP-1", "width": 2560, "height": 1440, "x": 10, "y": 20 },
            "pager": { "workspaces": 6, "slide_ms": 250, "curve": "Ease" },
            "move_grab": { "edge_margin": 2.0, "edge_dwell_ms": 350, "warp_inset": 8.0 },
            "overview": {
                "binding": "super+tab",
                "animation_ms": 400,
                "drag_threshold": 7.5,
                "margin_divisor": 50
            }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.output.name, "DP-1");
        assert_eq!(cfg.output.width, 2560);
        assert_eq!(cfg.output.y, 20);
        assert_eq!(cfg.pager.workspaces, 6);
        assert_eq!(cfg.pager.slide_ms, 250);
        assert_eq!(cfg.pager.curve, Curve::Ease);
        assert_eq!(cfg.move_grab.edge_margin, 2.0);
        assert_eq!(cfg.move_grab.edge_dwell_ms, 350);
        assert_eq!(cfg.move_grab.warp_inset, 8.0);
        assert_eq!(cfg.overview.binding, "super+tab".parse::<KeyChord>().unwrap());
        assert_eq!(cfg.overview.animation_ms, 400);
        assert_eq!(cfg.overview.drag_threshold, 7.5);
        assert_eq!(cfg.overview.margin_divisor, 50);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.output.name, "HEADLESS-1");
        assert_eq!((cfg.output.width, cfg.output.height), (1920, 1080));
        assert_eq!(cfg.pager.workspaces, 4);
        assert_eq!(cfg.pager.slide_ms, 300);
        assert_eq!(cfg.pager.curve, Curve::Linear);
        assert_eq!(cfg.move_grab.edge_dwell_ms, 200);
        assert_eq!(cfg.move_grab.edge_margin, 1.0);
        assert_eq!(cfg.move_grab.warp_inset, 5.0);
        assert_eq!(cfg.overview.binding, KeyChord::ctrl('g'));
        assert_eq!(cfg.overview.animation_ms, 300);
        assert_eq!(cfg.overview.drag_threshold, 5.0);
        assert_eq!(cfg.overview.margin_divisor, 70);
    }

    #[test]
    fn deserialize_partial_section() {
        let json = r#"{ "move_grab": { "edge_dwell_ms": 500 } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.move_grab.edge_dwell_ms, 500);
        assert_eq!(cfg.move_grab.edge_margin, MoveGrabConfig::default().edge_margin);
    }

    #[test]
    fn bad_binding_is_a_parse_error() {
        let json = r#"{ "overview": { "binding": "ctrl+" } }"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "pager": {}, "future_section": { "key": 42 } }"#;
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn output_config_builds_output() {
        let out = OutputConfig::default().build();
        assert_eq!(out.name, "HEADLESS-1");
        assert_eq!(out.width, 1920);
        assert!(!out.clock().has_subscribers());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/deskpager/config.json")).unwrap_err();
        assert!(err.to_string().starts_with("config error: failed to read"));
    }
}
