use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::common::collections::HashMap;
use crate::model::virtual_space::{Offset, SpaceMode};
use crate::sys::window_server::WindowId;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FocusCycle {
    All,
    Monitor,
    None,
}

impl Default for FocusCycle {
    fn default() -> Self { FocusCycle::None }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    Optimal,
    Vertical,
    Horizontal,
}

impl Default for SplitMode {
    fn default() -> Self { SplitMode::Optimal }
}

/// Configuration variables consumed by the controller. Loaded once from disk
/// and then treated as read-mostly; the insertion point is the one field
/// routinely rewritten at runtime (by the caller, and transiently by warp).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Cvars {
    pub window_focus_cycle: FocusCycle,
    pub monitor_focus_cycle: bool,
    pub mouse_follows_focus: bool,
    pub window_float_topmost: bool,

    pub bsp_split_ratio: f32,
    pub bsp_split_mode: SplitMode,
    pub bsp_optimal_ratio: f64,
    pub bsp_spawn_left: bool,

    pub padding_step_size: f64,
    pub gap_step_size: f64,

    pub preselect_border_color: u32,
    pub preselect_border_width: i32,

    pub space_mode_default: SpaceMode,
    pub desktop_offset: Offset,

    /// Serialized layouts to restore when a desktop switches to bsp mode,
    /// keyed by desktop id.
    pub desktop_tree_files: HashMap<String, PathBuf>,

    /// The window directional commands operate from. Not part of the on-disk
    /// configuration; the caller keeps it in sync with focus events.
    #[serde(skip)]
    pub bsp_insertion_point: Option<WindowId>,
}

impl Default for Cvars {
    fn default() -> Self {
        Self {
            window_focus_cycle: FocusCycle::default(),
            monitor_focus_cycle: false,
            mouse_follows_focus: false,
            window_float_topmost: false,
            bsp_split_ratio: 0.5,
            bsp_split_mode: SplitMode::default(),
            bsp_optimal_ratio: 1.618,
            bsp_spawn_left: false,
            padding_step_size: 10.0,
            gap_step_size: 5.0,
            preselect_border_color: 0xffd7_5f5f,
            preselect_border_width: 4,
            space_mode_default: SpaceMode::default(),
            desktop_offset: Offset::default(),
            desktop_tree_files: HashMap::default(),
            bsp_insertion_point: None,
        }
    }
}

pub fn config_file() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".slate.toml")
}

impl Cvars {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let cvars: Cvars = toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        let issues = cvars.validate();
        if !issues.is_empty() {
            anyhow::bail!("invalid config: {}", issues.join("; "));
        }
        Ok(cvars)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !(0.1..=0.9).contains(&self.bsp_split_ratio) {
            issues.push(format!(
                "bsp_split_ratio must be within [0.1, 0.9], got {}",
                self.bsp_split_ratio
            ));
        }
        if self.bsp_optimal_ratio <= 0.0 {
            issues.push("bsp_optimal_ratio must be positive".to_string());
        }
        if self.padding_step_size < 0.0 {
            issues.push("padding_step_size must be non-negative".to_string());
        }
        if self.gap_step_size < 0.0 {
            issues.push("gap_step_size must be non-negative".to_string());
        }
        if self.desktop_offset.top < 0.0
            || self.desktop_offset.bottom < 0.0
            || self.desktop_offset.left < 0.0
            || self.desktop_offset.right < 0.0
            || self.desktop_offset.gap < 0.0
        {
            issues.push("desktop_offset values must be non-negative".to_string());
        }

        issues
    }

    pub fn tree_file_for_desktop(&self, desktop: u32) -> Option<&Path> {
        self.desktop_tree_files.get(&desktop.to_string()).map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Cvars::default().validate().is_empty());
    }

    #[test]
    fn split_ratio_out_of_bounds_is_rejected() {
        let mut cvars = Cvars::default();
        cvars.bsp_split_ratio = 0.95;
        assert_eq!(cvars.validate().len(), 1);
    }

    #[test]
    fn parses_a_minimal_config() {
        let cvars: Cvars = toml::from_str(
            r#"
            window_focus_cycle = "monitor"
            mouse_follows_focus = true
            bsp_split_ratio = 0.4

            [desktop_tree_files]
            2 = "/tmp/desktop2.tree"
            "#,
        )
        .unwrap();
        assert_eq!(cvars.window_focus_cycle, FocusCycle::Monitor);
        assert!(cvars.mouse_follows_focus);
        assert_eq!(cvars.bsp_split_ratio, 0.4);
        assert!(cvars.tree_file_for_desktop(2).is_some());
        assert!(cvars.tree_file_for_desktop(1).is_none());
    }
}
