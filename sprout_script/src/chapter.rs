use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::script::{Script, ScriptError, SCRIPT_LEN};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("script error: {0}")]
    Script(#[from] ScriptError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("first_auto_count must be 1..=10, got {0}")]
    BadAutoCount(usize),
    #[error("required_seed_pots must be at least 1, got {0}")]
    BadSeedRequirement(usize),
    #[error("chapter three needs exactly {expected} pot requirements, got {actual}")]
    WrongPotCount { expected: usize, actual: usize },
}

const APPROX_ZERO: f32 = 1e-4;

fn is_unset(value: f32) -> bool {
    value.abs() < APPROX_ZERO
}

/// Chapter 1 authoring surface: the 25-line script plus the seed/water
/// gating knobs and the scene handoff target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterOneConfig {
    pub script: Script,
    #[serde(default = "default_first_auto_count")]
    pub first_auto_count: usize,
    #[serde(default = "default_required_seed_pots")]
    pub required_seed_pots: usize,
    #[serde(default = "default_seed_tag")]
    pub seed_tag: String,
    #[serde(default = "default_water_tag")]
    pub water_tag: String,
    #[serde(default = "default_next_scene")]
    pub next_scene_name: String,
    #[serde(default = "default_scene_switch_delay")]
    pub scene_switch_delay: f32,
    /// Prop ids highlighted while lines 4..=9 introduce the tools, in
    /// order. Slots past the end of this list are skipped silently.
    #[serde(default = "default_outline_props")]
    pub outline_props: Vec<String>,
}

fn default_first_auto_count() -> usize {
    4
}
fn default_required_seed_pots() -> usize {
    6
}
fn default_seed_tag() -> String {
    "Seed".to_string()
}
fn default_water_tag() -> String {
    "WaterCanTip".to_string()
}
fn default_next_scene() -> String {
    "chapter_3".to_string()
}
fn default_scene_switch_delay() -> f32 {
    2.0
}
fn default_outline_props() -> Vec<String> {
    [
        "outline.pot",
        "outline.seed",
        "outline.compound_x",
        "outline.ruler",
        "outline.watering_can",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl ChapterOneConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: ChapterOneConfig = serde_json::from_str(json)?;
        config.validate()?;
        config.apply_delay_defaults();
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.first_auto_count == 0 || self.first_auto_count > 10 {
            return Err(ConfigError::BadAutoCount(self.first_auto_count));
        }
        if self.required_seed_pots == 0 {
            return Err(ConfigError::BadSeedRequirement(self.required_seed_pots));
        }
        Ok(())
    }

    /// Backfills the post-line delays the script relies on when the author
    /// left them unset: 1 s after line 9, 5 s after line 11 and after each
    /// of lines 14..=24.
    pub fn apply_delay_defaults(&mut self) {
        if is_unset(self.script.line(9).post_delay_secs) {
            self.script.line_mut(9).post_delay_secs = 1.0;
        }
        if is_unset(self.script.line(11).post_delay_secs) {
            self.script.line_mut(11).post_delay_secs = 5.0;
        }
        for index in 14..SCRIPT_LEN {
            if is_unset(self.script.line(index).post_delay_secs) {
                self.script.line_mut(index).post_delay_secs = 5.0;
            }
        }
    }
}

/// How many pots (and check marks, and ruler zones) chapter 3 tracks.
pub const CH3_POT_COUNT: usize = 6;

/// Ruler snap tuning, straight from the authoring surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulerConfig {
    #[serde(default = "default_snap_pos_smooth_time")]
    pub snap_pos_smooth_time: f32,
    /// Per-tick rotation blend while snapped, 0..1.
    #[serde(default = "default_snap_rot_lerp")]
    pub snap_rot_lerp: f32,
    /// Pin the pose outright when within this distance (meters).
    #[serde(default = "default_hard_lock_pos_epsilon")]
    pub hard_lock_pos_epsilon: f32,
    /// Pin the pose outright when within this angle (degrees).
    #[serde(default = "default_hard_lock_rot_epsilon_deg")]
    pub hard_lock_rot_epsilon_deg: f32,
    #[serde(default = "default_enable_motion_unsnap")]
    pub enable_motion_unsnap: bool,
    #[serde(default = "default_unsnap_distance")]
    pub unsnap_distance: f32,
    #[serde(default = "default_unsnap_linear_speed")]
    pub unsnap_linear_speed: f32,
    #[serde(default = "default_unsnap_angular_speed")]
    pub unsnap_angular_speed: f32,
    #[serde(default = "default_unsnap_on_grab")]
    pub unsnap_on_grab: bool,
    /// Radius used by the exit debounce to decide the ruler is still over
    /// a zone.
    #[serde(default = "default_overlap_radius")]
    pub overlap_radius: f32,
}

fn default_snap_pos_smooth_time() -> f32 {
    0.035
}
fn default_snap_rot_lerp() -> f32 {
    0.2
}
fn default_hard_lock_pos_epsilon() -> f32 {
    0.0015
}
fn default_hard_lock_rot_epsilon_deg() -> f32 {
    0.8
}
fn default_enable_motion_unsnap() -> bool {
    true
}
fn default_unsnap_distance() -> f32 {
    0.01
}
fn default_unsnap_linear_speed() -> f32 {
    0.08
}
fn default_unsnap_angular_speed() -> f32 {
    0.6
}
fn default_unsnap_on_grab() -> bool {
    true
}
fn default_overlap_radius() -> f32 {
    0.1
}

impl Default for RulerConfig {
    fn default() -> Self {
        RulerConfig {
            snap_pos_smooth_time: default_snap_pos_smooth_time(),
            snap_rot_lerp: default_snap_rot_lerp(),
            hard_lock_pos_epsilon: default_hard_lock_pos_epsilon(),
            hard_lock_rot_epsilon_deg: default_hard_lock_rot_epsilon_deg(),
            enable_motion_unsnap: default_enable_motion_unsnap(),
            unsnap_distance: default_unsnap_distance(),
            unsnap_linear_speed: default_unsnap_linear_speed(),
            unsnap_angular_speed: default_unsnap_angular_speed(),
            unsnap_on_grab: default_unsnap_on_grab(),
            overlap_radius: default_overlap_radius(),
        }
    }
}

/// Chapter 3 authoring surface: the 25-line script, per-pot requirements
/// for the compound-X gate, growth-sequence timing, and the ruler tuning.
///
/// A line's `post_delay_secs` here is the autoplay gap after that line; a
/// zero means `default_delay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterThreeConfig {
    pub script: Script,
    #[serde(default = "default_delay")]
    pub default_delay: f32,
    /// Unique-object membership each pot needs before its check appears.
    #[serde(default = "default_pot_required_counts")]
    pub pot_required_counts: Vec<usize>,
    /// Grams of compound X each dosing pot accumulates toward.
    #[serde(default = "default_dose_required_amounts")]
    pub dose_required_amounts: Vec<f32>,
    #[serde(default = "default_compound_tag")]
    pub compound_tag: String,
    #[serde(default = "default_dose_tag")]
    pub dose_tag: String,
    #[serde(default = "default_pre_growth_wait")]
    pub pre_growth_wait: f32,
    #[serde(default = "default_index12_initial_delay")]
    pub index12_initial_delay: f32,
    #[serde(default = "default_index12_mid_wait")]
    pub index12_mid_wait: f32,
    #[serde(default = "default_fairy_move_duration")]
    pub fairy_move_duration: f32,
    #[serde(default = "default_skybox_fade_duration")]
    pub skybox_fade_duration: f32,
    #[serde(default)]
    pub ruler: RulerConfig,
}

fn default_delay() -> f32 {
    5.0
}
fn default_pot_required_counts() -> Vec<usize> {
    vec![0, 1, 3, 5, 7, 9]
}
fn default_dose_required_amounts() -> Vec<f32> {
    vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]
}
fn default_compound_tag() -> String {
    "CompoundX".to_string()
}
fn default_dose_tag() -> String {
    "X".to_string()
}
fn default_pre_growth_wait() -> f32 {
    3.0
}
fn default_index12_initial_delay() -> f32 {
    5.0
}
fn default_index12_mid_wait() -> f32 {
    3.0
}
fn default_fairy_move_duration() -> f32 {
    2.0
}
fn default_skybox_fade_duration() -> f32 {
    2.0
}

impl ChapterThreeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ChapterThreeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pot_required_counts.len() != CH3_POT_COUNT {
            return Err(ConfigError::WrongPotCount {
                expected: CH3_POT_COUNT,
                actual: self.pot_required_counts.len(),
            });
        }
        if self.dose_required_amounts.len() != CH3_POT_COUNT {
            return Err(ConfigError::WrongPotCount {
                expected: CH3_POT_COUNT,
                actual: self.dose_required_amounts.len(),
            });
        }
        Ok(())
    }

    /// Autoplay gap after `index`: the per-line delay when set, otherwise
    /// the chapter default.
    pub fn delay_after(&self, index: usize) -> f32 {
        let per_line = self.script.line(index).post_delay_secs;
        if per_line > 0.0 {
            per_line
        } else {
            self.default_delay
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    #[test]
    fn ch1_delay_defaults_backfill_unset_slots() {
        let mut config = demo::chapter_one();
        for index in 0..SCRIPT_LEN {
            config.script.line_mut(index).post_delay_secs = 0.0;
        }
        config.script.line_mut(14).post_delay_secs = 2.5;
        config.apply_delay_defaults();

        assert_eq!(config.script.line(9).post_delay_secs, 1.0);
        assert_eq!(config.script.line(11).post_delay_secs, 5.0);
        assert_eq!(config.script.line(14).post_delay_secs, 2.5);
        assert_eq!(config.script.line(24).post_delay_secs, 5.0);
        assert_eq!(config.script.line(0).post_delay_secs, 0.0);
    }

    #[test]
    fn ch1_rejects_out_of_range_auto_count() {
        let mut config = demo::chapter_one();
        config.first_auto_count = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadAutoCount(0))
        ));
        config.first_auto_count = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn ch3_rejects_wrong_pot_table() {
        let mut config = demo::chapter_three();
        config.pot_required_counts.pop();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WrongPotCount {
                expected: CH3_POT_COUNT,
                actual: 5
            })
        ));
    }

    #[test]
    fn ch3_delay_after_prefers_per_line_value() {
        let mut config = demo::chapter_three();
        config.script.line_mut(2).post_delay_secs = 1.5;
        config.script.line_mut(3).post_delay_secs = 0.0;
        assert_eq!(config.delay_after(2), 1.5);
        assert_eq!(config.delay_after(3), config.default_delay);
    }

    #[test]
    fn ch1_config_round_trips_through_json() {
        let config = demo::chapter_one();
        let json = serde_json::to_string_pretty(&config).expect("serialize");
        let back = ChapterOneConfig::from_json_str(&json).expect("parse back");
        assert_eq!(back.required_seed_pots, config.required_seed_pots);
        assert_eq!(back.next_scene_name, config.next_scene_name);
    }
}
