//! Stage state shared by every lesson component.
//!
//! `StageContext` stands in for the scene graph: dialog panel text, clip
//! playback, prop visibility, the skybox, and the fairy's transform all go
//! through it, and every mutation is appended to the ordered event log the
//! demo binary and the regression tests inspect.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("scene transition requested with an empty scene name")]
    EmptySceneName,
    #[error("scene '{0}' is not available")]
    SceneUnavailable(String),
}

/// Skybox rendering parameters. The growth sequence darkens the sky to
/// black and fades it back to these captured originals.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SkyboxState {
    pub exposure: f32,
    pub tint: [f32; 3],
}

impl Default for SkyboxState {
    fn default() -> Self {
        SkyboxState {
            exposure: 1.0,
            tint: [0.5, 0.5, 0.5],
        }
    }
}

#[derive(Debug, Default)]
pub struct StageContext {
    events: Vec<String>,
    verbose: bool,
    dialog_text: Option<String>,
    playing_clip: Option<String>,
    visible: BTreeMap<String, bool>,
    skybox_original: SkyboxState,
    skybox_current: SkyboxState,
    fairy_position: Vec3,
    pending_scene: Option<String>,
    unavailable_scenes: BTreeSet<String>,
}

impl StageContext {
    pub fn new(verbose: bool) -> Self {
        StageContext {
            verbose,
            skybox_original: SkyboxState::default(),
            skybox_current: SkyboxState::default(),
            ..StageContext::default()
        }
    }

    pub fn log_event<S: Into<String>>(&mut self, event: S) {
        let event = event.into();
        if self.verbose {
            eprintln!("[sprout_engine] {event}");
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }

    pub fn set_dialog_text(&mut self, index: usize, text: &str) {
        self.dialog_text = Some(text.to_string());
        self.log_event(format!("dialog.show {index} \"{text}\""));
    }

    pub fn dialog_text(&self) -> Option<&str> {
        self.dialog_text.as_deref()
    }

    pub fn start_clip(&mut self, name: &str, duration_secs: f32) {
        self.playing_clip = Some(name.to_string());
        self.log_event(format!("audio.play {name} {duration_secs:.1}s"));
    }

    pub fn clip_finished(&mut self) {
        if let Some(name) = self.playing_clip.take() {
            self.log_event(format!("audio.finish {name}"));
        }
    }

    /// Cuts whatever clip is playing, used when a forced line interrupts
    /// one already in flight.
    pub fn stop_audio(&mut self) {
        if let Some(name) = self.playing_clip.take() {
            self.log_event(format!("audio.stop {name}"));
        }
    }

    /// One-shot sound effect with no duration bookkeeping.
    pub fn play_cue(&mut self, name: &str) {
        self.log_event(format!("audio.cue {name}"));
    }

    /// Shows or hides a prop. Repeated calls with the same value are
    /// dropped so the event log records transitions only.
    pub fn set_visible(&mut self, prop: &str, shown: bool) {
        let previous = self.visible.insert(prop.to_string(), shown);
        if previous == Some(shown) {
            return;
        }
        let action = if shown { "show" } else { "hide" };
        self.log_event(format!("stage.{action} {prop}"));
    }

    pub fn is_visible(&self, prop: &str) -> bool {
        self.visible.get(prop).copied().unwrap_or(false)
    }

    pub fn skybox(&self) -> SkyboxState {
        self.skybox_current
    }

    pub fn skybox_set_black(&mut self) {
        self.skybox_current = SkyboxState {
            exposure: 0.0,
            tint: [0.0, 0.0, 0.0],
        };
        self.log_event("skybox.black");
    }

    /// Blends the skybox from black back toward the captured originals.
    /// `t` is clamped to 0..=1; 1 restores the originals exactly.
    pub fn skybox_blend_to_original(&mut self, t: f32) {
        let t = t.clamp(0.0, 1.0);
        let original = self.skybox_original;
        self.skybox_current.exposure = original.exposure * t;
        let tint = Vec3::from(original.tint) * t;
        self.skybox_current.tint = tint.to_array();
        if t >= 1.0 {
            self.log_event("skybox.restore");
        }
    }

    pub fn fairy_position(&self) -> Vec3 {
        self.fairy_position
    }

    pub fn set_fairy_position(&mut self, position: Vec3) {
        self.fairy_position = position;
    }

    pub fn fairy_arrived(&mut self, position: Vec3) {
        self.fairy_position = position;
        self.log_event(format!(
            "fairy.arrive ({:.2}, {:.2}, {:.2})",
            position.x, position.y, position.z
        ));
    }

    /// Marks a scene as unloadable so failure paths can be exercised.
    pub fn mark_scene_unavailable(&mut self, name: &str) {
        self.unavailable_scenes.insert(name.to_string());
    }

    pub fn request_scene(&mut self, name: &str) -> Result<(), StageError> {
        if name.is_empty() {
            return Err(StageError::EmptySceneName);
        }
        if self.unavailable_scenes.contains(name) {
            return Err(StageError::SceneUnavailable(name.to_string()));
        }
        self.pending_scene = Some(name.to_string());
        self.log_event(format!("scene.switch {name}"));
        Ok(())
    }

    pub fn pending_scene(&self) -> Option<&str> {
        self.pending_scene.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_logs_transitions_only() {
        let mut stage = StageContext::new(false);
        stage.set_visible("chart", true);
        stage.set_visible("chart", true);
        stage.set_visible("chart", false);
        assert_eq!(stage.events(), ["stage.show chart", "stage.hide chart"]);
    }

    #[test]
    fn empty_scene_name_is_rejected() {
        let mut stage = StageContext::new(false);
        assert!(matches!(
            stage.request_scene(""),
            Err(StageError::EmptySceneName)
        ));
        assert!(stage.pending_scene().is_none());
    }

    #[test]
    fn unavailable_scene_is_rejected() {
        let mut stage = StageContext::new(false);
        stage.mark_scene_unavailable("chapter_3");
        assert!(matches!(
            stage.request_scene("chapter_3"),
            Err(StageError::SceneUnavailable(_))
        ));
        assert!(stage.request_scene("chapter_1").is_ok());
        assert_eq!(stage.pending_scene(), Some("chapter_1"));
    }

    #[test]
    fn skybox_blend_restores_originals_at_one() {
        let mut stage = StageContext::new(false);
        stage.skybox_set_black();
        assert_eq!(stage.skybox().exposure, 0.0);
        stage.skybox_blend_to_original(0.5);
        assert!(stage.skybox().exposure > 0.0);
        stage.skybox_blend_to_original(1.0);
        assert_eq!(stage.skybox().exposure, 1.0);
        assert!(stage.events().iter().any(|e| e == "skybox.restore"));
    }
}
