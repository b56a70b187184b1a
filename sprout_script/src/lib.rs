//! Script and chapter configuration for the plant-growth lesson.
//!
//! Pure data: the fixed 25-line dialog scripts, per-chapter gating
//! thresholds, tag strings, and timing knobs, plus JSON loading and the
//! fail-fast validation the runtime relies on. No playback state lives
//! here.

pub mod chapter;
pub mod demo;
pub mod script;

pub use chapter::{ChapterOneConfig, ChapterThreeConfig, ConfigError, RulerConfig};
pub use script::{ClipRef, Line, Script, ScriptError, SCRIPT_LEN};
