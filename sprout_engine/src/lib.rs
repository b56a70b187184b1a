//! Playback runtime for the plant-growth lesson.
//!
//! Chapter sequencers drive the fixed 25-line scripts against a
//! `StageContext` that stands in for the scene graph; trackers, triggers,
//! and the ruler snap controller feed them through signal queues. The
//! whole thing ticks cooperatively on a single thread.

pub mod runtime;
pub mod sequencer;
pub mod signals;
pub mod snap;
pub mod stage;
pub mod trackers;
pub mod triggers;

pub use sequencer::{ChapterOneSequencer, ChapterThreeSequencer};
pub use stage::{StageContext, StageError};
