//! Chapter sequencers and the shared line-playback task.

pub mod chapter_one;
pub mod chapter_three;
pub mod line;

pub use chapter_one::ChapterOneSequencer;
pub use chapter_three::ChapterThreeSequencer;
pub use line::{LineProgress, LineTask};
