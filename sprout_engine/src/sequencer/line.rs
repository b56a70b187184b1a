//! One dialog line in flight.
//!
//! A `LineTask` owns the suspension bookkeeping for a single line: the
//! clip's remaining playback time, then an optional hold afterwards. The
//! owning sequencer polls `advance` each tick and runs its post-line
//! actions when the task reports `Finished`.

use sprout_script::Line;

use crate::stage::StageContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineProgress {
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Clip { remaining: f32 },
    PostDelay { remaining: f32 },
}

#[derive(Debug)]
pub struct LineTask {
    index: usize,
    phase: Phase,
    post_delay: f32,
    has_clip: bool,
}

impl LineTask {
    /// Shows the line's text and starts its clip. A line without a clip
    /// gets the standard fallback wait and a diagnostic.
    pub fn start(index: usize, line: &Line, post_delay: f32, stage: &mut StageContext) -> Self {
        stage.set_dialog_text(index, &line.text);
        match line.clip.as_ref() {
            Some(clip) => stage.start_clip(&clip.name, clip.duration_secs),
            None => {
                eprintln!(
                    "[sprout_engine] missing clip at index {index}, using {:.0}s fallback",
                    line.playback_secs()
                );
            }
        }
        LineTask {
            index,
            phase: Phase::Clip {
                remaining: line.playback_secs(),
            },
            post_delay,
            has_clip: line.clip.is_some(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn advance(&mut self, dt: f32, stage: &mut StageContext) -> LineProgress {
        let mut budget = dt;
        loop {
            match &mut self.phase {
                Phase::Clip { remaining } => {
                    if *remaining > budget {
                        *remaining -= budget;
                        return LineProgress::Playing;
                    }
                    budget -= *remaining;
                    if self.has_clip {
                        stage.clip_finished();
                    }
                    self.phase = Phase::PostDelay {
                        remaining: self.post_delay,
                    };
                }
                Phase::PostDelay { remaining } => {
                    if *remaining > budget {
                        *remaining -= budget;
                        return LineProgress::Playing;
                    }
                    return LineProgress::Finished;
                }
            }
        }
    }

    /// Cuts the line short, used when a forced request interrupts it. The
    /// post-line actions of an abandoned line never run.
    pub fn abandon(self, stage: &mut StageContext) {
        stage.stop_audio();
        stage.log_event(format!("dialog.abandon {}", self.index));
    }
}
