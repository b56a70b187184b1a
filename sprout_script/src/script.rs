use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every chapter script has exactly this many lines, indices 0..24.
pub const SCRIPT_LEN: usize = 25;

/// Playback falls back to this wait when a line has no clip assigned.
pub const MISSING_CLIP_FALLBACK_SECS: f32 = 3.0;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script needs exactly {SCRIPT_LEN} lines, got {0}")]
    WrongLineCount(usize),
    #[error("line {index} has a non-positive clip duration ({duration})")]
    BadClipDuration { index: usize, duration: f32 },
}

/// Reference to a narration clip. The duration is authoritative: playback
/// suspends for exactly this long.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipRef {
    pub name: String,
    pub duration_secs: f32,
}

/// One scripted unit of dialog at a fixed index: display text, optional
/// narration clip, and the delay to hold after the clip finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    #[serde(default)]
    pub clip: Option<ClipRef>,
    #[serde(default)]
    pub post_delay_secs: f32,
}

impl Line {
    pub fn spoken(text: &str, clip_name: &str, duration_secs: f32) -> Self {
        Line {
            text: text.to_string(),
            clip: Some(ClipRef {
                name: clip_name.to_string(),
                duration_secs,
            }),
            post_delay_secs: 0.0,
        }
    }

    pub fn silent(text: &str) -> Self {
        Line {
            text: text.to_string(),
            clip: None,
            post_delay_secs: 0.0,
        }
    }

    /// How long playback of this line suspends before its post delay.
    pub fn playback_secs(&self) -> f32 {
        match self.clip.as_ref() {
            Some(clip) => clip.duration_secs,
            None => MISSING_CLIP_FALLBACK_SECS,
        }
    }
}

/// An ordered, fixed-length dialog script. Construction is the fail-fast
/// point: a wrong-sized line table never reaches the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Line>", into = "Vec<Line>")]
pub struct Script {
    lines: Vec<Line>,
}

impl Script {
    pub fn new(lines: Vec<Line>) -> Result<Self, ScriptError> {
        if lines.len() != SCRIPT_LEN {
            return Err(ScriptError::WrongLineCount(lines.len()));
        }
        for (index, line) in lines.iter().enumerate() {
            if let Some(clip) = line.clip.as_ref() {
                if clip.duration_secs <= 0.0 {
                    return Err(ScriptError::BadClipDuration {
                        index,
                        duration: clip.duration_secs,
                    });
                }
            }
        }
        Ok(Script { lines })
    }

    pub fn line(&self, index: usize) -> &Line {
        &self.lines[index]
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_valid_index(index: usize) -> bool {
        index < SCRIPT_LEN
    }

    pub(crate) fn line_mut(&mut self, index: usize) -> &mut Line {
        &mut self.lines[index]
    }
}

impl TryFrom<Vec<Line>> for Script {
    type Error = ScriptError;

    fn try_from(lines: Vec<Line>) -> Result<Self, Self::Error> {
        Script::new(lines)
    }
}

impl From<Script> for Vec<Line> {
    fn from(script: Script) -> Self {
        script.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler_lines(count: usize) -> Vec<Line> {
        (0..count)
            .map(|i| Line::spoken(&format!("line {i}"), &format!("clip_{i:02}"), 2.0))
            .collect()
    }

    #[test]
    fn script_requires_exact_length() {
        let err = Script::new(filler_lines(24)).expect_err("24 lines must fail");
        assert!(matches!(err, ScriptError::WrongLineCount(24)));
        assert!(Script::new(filler_lines(SCRIPT_LEN)).is_ok());
    }

    #[test]
    fn script_rejects_zero_length_clip() {
        let mut lines = filler_lines(SCRIPT_LEN);
        lines[3].clip = Some(ClipRef {
            name: "broken".to_string(),
            duration_secs: 0.0,
        });
        let err = Script::new(lines).expect_err("zero-duration clip must fail");
        assert!(matches!(err, ScriptError::BadClipDuration { index: 3, .. }));
    }

    #[test]
    fn missing_clip_uses_fallback_duration() {
        let line = Line::silent("quiet");
        assert_eq!(line.playback_secs(), MISSING_CLIP_FALLBACK_SECS);
    }

    #[test]
    fn script_round_trips_through_json() {
        let script = Script::new(filler_lines(SCRIPT_LEN)).expect("valid script");
        let json = serde_json::to_string(&script).expect("serialize");
        let back: Script = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.lines().len(), SCRIPT_LEN);
        assert_eq!(back.line(7).text, "line 7");
    }
}
