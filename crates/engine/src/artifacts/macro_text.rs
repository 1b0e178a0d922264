use thiserror::Error;

use crate::planning::{JumpSchedule, ScheduleError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacroParseError {
    #[error("line {line}: '{content}' is not a frame index")]
    InvalidFrame { line: usize, content: String },
    #[error("line {line}: frame {frame} does not follow the previous jump")]
    NotIncreasing { line: usize, frame: u32 },
}

/// One frame index per line, ascending, newline-terminated.
pub fn render_macro_text(schedule: &JumpSchedule) -> String {
    schedule
        .frames()
        .iter()
        .map(|frame| format!("{frame}\n"))
        .collect()
}

pub fn parse_macro_text(raw: &str) -> Result<JumpSchedule, MacroParseError> {
    let mut frames = Vec::<u32>::new();
    let mut lines = Vec::<usize>::new();
    for (idx, line) in raw.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let frame = trimmed
            .parse::<u32>()
            .map_err(|_| MacroParseError::InvalidFrame {
                line: idx + 1,
                content: trimmed.to_string(),
            })?;
        frames.push(frame);
        lines.push(idx + 1);
    }
    JumpSchedule::from_frames(frames).map_err(|error| {
        let ScheduleError::NotIncreasing { index, frame, .. } = error;
        MacroParseError::NotIncreasing {
            line: lines[index],
            frame,
        }
    })
}
