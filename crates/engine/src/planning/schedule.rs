use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Frame indices at which a jump input must be asserted, strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JumpSchedule {
    frames: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("jump frame {frame} at position {index} does not follow {previous}")]
    NotIncreasing {
        index: usize,
        previous: u32,
        frame: u32,
    },
}

impl JumpSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_frames(frames: Vec<u32>) -> Result<Self, ScheduleError> {
        for (index, pair) in frames.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ScheduleError::NotIncreasing {
                    index: index + 1,
                    previous: pair[0],
                    frame: pair[1],
                });
            }
        }
        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[u32] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn contains(&self, frame: u32) -> bool {
        self.frames.binary_search(&frame).is_ok()
    }

    pub(crate) fn push(&mut self, frame: u32) {
        debug_assert!(self.frames.last().map_or(true, |last| frame > *last));
        self.frames.push(frame);
    }
}
