//! The boundary to the hand-tracking collaborator.
//!
//! Camera capture and landmark inference live outside this crate. Anything that can hand over
//! the hands seen in a frame implements [`HandTracker`]; [`ReplayTracker`] plays back a JSON
//! Lines recording with one frame per line:
//!
//! ```text
//! {"hands":[{"handedness":"Right","landmarks":[[0.51,0.80],[0.48,0.74], ...]}]}
//! ```

use crate::config::Settings;
use crate::game::GameError;
use crate::gesture::RawHand;
use fs_err as fs;
use serde::Deserialize;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackedFrame {
    #[serde(default)]
    pub hands: Vec<RawHand>,
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Frame not available: {0}")]
    Transient(String),
    #[error("Hand tracker unavailable: {0}")]
    Unavailable(String),
    #[error("Recording exhausted")]
    Exhausted,
}

pub trait HandTracker {
    /// Blocks until the next frame has been captured and tracked.
    fn next_frame(&mut self) -> Result<TrackedFrame, CaptureError>;
}

pub struct ReplayTracker<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl ReplayTracker<BufReader<fs::File>> {
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let file = fs::File::open(path).map_err(|e| CaptureError::Unavailable(e.to_string()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplayTracker<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> HandTracker for ReplayTracker<R> {
    fn next_frame(&mut self) -> Result<TrackedFrame, CaptureError> {
        let line = self
            .lines
            .next()
            .ok_or(CaptureError::Exhausted)?
            .map_err(|e| CaptureError::Transient(e.to_string()))?;
        self.line_no += 1;

        if line.trim().is_empty() {
            return Err(CaptureError::Transient(format!(
                "line {} is blank",
                self.line_no
            )));
        }
        serde_json::from_str(&line)
            .map_err(|e| CaptureError::Transient(format!("line {}: {}", self.line_no, e)))
    }
}

/// Opens the tracker the settings ask for. Every refusal is terminal for the session.
pub fn open(settings: &Settings) -> Result<Box<dyn HandTracker>, GameError> {
    if !settings.camera_on {
        return Err(GameError::TrackerUnavailable(
            "camera_on is false".to_string(),
        ));
    }
    let Some(path) = &settings.replay_file else {
        return Err(GameError::TrackerUnavailable(
            "no hand recording configured, set replay_file".to_string(),
        ));
    };

    let tracker = ReplayTracker::open(path)
        .map_err(|e| GameError::TrackerUnavailable(format!("{}: {}", path.display(), e)))?;
    log::info!("Replaying hands from {}", path.display());
    Ok(Box::new(tracker))
}
