use crate::game::Feedback;
use fs_err::{self as fs, OpenOptions};
use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

pub const HEADER: [&str; 6] = [
    "timestamp",
    "food_item",
    "classification",
    "dropped_in",
    "result",
    "score",
];

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Journal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Append-only CSV log with one row per sorted item.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// Creates the file with its header row unless it already exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            fs::write(&path, row(&HEADER))?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, feedback: &Feedback) -> Result<(), JournalError> {
        self.record_at(feedback, SystemTime::now())
    }

    fn record_at(&self, feedback: &Feedback, at: SystemTime) -> Result<(), JournalError> {
        let timestamp = humantime::format_rfc3339_millis(at).to_string();
        let kind = feedback.kind.to_string();
        let zone = feedback.zone.to_string();
        let score = feedback.score.to_string();
        let line = row(&[
            timestamp.as_str(),
            feedback.item.as_str(),
            kind.as_str(),
            zone.as_str(),
            feedback.verdict(),
            score.as_str(),
        ]);

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn row(fields: &[&str]) -> String {
    let mut line = fields
        .iter()
        .map(|f| escape(f))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}
