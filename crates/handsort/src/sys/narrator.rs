use crate::config::Settings;
use crate::game::Feedback;
use async_channel::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::process::{Command, Stdio};
use std::sync::Arc;

pub const QUEUE_DEPTH: usize = 4;

/// A phrase to speak and the command line that speaks it.
#[derive(Debug, Clone, PartialEq)]
pub struct Narration {
    pub phrase: String,
    pub argv: Option<Vec<String>>,
}

/// Frame-loop side of narration. Never blocks: requests that do not fit the queue are dropped.
#[derive(Debug, Clone)]
pub struct NarrationHandle {
    tx: Sender<Narration>,
    enabled: bool,
    argv: Option<Vec<String>>,
}

impl NarrationHandle {
    pub fn new(tx: Sender<Narration>, settings: &Settings) -> Self {
        let mut handle = Self {
            tx,
            enabled: false,
            argv: None,
        };
        handle.configure(settings);
        handle
    }

    pub fn configure(&mut self, settings: &Settings) {
        self.enabled = settings.sound_on;
        self.argv = settings.speech_argv();
    }

    pub fn announce(&self, feedback: &Feedback) {
        if !self.enabled {
            return;
        }
        let narration = Narration {
            phrase: feedback.narration().to_string(),
            argv: self.argv.clone(),
        };
        match self.tx.try_send(narration) {
            Ok(()) => {}
            Err(TrySendError::Full(n)) => log::debug!("Narration queue full, dropping '{}'", n.phrase),
            Err(TrySendError::Closed(_)) => log::debug!("Narrator stopped"),
        }
    }
}

pub async fn run_narrator(rx: Receiver<Narration>) {
    let speaking = Arc::new(Mutex::new(()));

    while let Ok(narration) = rx.recv().await {
        let speaking = speaking.clone();
        tokio::task::spawn_blocking(move || speak(&speaking, narration));
    }
}

/// Speaks unless another phrase is still playing.
fn speak(speaking: &Mutex<()>, narration: Narration) {
    let Some(_guard) = speaking.try_lock() else {
        log::debug!("Narrator busy, skipping '{}'", narration.phrase);
        return;
    };

    let Some((program, args)) = narration.argv.as_deref().and_then(|a| a.split_first()) else {
        log::info!("{}", narration.phrase);
        return;
    };

    match Command::new(program)
        .args(args)
        .arg(&narration.phrase)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) if !status.success() => {
            log::debug!("'{}' exited with {}", program, status);
        }
        Ok(_) => {}
        Err(e) => {
            log::warn!("Failed to run '{}': {}", program, e);
            log::info!("{}", narration.phrase);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry::catalog::{FoodKind, ItemName};

    fn feedback(correct: bool) -> Feedback {
        Feedback {
            item: ItemName::new("Carrot"),
            kind: FoodKind::Veg,
            zone: FoodKind::Veg,
            correct,
            score: 10,
        }
    }

    #[test]
    fn test_muted_handle_sends_nothing() {
        let (tx, rx) = async_channel::bounded(QUEUE_DEPTH);
        let settings = Settings {
            sound_on: false,
            ..Settings::default()
        };
        NarrationHandle::new(tx, &settings).announce(&feedback(true));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_announce_carries_phrase_and_command() {
        let (tx, rx) = async_channel::bounded(QUEUE_DEPTH);
        let settings = Settings {
            speech_command: "espeak -s 170".to_string(),
            ..Settings::default()
        };
        NarrationHandle::new(tx, &settings).announce(&feedback(false));

        let narration = rx.try_recv().unwrap();
        assert_eq!(narration.phrase, "Incorrect. Try again.");
        assert_eq!(
            narration.argv.unwrap(),
            vec!["espeak".to_string(), "-s".to_string(), "170".to_string()]
        );
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let (tx, rx) = async_channel::bounded(1);
        let handle = NarrationHandle::new(tx, &Settings::default());
        handle.announce(&feedback(true));
        handle.announce(&feedback(false));
        assert_eq!(rx.len(), 1);
        assert_eq!(rx.try_recv().unwrap().phrase, "Correct! Good job.");
    }

    #[test]
    fn test_busy_narrator_skips() {
        let speaking = Mutex::new(());
        let _held = speaking.lock();
        // would fail loudly if it tried to spawn a missing program
        speak(
            &speaking,
            Narration {
                phrase: "Correct! Good job.".to_string(),
                argv: Some(vec!["/nonexistent/handsort-speaker".to_string()]),
            },
        );
    }
}
