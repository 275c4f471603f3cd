use crate::game::Rules;
use crate::gesture::Screen;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use pantry::catalog;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const MIN_GAME_SECONDS: u64 = 10;
pub const MAX_GAME_SECONDS: u64 = 600;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub camera_on: bool,
    pub sound_on: bool,
    /// Countdown length in seconds.
    pub game_duration: u64,
    pub food_items_file: Option<PathBuf>,
    pub journal_file: Option<PathBuf>,
    /// JSON Lines hand recording to play instead of a live tracker.
    pub replay_file: Option<PathBuf>,
    /// Program (and leading arguments) that speaks a phrase given as its last argument.
    pub speech_command: String,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_on: true,
            sound_on: true,
            game_duration: 60,
            food_items_file: None,
            journal_file: None,
            replay_file: None,
            speech_command: "espeak".to_string(),
            screen_width: 1280,
            screen_height: 720,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Invalid setting: {0}")]
    Invalid(String),
    #[error(transparent)]
    Catalog(#[from] catalog::CatalogError),
}

impl Settings {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if !(MIN_GAME_SECONDS..=MAX_GAME_SECONDS).contains(&self.game_duration) {
            return Err(ConfigError::Invalid(format!(
                "game_duration must be between {} and {} seconds, got {}",
                MIN_GAME_SECONDS, MAX_GAME_SECONDS, self.game_duration
            )));
        }
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "screen size must be positive, got {}x{}",
                self.screen_width, self.screen_height
            )));
        }
        if self.speech_argv().is_none() {
            return Err(ConfigError::Invalid(format!(
                "speech_command '{}' is not a command line",
                self.speech_command
            )));
        }
        Ok(self)
    }

    pub fn screen(&self) -> Screen {
        Screen::new(self.screen_width as f64, self.screen_height as f64)
    }

    pub fn rules(&self) -> Rules {
        Rules {
            duration: Duration::from_secs(self.game_duration),
            screen: self.screen(),
        }
    }

    pub fn speech_argv(&self) -> Option<Vec<String>> {
        shell_words::split(&self.speech_command)
            .ok()
            .filter(|argv| !argv.is_empty())
    }

    pub fn catalog_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.food_items_file {
            Some(p) => Ok(p.clone()),
            None => Ok(catalog::default_catalog_path()?),
        }
    }

    pub fn journal_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.journal_file {
            Some(p) => Ok(p.clone()),
            None => Ok(catalog::data_dir()?.join("game_log.csv")),
        }
    }
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "handsort", "handsort").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn from_sources(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Settings, ConfigError> {
    let s = builder
        .add_source(config::Environment::with_prefix("HANDSORT"))
        .build()?;

    s.try_deserialize::<Settings>()?.validate()
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    let config_path = get_config_path()?;
    from_sources(
        config::Config::builder().add_source(config::File::from(config_path).required(false)),
    )
}

pub fn load_or_default() -> Settings {
    match load_settings() {
        Ok(s) => s,
        Err(e) => {
            log::error!("Falling back to default settings: {}", e);
            Settings::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let Some(config_dir) = config_path.parent().map(|p| p.to_path_buf()) else {
        return;
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", ConfigError::from(e));
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let touched = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                ) && event.paths.iter().any(|p| p == &config_path);

                if touched && tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
