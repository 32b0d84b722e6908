use crate::events::AppEvent;
use crate::gui::curve::Href;
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use relay::RelaySettings;
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::path::{Path, PathBuf};
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    #[strum(to_string = "left", serialize = "l", serialize = "<")]
    Left,
    #[strum(to_string = "right", serialize = "r", serialize = ">")]
    Right,
}

impl Direction {
    /// Sign of the offset change when scrolling this way.
    pub fn sign(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItemConfig {
    pub label: String,
    #[serde(default)]
    pub href: Option<Href>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleConfig {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_true")]
    pub bold: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: default_font_size(),
            bold: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Takes precedence over `marquee_text` when both are set.
    #[serde(default)]
    pub items: Option<Vec<ItemConfig>>,
    #[serde(default)]
    pub marquee_text: Option<String>,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default = "default_curve_amount")]
    pub curve_amount: f64,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_true")]
    pub interactive: bool,
    #[serde(default)]
    pub style: StyleConfig,
    /// Present only when the relay should run alongside the banner.
    #[serde(default)]
    pub relay: Option<RelaySettings>,
}

fn default_speed() -> f64 {
    2.0
}

fn default_curve_amount() -> f64 {
    400.0
}

fn default_true() -> bool {
    true
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_font_size() -> f64 {
    56.0
}

impl Default for Config {
    fn default() -> Self {
        let items = ["About Me", "Resume", "Education + Experience", "Projects"]
            .into_iter()
            .map(|label| ItemConfig {
                label: label.to_string(),
                href: None,
            })
            .collect();

        Self {
            items: Some(items),
            marquee_text: None,
            speed: default_speed(),
            curve_amount: default_curve_amount(),
            direction: Direction::default(),
            interactive: true,
            style: StyleConfig::default(),
            relay: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("dev", "portfolio", "marquee").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("MARQUEE"))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Loads the user config, writing the default file on first run.
pub fn load_or_setup() -> Config {
    if let Ok(path) = get_config_path()
        && !path.exists()
    {
        match write_default_config() {
            Ok(path) => log::info!("Wrote default config to {}", path.display()),
            Err(e) => {
                log::warn!("Could not write default config: {}", e);
                return Config::default();
            }
        }
    }

    load_config().unwrap_or_else(|e| {
        log::error!("Failed to load config, using defaults: {}", e);
        Config::default()
    })
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

pub(crate) const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

fn is_config_change(event: &Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

/// Watches the config directory and emits `ConfigReload` whenever the
/// config file changes. Returns when the receiving side is gone.
pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let Some(config_dir) = config_path.parent().map(Path::to_path_buf) else {
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
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) if is_config_change(&event, &config_path) => {
                if tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
