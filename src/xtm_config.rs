// User configuration
// Remembers the last nickname and difficulty plus display preferences, persisted as TOML

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::xtm_game::Difficulty;
use crate::xtm_store::{Storage, default_data_dir};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub nickname: String,          // Last nickname entered at login
    pub difficulty: Difficulty,    // Last difficulty started from the menu
    pub language: String,          // Language code ("en" or "ko")
    pub ascii_icons: bool,         // Use ASCII fallback icons
    pub data_dir: Option<PathBuf>, // Where save, rankings and log files live
}

impl Default for Config {
    fn default() -> Self {
        // Auto-detect system language on first run
        let system_lang = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
        let lang = if system_lang.to_lowercase().starts_with("ko") {
            "ko".to_string()
        } else {
            "en".to_string()
        };

        Config {
            nickname: String::new(),
            difficulty: Difficulty::Easy,
            language: lang,
            ascii_icons: false,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn storage(&self) -> Storage {
        Storage::in_dir(&self.data_dir())
    }
}

/// Get the configuration file path
/// Uses platform-specific config directory (e.g., ~/.config/xtmines/xtmines.toml on Linux)
/// Falls back to current directory if ProjectDirs is unavailable
pub fn config_path() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let name = exe.file_stem().and_then(|s| s.to_str())?;
    if let Some(proj) = ProjectDirs::from("com", "xhbl", name) {
        let mut path = proj.config_dir().to_path_buf();
        path.push(format!("{}.toml", name));
        return Some(path);
    }
    let mut path = env::current_dir().ok()?;
    path.push(format!("{}.toml", name));
    Some(path)
}

/// Load configuration from disk, or create default if not found or unreadable
pub fn load_or_create_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    if path.exists() {
        match fs::read_to_string(&path).map(|s| toml::from_str::<Config>(&s)) {
            Ok(Ok(cfg)) => return cfg,
            Ok(Err(e)) => warn!(path = %path.display(), error = %e, "Config unreadable, using defaults"),
            Err(e) => warn!(path = %path.display(), error = %e, "Config unreadable, using defaults"),
        }
    }
    let cfg = Config::default();
    save_config(&cfg);
    cfg
}

/// Save configuration to disk as TOML
pub fn save_config(cfg: &Config) {
    let Some(path) = config_path() else {
        return;
    };
    let s = match toml::to_string(cfg) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "Config could not be serialized");
            return;
        }
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Err(e) = fs::write(&path, s) {
        warn!(path = %path.display(), error = %e, "Config could not be written");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let cfg: Config = toml::from_str("nickname = \"지수\"\ndifficulty = \"Hard\"\n").unwrap();
        assert_eq!(cfg.nickname, "지수");
        assert_eq!(cfg.difficulty, Difficulty::Hard);
        assert!(!cfg.ascii_icons);
        assert_eq!(cfg.data_dir, None);
    }

    #[test]
    fn data_dir_override_moves_storage() {
        let cfg = Config {
            data_dir: Some(PathBuf::from("/tmp/xtmines-data")),
            ..Config::default()
        };
        let storage = cfg.storage();
        assert_eq!(storage.save_path, PathBuf::from("/tmp/xtmines-data/savegame.json"));
        assert_eq!(storage.rankings_path, PathBuf::from("/tmp/xtmines-data/rankings.json"));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = Config {
            nickname: "guest".to_string(),
            difficulty: Difficulty::Extreme,
            language: "ko".to_string(),
            ascii_icons: true,
            data_dir: None,
        };
        let text = toml::to_string(&cfg).unwrap();
        assert!(text.contains("difficulty = \"Extreme\""));
        assert_eq!(toml::from_str::<Config>(&text).unwrap(), cfg);
    }
}
