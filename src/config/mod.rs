use crate::errors::{AppError, AppResult};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod migrate; // use submodule at src/config/migrate.rs

/// Environment variables that override the file values (a `.env` file is honoured).
pub const ENV_BACKEND_URL: &str = "HEALTHLOG_BACKEND_URL";
pub const ENV_ANON_KEY: &str = "HEALTHLOG_ANON_KEY";
pub const ENV_PASSWORD: &str = "HEALTHLOG_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Local SQLite file: session, mirror of the last snapshot, day notes, audit log.
    pub database: String,
    /// Base URL of the hosted backend, e.g. `https://<project>.supabase.co`
    #[serde(default)]
    pub backend_url: String,
    /// Public (anon) API key of the backend project.
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default = "default_week_starts_on")]
    pub week_starts_on: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Category name → terminal color name (green, purple, yellow, blue, pink, red, orange, grey).
    #[serde(default = "default_category_colors")]
    pub category_colors: BTreeMap<String, String>,
}

fn default_storage_key() -> String {
    "health-tracker-auth".to_string()
}
fn default_week_starts_on() -> String {
    "sunday".to_string()
}
fn default_request_timeout() -> u64 {
    15
}

pub fn default_category_colors() -> BTreeMap<String, String> {
    [
        ("Bathroom", "green"),
        ("Exercise", "green"),
        ("Medication", "purple"),
        ("Food", "yellow"),
        ("Sleep", "blue"),
        ("Mood", "pink"),
        ("Pain", "red"),
        ("Symptom", "orange"),
        ("Other", "grey"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file())
    }
}

impl Config {
    fn with_database(db_path: PathBuf) -> Self {
        Self {
            database: db_path.to_string_lossy().to_string(),
            backend_url: String::new(),
            anon_key: String::new(),
            storage_key: default_storage_key(),
            week_starts_on: default_week_starts_on(),
            request_timeout_secs: default_request_timeout(),
            category_colors: default_category_colors(),
        }
    }

    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("healthlog")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".healthlog")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("healthlog.conf")
    }

    /// Return the full path of the local SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("healthlog.sqlite")
    }

    /// Load configuration from file (defaults when missing), then apply env overrides.
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        let mut cfg = if path.exists() {
            Self::load_from(&path)?
        } else {
            Config::default()
        };

        dotenvy::dotenv().ok();
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    fn apply_env(&mut self) {
        if let Ok(url) = env::var(ENV_BACKEND_URL)
            && !url.trim().is_empty()
        {
            self.backend_url = url.trim().to_string();
        }
        if let Ok(key) = env::var(ENV_ANON_KEY)
            && !key.trim().is_empty()
        {
            self.anon_key = key.trim().to_string();
        }
    }

    /// First day of the week used by the weekly summary and the month grid.
    pub fn week_start(&self) -> AppResult<Weekday> {
        match self.week_starts_on.trim().to_lowercase().as_str() {
            "sunday" | "sun" => Ok(Weekday::Sun),
            "monday" | "mon" => Ok(Weekday::Mon),
            other => Err(AppError::Config(format!(
                "week_starts_on must be 'sunday' or 'monday', got '{}'",
                other
            ))),
        }
    }

    pub fn color_for_category(&self, category: &str) -> Option<&str> {
        self.category_colors.get(category).map(String::as_str)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();

        // DB name: user provided or default
        let db_path = if let Some(name) = custom_name {
            let p = Path::new(&name);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                dir.join(p)
            }
        } else {
            dir.join("healthlog.sqlite")
        };

        // Keep backend settings of an existing config file
        let mut config = if Self::config_file().exists() {
            let mut existing = Self::load_from(&Self::config_file())?;
            existing.database = db_path.to_string_lossy().to_string();
            existing
        } else {
            Self::with_database(db_path.clone())
        };

        // Write config file
        if !is_test {
            fs::create_dir_all(&dir)?;
            let yaml = config.to_yaml()?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        println!("✅ Database:    {:?}", db_path);

        dotenvy::dotenv().ok();
        config.apply_env();
        Ok(config)
    }
}
