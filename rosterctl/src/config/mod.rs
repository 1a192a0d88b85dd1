//! Layered configuration for `rosterctl`.
//!
//! Sources, lowest to highest precedence: built-in defaults, the TOML config
//! file, an optional dotenv file, the process environment, and finally
//! command-line overrides.

pub mod error;
pub mod validation;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use roster_core::{DEFAULT_RECENT_WINDOW_DAYS, DashboardOptions, IdStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::util::parse_bool;

pub use error::ConfigLoadError;
pub use validation::{
    ConfigGuardRailError, ConfigWarning, ConfigWarnings, apply_guard_rails,
};

pub const ENV_DATA_DIR: &str = "ROSTER_DATA_DIR";
pub const ENV_ID_STRATEGY: &str = "ROSTER_ID_STRATEGY";
pub const ENV_PERSIST_ROLES: &str = "ROSTER_PERSIST_ROLES";
pub const ENV_RECENT_WINDOW_DAYS: &str = "ROSTER_RECENT_WINDOW_DAYS";

/// Effective settings of a `rosterctl` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RosterConfig {
    /// Directory holding `users.json` (and `roles.json`).
    pub data_dir: PathBuf,
    pub id_strategy: IdStrategy,
    pub persist_roles: bool,
    pub recent_window_days: u32,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            id_strategy: IdStrategy::default(),
            persist_roles: false,
            recent_window_days: DEFAULT_RECENT_WINDOW_DAYS,
        }
    }
}

impl RosterConfig {
    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            id_strategy: self.id_strategy,
            persist_roles: self.persist_roles,
            recent_window: chrono::Duration::days(i64::from(
                self.recent_window_days,
            )),
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("roster"))
        .unwrap_or_else(|| PathBuf::from(".roster"))
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("roster").join("config.toml"))
}

/// A resolved configuration plus the non-fatal findings about it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: RosterConfig,
    pub warnings: ConfigWarnings,
    /// The TOML file that contributed, if any.
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_file: Option<PathBuf>,
    discover_config_file: bool,
    env_file: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    env: HashMap<String, String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// A loader with an empty environment that still looks for the default
    /// config file.
    pub fn new() -> Self {
        Self {
            config_file: None,
            discover_config_file: true,
            env_file: None,
            data_dir: None,
            env: HashMap::new(),
        }
    }

    pub fn from_process_env() -> Self {
        Self::new().env(std::env::vars().collect())
    }

    /// Use `path` instead of the default location; it must exist.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn without_default_config_file(mut self) -> Self {
        self.discover_config_file = false;
        self
    }

    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn load(&self) -> Result<LoadedConfig, ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        let file = self.resolve_config_file()?;
        let mut config = match &file {
            Some(path) => read_config_file(path)?,
            None => RosterConfig::default(),
        };

        let mut env = match &self.env_file {
            Some(path) => read_env_file(path, &mut warnings)?,
            None => HashMap::new(),
        };
        env.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        apply_env(&mut config, &env)?;

        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }

        warnings.extend(apply_guard_rails(&config)?);

        debug!(
            data_dir = %config.data_dir.display(),
            id_strategy = %config.id_strategy,
            persist_roles = config.persist_roles,
            recent_window_days = config.recent_window_days,
            config_file = ?file,
            "configuration resolved"
        );

        Ok(LoadedConfig {
            config,
            warnings,
            config_file: file,
        })
    }

    fn resolve_config_file(&self) -> Result<Option<PathBuf>, ConfigLoadError> {
        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigLoadError::MissingConfigFile {
                    path: path.clone(),
                });
            }
            return Ok(Some(path.clone()));
        }
        if !self.discover_config_file {
            return Ok(None);
        }
        Ok(default_config_path().filter(|path| path.is_file()))
    }
}

fn read_config_file(path: &Path) -> Result<RosterConfig, ConfigLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| {
        ConfigLoadError::ConfigFileIo {
            path: path.to_path_buf(),
            source,
        }
    })?;
    toml::from_str(&contents).map_err(|source| {
        ConfigLoadError::ConfigFileParse {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn read_env_file(
    path: &Path,
    warnings: &mut ConfigWarnings,
) -> Result<HashMap<String, String>, ConfigLoadError> {
    let mut map = HashMap::new();
    if !path.exists() {
        warnings.push_with_hint(
            format!("env file {} not found; ignoring", path.display()),
            "Pass --env-file with an existing path or drop the flag",
        );
        return Ok(map);
    }

    for entry in dotenvy::from_path_iter(path)? {
        let (key, value) = entry?;
        map.insert(key, value);
    }
    Ok(map)
}

fn apply_env(
    config: &mut RosterConfig,
    env: &HashMap<String, String>,
) -> Result<(), ConfigLoadError> {
    if let Some(raw) = env.get(ENV_DATA_DIR)
        && !raw.trim().is_empty()
    {
        config.data_dir = PathBuf::from(raw.trim());
    }

    if let Some(raw) = env.get(ENV_ID_STRATEGY) {
        config.id_strategy = raw.parse().map_err(|reason| {
            ConfigLoadError::InvalidEnvValue {
                key: ENV_ID_STRATEGY,
                value: raw.clone(),
                reason,
            }
        })?;
    }

    if let Some(raw) = env.get(ENV_PERSIST_ROLES) {
        config.persist_roles = parse_bool(raw).ok_or_else(|| {
            ConfigLoadError::InvalidEnvValue {
                key: ENV_PERSIST_ROLES,
                value: raw.clone(),
                reason: "expected true/false/1/0/yes/no/on/off".into(),
            }
        })?;
    }

    if let Some(raw) = env.get(ENV_RECENT_WINDOW_DAYS) {
        config.recent_window_days =
            raw.trim().parse::<u32>().map_err(|err| {
                ConfigLoadError::InvalidEnvValue {
                    key: ENV_RECENT_WINDOW_DAYS,
                    value: raw.clone(),
                    reason: err.to_string(),
                }
            })?;
    }

    Ok(())
}
