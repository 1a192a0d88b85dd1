use thiserror::Error;

use super::RosterConfig;

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("recent_window_days must be greater than zero")]
    ZeroRecentWindow,
    #[error("data directory {path} exists but is not a directory")]
    DataDirNotDirectory { path: String },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

pub fn apply_guard_rails(
    config: &RosterConfig,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.recent_window_days == 0 {
        return Err(ConfigGuardRailError::ZeroRecentWindow);
    }

    let dir = &config.data_dir;
    if dir.exists() {
        if !dir.is_dir() {
            return Err(ConfigGuardRailError::DataDirNotDirectory {
                path: dir.display().to_string(),
            });
        }
    } else {
        warnings.push(format!(
            "data directory {} does not exist yet; it will be created on first write",
            dir.display()
        ));
    }

    if config.recent_window_days > 3650 {
        warnings.push_with_hint(
            format!(
                "recent_window_days = {} covers more than ten years",
                config.recent_window_days
            ),
            "The 'recent' date filter will match almost every dated user",
        );
    }

    Ok(warnings)
}
