use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "keystrike";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/keystrike`, or the platform data dir without HOME
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn db_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("scores.db"))
            .unwrap_or_else(|| PathBuf::from("keystrike_scores.db"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("keystrike.log"))
    }

    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("keystrike_config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_use_expected_file_names() {
        assert!(AppDirs::db_path().ends_with("scores.db"));
        assert!(AppDirs::config_path().ends_with("config.json"));
        if let Some(log) = AppDirs::log_path() {
            assert!(log.ends_with("keystrike.log"));
        }
    }
}
