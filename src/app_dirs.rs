use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tugmath").map(|pd| pd.config_dir().join("config.json"))
    }

    /// Log file location; logs never go to the terminal the game draws on
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("tugmath");
            Some(state_dir.join("tugmath.log"))
        } else {
            ProjectDirs::from("", "", "tugmath")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("tugmath.log"))
        }
    }
}
