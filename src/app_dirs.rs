use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Default log file, used when logging is requested without a path.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("keysprint");
            Some(state_dir.join("keysprint.log"))
        } else {
            ProjectDirs::from("", "", "keysprint")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("keysprint.log"))
        }
    }
}
