use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

/// Get the configuration directory path for hintro
/// If profile is Dev, uses "hintro-dev" instead of "hintro"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    let app_name = match profile {
        Profile::Dev => "hintro-dev",
        Profile::Prod => "hintro",
    };
    ProjectDirs::from("com", "hintro", app_name).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path for hintro
/// If profile is Dev, uses "hintro-dev" instead of "hintro"
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    let app_name = match profile {
        Profile::Dev => "hintro-dev",
        Profile::Prod => "hintro",
    };
    ProjectDirs::from("com", "hintro", app_name).map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}

/// Current time as Unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

static ID_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate a unique entity id: prefix + millis + process-local sequence.
/// Two ids minted in the same millisecond still differ.
pub fn new_id(prefix: &str) -> String {
    let seq = ID_SEQ.fetch_add(1, Ordering::Relaxed) % 1000;
    format!("{}{}{:03}", prefix, now_millis(), seq)
}

/// Render Unix milliseconds as a UTC "YYYY-MM-DD HH:MM" string
pub fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}
