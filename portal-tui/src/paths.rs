//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "labmarket";
const APPLICATION: &str = "partner-portal";

/// Maximum number of old log files to keep.
const MAX_OLD_LOGS: usize = 10;

const LATEST_LOG: &str = "latest.log";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Get the config directory.
///
/// - Linux: `$XDG_CONFIG_HOME/partner-portal` or `~/.config/partner-portal`
/// - macOS: `~/Library/Application Support/com.labmarket.partner-portal`
/// - Windows: `C:\Users\<User>\AppData\Roaming\labmarket\partner-portal\config`
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the cache directory, where logs live.
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Get the path to the settings file.
pub fn settings_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("settings.json"))
}

/// Get the path to the latest log file.
pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(LATEST_LOG))
}

/// Rotate logs: rename latest.log to a timestamped name, clean up old logs.
///
/// Call this at startup before creating the new log file. Returns how many
/// archived logs were deleted.
pub fn rotate_logs() -> usize {
    let Some(cache) = cache_dir() else { return 0 };
    let latest = cache.join(LATEST_LOG);

    if latest.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let archived = cache.join(format!("{}.log", timestamp));
        let _ = fs::rename(&latest, &archived);
    }

    cleanup_old_logs(&cache, MAX_OLD_LOGS)
}

/// Delete archived logs beyond the newest `keep`. Returns how many were removed.
fn cleanup_old_logs(cache_dir: &Path, keep: usize) -> usize {
    let Ok(entries) = fs::read_dir(cache_dir) else {
        return 0;
    };

    let mut archived: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| is_archived_log(&e.file_name().to_string_lossy()))
        .collect();
    if archived.len() <= keep {
        return 0;
    }

    // Oldest first
    archived.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());
    let excess = archived.len() - keep;
    archived
        .iter()
        .take(excess)
        .filter(|e| fs::remove_file(e.path()).is_ok())
        .count()
}

fn is_archived_log(name: &str) -> bool {
    name.ends_with(".log") && name != LATEST_LOG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archived_log_names() {
        assert!(is_archived_log("20240101_120000.log"));
        assert!(!is_archived_log(LATEST_LOG));
        assert!(!is_archived_log("settings.json"));
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = std::env::temp_dir().join(format!("partner-portal-logs-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for i in 0..5 {
            fs::write(dir.join(format!("2024010{}_000000.log", i)), "x").unwrap();
        }
        fs::write(dir.join(LATEST_LOG), "x").unwrap();

        assert_eq!(cleanup_old_logs(&dir, 3), 2);
        let remaining = fs::read_dir(&dir).unwrap().count();
        assert_eq!(remaining, 4);
        assert_eq!(cleanup_old_logs(&dir, 3), 0);

        fs::remove_dir_all(&dir).unwrap();
    }
}
