//! Where hrdesk keeps its files.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "hrdesk";
const APPLICATION: &str = "hrdesk";

/// Name of the log file written by the running instance.
const LATEST_LOG: &str = "latest.log";

/// Archived logs kept besides the current one.
const MAX_ARCHIVED_LOGS: usize = 10;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Directory for the settings database.
///
/// - Linux: `$XDG_DATA_HOME/hrdesk` or `~/.local/share/hrdesk`
/// - macOS: `~/Library/Application Support/com.hrdesk.hrdesk`
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Directory for logs.
///
/// - Linux: `$XDG_CACHE_HOME/hrdesk` or `~/.cache/hrdesk`
/// - macOS: `~/Library/Caches/com.hrdesk.hrdesk`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the settings database.
pub fn settings_db() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("settings.db"))
}

/// Path to the log file of this run.
pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(LATEST_LOG))
}

/// Archives the previous run's log under a timestamp and prunes old archives.
///
/// Call before opening the new log file. Failures are ignored; logging is
/// not worth refusing to start over.
pub fn rotate_logs() {
    if let Some(dir) = cache_dir() {
        rotate_logs_in(&dir, chrono::Local::now());
    }
}

fn rotate_logs_in(dir: &Path, now: chrono::DateTime<chrono::Local>) {
    let latest = dir.join(LATEST_LOG);
    if latest.exists() {
        let archived = dir.join(format!("{}.log", now.format("%Y%m%d_%H%M%S")));
        let _ = fs::rename(&latest, archived);
    }
    prune_archived_logs(dir, MAX_ARCHIVED_LOGS);
}

/// Deletes the oldest archived logs beyond `keep`.
fn prune_archived_logs(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    // Archive names are timestamps, so name order is age order.
    let mut archived: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "log")
                && path.file_name().is_some_and(|name| name != LATEST_LOG)
        })
        .collect();
    archived.sort();

    let excess = archived.len().saturating_sub(keep);
    for path in archived.into_iter().take(excess) {
        let _ = fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_rotation_archives_latest_and_prunes() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=12 {
            fs::write(dir.path().join(format!("202601{:02}_000000.log", day)), "").unwrap();
        }
        fs::write(dir.path().join(LATEST_LOG), "previous run").unwrap();

        let now = chrono::Local.with_ymd_and_hms(2026, 2, 1, 9, 30, 0).unwrap();
        rotate_logs_in(dir.path(), now);

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();

        assert_eq!(names.len(), MAX_ARCHIVED_LOGS);
        assert!(!names.contains(&LATEST_LOG.to_string()));
        assert!(!names.contains(&"20260101_000000.log".to_string()));
        assert!(!names.contains(&"20260103_000000.log".to_string()));
        assert!(names.contains(&"20260104_000000.log".to_string()));
        assert!(names.contains(&"20260201_093000.log".to_string()));
    }
}
