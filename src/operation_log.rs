use crate::user_settings::APP_DIR_NAME;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Log file name
const TRANSFER_LOG_FILE: &str = "transfer_log.txt";

/// Get the directory where app data is stored (same as settings)
fn app_data_dir() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        let app_dir = config_dir.join(APP_DIR_NAME);
        if !app_dir.exists() {
            let _ = fs::create_dir_all(&app_dir);
        }
        app_dir
    } else {
        // Fall back to current directory
        PathBuf::from(".")
    }
}

/// Append-only record of transfer attempts.
#[derive(Debug, Clone)]
pub struct TransferLog {
    path: PathBuf,
}

impl TransferLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log in the per-user app data directory
    pub fn default_location() -> Self {
        Self::new(app_data_dir().join(TRANSFER_LOG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry describing a step of a transfer.
    pub fn append(&self, event: &str, network_id: &str, details: impl AsRef<str>) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format_entry(Utc::now(), event, network_id, details.as_ref()).as_bytes())?;
        Ok(())
    }

    /// Read the entire log file content
    pub fn read(&self) -> Result<String> {
        if self.path.exists() {
            Ok(fs::read_to_string(&self.path)?)
        } else {
            Ok(String::new())
        }
    }
}

fn format_entry(timestamp: DateTime<Utc>, event: &str, network_id: &str, details: &str) -> String {
    let mut entry = format!(
        "[{}] network_id={} event={}\n",
        timestamp.to_rfc3339(),
        network_id,
        event
    );
    if details.trim().is_empty() {
        entry.push_str("  (no additional details)\n");
    } else {
        for line in details.lines() {
            if line.trim().is_empty() {
                entry.push('\n');
            } else {
                entry.push_str("  ");
                entry.push_str(line);
                entry.push('\n');
            }
        }
    }
    entry.push('\n');
    entry
}
