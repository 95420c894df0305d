//! Local runtime images via crictl.
//!
//! Runs the configured image listing command (`sudo crictl images` by default)
//! and turns its columnar text output into [`ImageRecord`]s.

use serde::Serialize;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::config::CrictlConfig;
use crate::error::CrictlError;

/// An image known to the local container runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImageRecord {
    pub repository: String,
    pub tag: String,
    pub image_id: String,
    /// Human-readable size as printed by crictl.
    pub size: String,
}

/// Runs the image listing command with a bounded timeout.
pub struct CrictlRunner {
    command: Vec<String>,
    timeout: Duration,
}

impl CrictlRunner {
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    pub fn from_config(config: &CrictlConfig) -> Self {
        Self::new(config.command.clone(), config.timeout())
    }

    /// Run the command and return its stdout.
    ///
    /// The child is killed if the timeout expires.
    pub async fn run(&self) -> Result<String, CrictlError> {
        let (program, args) = self.command.split_first().ok_or(CrictlError::EmptyCommand)?;

        debug!(command = ?self.command, "Running image listing command");

        let output = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.timeout, output).await {
            Ok(result) => result.map_err(|source| CrictlError::Spawn {
                program: program.clone(),
                source,
            })?,
            Err(_) => return Err(CrictlError::Timeout(self.timeout)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CrictlError::Failed {
                status: output.status,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// List runtime images, dropping those in the ignore file.
    pub async fn list_images(&self, ignore_file: &Path) -> Result<Vec<ImageRecord>, CrictlError> {
        let output = self.run().await?;
        let ignored = load_ignored_image_ids(ignore_file).await;
        Ok(parse_images_output(&output, &ignored))
    }
}

/// Parse `crictl images` output.
///
/// The first line is the header. Columns are repository, tag, image ID and
/// size, where the size may itself contain a space ("123 MB"). Lines with
/// fewer than four columns are skipped, as are ignored image IDs.
pub fn parse_images_output(output: &str, ignored: &HashSet<String>) -> Vec<ImageRecord> {
    output
        .lines()
        .skip(1)
        .filter_map(parse_image_line)
        .filter(|image| !ignored.contains(&image.image_id))
        .collect()
}

fn parse_image_line(line: &str) -> Option<ImageRecord> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        if !parts.is_empty() {
            debug!(line = %line, "Skipping malformed crictl line");
        }
        return None;
    }

    Some(ImageRecord {
        repository: parts[0].to_string(),
        tag: parts[1].to_string(),
        image_id: parts[2].to_string(),
        size: parts[3..].join(" "),
    })
}

/// Read the set of image IDs to ignore.
///
/// A missing file yields an empty set; other read errors are logged and
/// also yield an empty set.
pub async fn load_ignored_image_ids(path: &Path) -> HashSet<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => parse_ignore_list(&content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No ignore file, nothing ignored");
            HashSet::new()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read ignore file");
            HashSet::new()
        }
    }
}

/// Parse an ignore list: one ID per line, blank lines and `#` comments skipped.
pub fn parse_ignore_list(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
