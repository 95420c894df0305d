//! Harbor API response types.
//!
//! Only the fields the inventory needs are decoded; everything else in the
//! Harbor payloads is ignored.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    /// Full name including the project prefix, e.g. `nvcr.io/nvidia/pytorch`.
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    pub digest: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub tags: Option<Vec<Tag>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
}

impl Artifact {
    pub fn tags(&self) -> &[Tag] {
        self.tags.as_deref().unwrap_or_default()
    }

    /// Human-readable size, or `unknown` when Harbor did not report one.
    pub fn display_size(&self) -> String {
        self.size
            .map(format_size)
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Format a byte count with decimal units, e.g. `56.7 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["kB", "MB", "GB", "TB", "PB", "EB"];

    match bytes {
        1 => return "1 Byte".to_string(),
        b if b < 1000 => return format!("{} Bytes", b),
        _ => {}
    }

    let mut value = bytes as f64 / 1000.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1000.0 {
            break;
        }
        value /= 1000.0;
        unit = next;
    }
    format!("{:.1} {}", value, unit)
}
