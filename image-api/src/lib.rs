//! image-api: unified container image inventory
//!
//! Combines images from the local containerd runtime (via crictl) with the
//! artifacts stored in a Harbor registry behind a single `GET /images`.

pub mod config;
pub mod crictl;
pub mod error;
pub mod harbor;
pub mod inventory;
pub mod logging;
pub mod rest;

pub use config::Settings;
pub use error::{ConfigError, CrictlError, HarborError};
pub use inventory::{AggregateResult, HarborImageRecord, Inventory, Source, SourceError};
