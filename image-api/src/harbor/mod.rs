//! Harbor registry access.
//!
//! Harbor API v2.0 collections are paginated; [`HarborClient`] walks every
//! page of a collection before returning it.

pub mod client;
pub mod encode;
pub mod types;

pub use client::HarborClient;
pub use encode::encode_repository_name;
pub use types::{Artifact, Project, Repository, Tag, format_size};
