//! Image inventory aggregation.
//!
//! One request collects from both sources independently. Failures become
//! [`SourceError`] entries next to whatever the other source produced.

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::config::{HarborConfig, Settings};
use crate::crictl::{CrictlRunner, ImageRecord};
use crate::error::HarborError;
use crate::harbor::{Artifact, HarborClient};

/// Where an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Containerd,
    Harbor,
}

/// A per-source failure reported in the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SourceError {
    pub source: Source,
    /// Set when the failure is scoped to one Harbor repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    pub error: String,
}

impl SourceError {
    pub fn containerd(error: impl Into<String>) -> Self {
        Self {
            source: Source::Containerd,
            repository: None,
            error: error.into(),
        }
    }

    pub fn harbor(error: impl Into<String>) -> Self {
        Self {
            source: Source::Harbor,
            repository: None,
            error: error.into(),
        }
    }

    pub fn harbor_repository(repository: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source: Source::Harbor,
            repository: Some(repository.into()),
            error: error.into(),
        }
    }
}

/// One tag of one Harbor artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HarborImageRecord {
    /// Full repository name including the project.
    pub repository: String,
    pub tag: String,
    pub digest: String,
    pub size: String,
    pub project: String,
}

/// Combined inventory returned by `GET /images`.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct AggregateResult {
    pub containerd_images: Vec<ImageRecord>,
    pub harbor_images: Vec<HarborImageRecord>,
    pub errors: Vec<SourceError>,
}

/// What a single source produced: records plus the errors it hit.
#[derive(Debug, Clone)]
pub struct SourceOutcome<T> {
    pub images: Vec<T>,
    pub errors: Vec<SourceError>,
}

impl<T> Default for SourceOutcome<T> {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> SourceOutcome<T> {
    fn failed(error: SourceError) -> Self {
        Self {
            images: Vec::new(),
            errors: vec![error],
        }
    }
}

/// Combine both source outcomes; containerd errors come first.
pub fn merge(
    containerd: SourceOutcome<ImageRecord>,
    harbor: SourceOutcome<HarborImageRecord>,
) -> AggregateResult {
    let mut errors = containerd.errors;
    errors.extend(harbor.errors);
    AggregateResult {
        containerd_images: containerd.images,
        harbor_images: harbor.images,
        errors,
    }
}

/// Expand one artifact into a record per tag.
///
/// The size is formatted once for the artifact, not per tag.
pub fn flatten_artifact(
    artifact: &Artifact,
    repository: &str,
    project: &str,
) -> impl Iterator<Item = HarborImageRecord> {
    let size = artifact.display_size();
    let digest = artifact.digest.clone();
    let repository = repository.to_string();
    let project = project.to_string();

    artifact
        .tags()
        .iter()
        .map(move |tag| HarborImageRecord {
            repository: repository.clone(),
            tag: tag.name.clone(),
            digest: digest.clone(),
            size: size.clone(),
            project: project.clone(),
        })
}

/// Harbor client state, settled once when the inventory is built.
#[derive(Clone)]
enum HarborState {
    Incomplete,
    Failed(String),
    Ready(Arc<HarborClient>),
}

impl HarborState {
    fn from_config(config: &HarborConfig) -> Self {
        if !config.is_complete() {
            return Self::Incomplete;
        }
        match HarborClient::new(config) {
            Ok(client) => Self::Ready(Arc::new(client)),
            Err(e) => {
                error!(error = %e, "Error creating Harbor client");
                Self::Failed(e.to_string())
            }
        }
    }
}

/// Collects the image inventory from containerd and Harbor.
#[derive(Clone)]
pub struct Inventory {
    settings: Arc<Settings>,
    crictl: Arc<CrictlRunner>,
    harbor: HarborState,
}

impl Inventory {
    pub fn new(settings: Arc<Settings>) -> Self {
        let crictl = Arc::new(CrictlRunner::from_config(&settings.crictl_config));
        let harbor = HarborState::from_config(&settings.harbor_config);
        Self {
            settings,
            crictl,
            harbor,
        }
    }

    /// Collect from both sources concurrently and merge the results.
    pub async fn collect(&self) -> AggregateResult {
        let (containerd, harbor) = tokio::join!(self.collect_containerd(), self.collect_harbor());
        let result = merge(containerd, harbor);
        info!(
            containerd_images = result.containerd_images.len(),
            harbor_images = result.harbor_images.len(),
            errors = result.errors.len(),
            "Collected image inventory"
        );
        result
    }

    pub async fn collect_containerd(&self) -> SourceOutcome<ImageRecord> {
        let ignore_file = Path::new(&self.settings.crictl_config.ignore_file_path);
        match self.crictl.list_images(ignore_file).await {
            Ok(images) => SourceOutcome {
                images,
                errors: Vec::new(),
            },
            Err(e) => {
                error!(error = %e, "Error getting containerd images");
                SourceOutcome::failed(SourceError::containerd(e.to_string()))
            }
        }
    }

    pub async fn collect_harbor(&self) -> SourceOutcome<HarborImageRecord> {
        let client = match &self.harbor {
            HarborState::Ready(client) => client,
            HarborState::Incomplete => {
                warn!("Harbor configuration incomplete");
                return SourceOutcome::failed(SourceError::harbor("Harbor configuration incomplete"));
            }
            HarborState::Failed(e) => return SourceOutcome::failed(SourceError::harbor(e.clone())),
        };

        let mut outcome = SourceOutcome::default();
        if let Err(e) = self.walk_harbor(client, &mut outcome).await {
            error!(error = %e, "Error getting Harbor images");
            // Records gathered before the failure are discarded with the branch.
            outcome.images.clear();
            outcome.errors.push(SourceError::harbor(e.to_string()));
        } else {
            info!(count = outcome.images.len(), "Retrieved Harbor images");
        }
        outcome
    }

    /// Walk projects -> repositories -> artifacts.
    ///
    /// A failed project or repository listing aborts the walk; a failed
    /// artifact listing is recorded against its repository and skipped.
    async fn walk_harbor(
        &self,
        client: &HarborClient,
        outcome: &mut SourceOutcome<HarborImageRecord>,
    ) -> Result<(), HarborError> {
        let filter = Some(self.settings.harbor_config.project_name.as_str()).filter(|n| !n.is_empty());
        let projects = client.list_projects(filter).await?;

        for project in &projects {
            let repositories = client.list_repositories(&project.name).await?;

            for repository in &repositories {
                let artifacts = match client.list_artifacts(&project.name, &repository.name).await {
                    Ok(artifacts) => artifacts,
                    Err(e) => {
                        error!(repository = %repository.name, error = %e, "Failed to get artifacts");
                        outcome.errors.push(SourceError::harbor_repository(
                            &repository.name,
                            format!("Failed to fetch artifacts: {}", e),
                        ));
                        continue;
                    }
                };

                for artifact in &artifacts {
                    outcome
                        .images
                        .extend(flatten_artifact(artifact, &repository.name, &project.name));
                }
            }
        }

        Ok(())
    }
}
