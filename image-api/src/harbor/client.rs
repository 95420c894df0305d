//! Paginated Harbor API client.

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::encode::encode_repository_name;
use super::types::{Artifact, Project, Repository};
use crate::config::HarborConfig;
use crate::error::{HarborError, HarborResult};

/// Response header carrying the total item count of a collection.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Client for Harbor API v2.0 with basic authentication.
pub struct HarborClient {
    client: Client,
    api_base: String,
    user: String,
    password: String,
    page_size: u32,
}

impl HarborClient {
    pub fn new(config: &HarborConfig) -> HarborResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(HarborError::Client)?;

        Ok(Self {
            client,
            api_base: format!("{}/api/v2.0", config.url.trim_end_matches('/')),
            user: config.user.clone(),
            password: config.password.clone(),
            page_size: config.page_size.max(1),
        })
    }

    /// Fetch every page of a collection.
    ///
    /// Pages are requested in order until the accumulated count reaches the
    /// `X-Total-Count` header or a page comes back empty. Without the header
    /// a short page is the last one. Any failed page fails the whole
    /// collection.
    pub async fn get_paginated<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> HarborResult<Vec<T>> {
        let mut items: Vec<T> = Vec::new();
        let mut page: u32 = 1;

        loop {
            let response = self
                .client
                .get(url)
                .basic_auth(&self.user, Some(&self.password))
                .query(params)
                .query(&[("page", page), ("page_size", self.page_size)])
                .send()
                .await
                .map_err(|source| HarborError::Request {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(HarborError::Status {
                    url: url.to_string(),
                    status,
                    body: body.trim().to_string(),
                });
            }

            let total = response
                .headers()
                .get(TOTAL_COUNT_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<usize>().ok());

            let batch: Vec<T> = response
                .json()
                .await
                .map_err(|source| HarborError::Decode {
                    url: url.to_string(),
                    source,
                })?;
            let batch_len = batch.len();
            items.extend(batch);

            debug!(url = %url, page, batch_len, total = ?total, "Fetched page");

            // Harbor may cap page_size below what was asked for.
            let last_page = match total {
                Some(total) => items.len() >= total || batch_len == 0,
                None => batch_len < self.page_size as usize,
            };
            if last_page {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    /// List projects, optionally only the one named `name`.
    pub async fn list_projects(&self, name: Option<&str>) -> HarborResult<Vec<Project>> {
        let url = format!("{}/projects", self.api_base);
        match name {
            Some(name) => {
                let projects: Vec<Project> = self
                    .get_paginated(&url, &[("with_detail", "false"), ("name", name)])
                    .await?;
                Ok(projects.into_iter().filter(|p| p.name == name).collect())
            }
            None => self.get_paginated(&url, &[("with_detail", "false")]).await,
        }
    }

    pub async fn list_repositories(&self, project: &str) -> HarborResult<Vec<Repository>> {
        let url = format!("{}/projects/{}/repositories", self.api_base, project);
        self.get_paginated(&url, &[]).await
    }

    /// List artifacts of a repository given by its full (unencoded) name.
    pub async fn list_artifacts(
        &self,
        project: &str,
        full_repo_name: &str,
    ) -> HarborResult<Vec<Artifact>> {
        let encoded = encode_repository_name(full_repo_name, project);
        info!(repository = %full_repo_name, encoded = %encoded, "Getting artifacts");

        let url = format!(
            "{}/projects/{}/repositories/{}/artifacts",
            self.api_base, project, encoded
        );
        self.get_paginated(&url, &[]).await
    }
}
