use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::model::WorkspaceProfile;

/// Gateway to a workspace's REST API. Cheap to clone: the underlying
/// reqwest client is shared, so refresh tasks can carry their own copy.
#[derive(Clone)]
pub struct WorkspaceGateway {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CatalogListResponse {
    #[serde(default)]
    catalogs: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(default)]
    name: Option<String>,
}

impl WorkspaceGateway {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lakeview/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to initialize workspace HTTP client")?;
        Ok(Self { client })
    }

    /// List the catalogs the workspace exposes, sorted ascending. Upstream
    /// duplicates are preserved; entries without a name are dropped. A
    /// non-2xx response or a body that does not match the expected shape is
    /// an error, never an empty list.
    pub async fn list_catalogs(&self, profile: &WorkspaceProfile) -> Result<Vec<String>> {
        let url = format!(
            "{}/api/2.1/unity-catalog/catalogs",
            profile.host.trim_end_matches('/')
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&profile.token)
            .send()
            .await
            .with_context(|| format!("catalogs request failed for '{}'", profile.name))?;

        let status = response.status();
        if !status.is_success() {
            bail!(
                "catalogs request for '{}' failed (HTTP {})",
                profile.name,
                status.as_u16()
            );
        }

        let body: CatalogListResponse = response.json().await.with_context(|| {
            format!("unexpected catalogs response from '{}'", profile.name)
        })?;

        let mut names = body
            .catalogs
            .into_iter()
            .filter_map(|entry| entry.name)
            .collect::<Vec<_>>();
        names.sort();
        Ok(names)
    }
}
