//! Backend configuration supplied by the CMS host.

use serde::{Deserialize, Serialize};

use folio_gitlab::{DEFAULT_BRANCH, DEFAULT_PER_PAGE};
use folio_types::trim_leading_slash;

use crate::error::{BackendError, Result};

const DEFAULT_GITLAB_ROOT: &str = "https://gitlab.com";

/// Configuration for a [`GitLabBackend`](crate::GitLabBackend).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project path, `group/repo`.
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Instance root, without the `/api/v4` suffix.
    #[serde(default = "default_gitlab_root")]
    pub gitlab_root: String,
    /// Repository folder holding media assets.
    #[serde(default)]
    pub media_folder: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_gitlab_root() -> String {
    DEFAULT_GITLAB_ROOT.to_string()
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl BackendConfig {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            branch: default_branch(),
            gitlab_root: default_gitlab_root(),
            media_folder: String::new(),
            per_page: default_per_page(),
        }
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn gitlab_root(mut self, gitlab_root: impl Into<String>) -> Self {
        self.gitlab_root = gitlab_root.into();
        self
    }

    pub fn media_folder(mut self, media_folder: impl Into<String>) -> Self {
        self.media_folder = media_folder.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.repo.trim().is_empty() {
            return Err(BackendError::InvalidConfiguration(
                "The GitLab backend needs a \"repo\" in the backend configuration.".to_string(),
            ));
        }
        Ok(())
    }

    /// Instance root with any trailing slash removed.
    pub fn root(&self) -> &str {
        self.gitlab_root.trim_end_matches('/')
    }

    /// REST API root derived from the instance root.
    pub fn api_root(&self) -> String {
        format!("{}/api/v4", self.root())
    }

    /// Raw download URL for a repository file on the configured branch.
    pub fn raw_url(&self, path: &str) -> String {
        format!(
            "{}/{}/raw/{}/{}",
            self.root(),
            self.repo,
            self.branch,
            trim_leading_slash(path)
        )
    }
}
