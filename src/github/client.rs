use super::errors::GitHubError;
use crate::config::GitHubConfig;
use octocrab::Octocrab;
use std::sync::Arc;

/// Authenticated GitHub API handle, built once at startup and shared by
/// every command.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    octocrab: Arc<Octocrab>,
}

impl GitHubClient {
    /// Build a client from configuration. Returns `Ok(None)` when no token is
    /// configured so commands that never touch the API still run.
    pub fn from_config(config: &GitHubConfig) -> Result<Option<Self>, GitHubError> {
        let Some(token) = config.token.as_deref().filter(|t| !t.trim().is_empty()) else {
            tracing::debug!("No GitHub token configured, API commands will be unavailable");
            return Ok(None);
        };

        let mut builder = Octocrab::builder().personal_token(token.trim().to_string());
        if let Some(api_url) = config.api_url.as_deref() {
            builder = builder.base_uri(api_url)?;
        }

        Ok(Some(Self {
            octocrab: Arc::new(builder.build()?),
        }))
    }

    pub fn octocrab(&self) -> &Octocrab {
        &self.octocrab
    }
}

/// Owner/repository pair an API call targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub repo: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self, GitHubError> {
        let owner = owner.into();
        let repo = repo.into();
        if owner.is_empty() || repo.is_empty() {
            return Err(GitHubError::RepositoryNotResolved(format!(
                "Could not determine the repository (owner: '{owner}', repo: '{repo}')"
            )));
        }
        Ok(Self { owner, repo })
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
