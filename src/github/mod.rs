pub mod client;
pub mod errors;

pub use client::{GitHubClient, RepositoryRef};
pub use errors::GitHubError;
