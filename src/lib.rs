// ghkit library - GitHub and git chores behind one command harness
// Exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod enums;
pub mod external;
pub mod github;
pub mod slug;
pub mod telemetry;
pub mod templates;

// Re-export key types for easy access
pub use cli::commands::{AppContext, CommandBase, CommandLine};
pub use config::{Configuration, GhkitConfig};
pub use enums::{EnumError, EnumValidator};
pub use external::{
    CommandError, GitClient, OutputStream, ProcessInvocation, ProcessOutcome, ProcessRunner,
    RepositoryCoordinates, TokioProcessRunner,
};
pub use github::{GitHubClient, GitHubError, RepositoryRef};
pub use slug::{LatinSlugifier, Slugifier};
pub use telemetry::{create_command_span, generate_correlation_id, init_telemetry};
pub use templates::{TemplateError, TemplateRenderer};
