//! External tool abstractions
//!
//! Process execution and git introspection behind a trait seam, so command
//! logic can be exercised against scripted runners.

pub mod command;
pub mod git;

pub use command::{
    CommandError, OutputStream, ProcessInvocation, ProcessOutcome, ProcessRunner, TokioProcessRunner,
    DEFAULT_TIMEOUT,
};
pub use git::{GitClient, RepositoryCoordinates};
