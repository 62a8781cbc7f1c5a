// Git introspection against real repositories created in temporary directories

use ghkit::{GitClient, ProcessInvocation, ProcessRunner, TokioProcessRunner};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(args)
        .current_dir(dir)
        .status()
        .expect("git should be installed");
    assert!(status.success(), "git {args:?} failed");
}

fn repository_with_remote(url: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    git(dir.path(), &["init", "-q"]);
    git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/trunk"]);
    git(dir.path(), &["commit", "-q", "--allow-empty", "-m", "initial"]);
    git(dir.path(), &["remote", "add", "origin", url]);
    dir
}

fn client(dir: &Path) -> GitClient {
    GitClient::new(Arc::new(TokioProcessRunner)).in_dir(dir)
}

#[tokio::test]
async fn test_coordinates_from_ssh_remote() {
    let repo = repository_with_remote("git@github.com:acme/widget.git");

    let coordinates = client(repo.path()).coordinates().await.unwrap();

    assert_eq!(coordinates.vendor, "acme");
    assert_eq!(coordinates.repository, "widget");
    assert_eq!(coordinates.branch, "trunk");
}

#[tokio::test]
async fn test_coordinates_from_https_remote() {
    let repo = repository_with_remote("https://github.com/acme/widget.git");

    let git = client(repo.path());

    assert_eq!(git.vendor_name().await.unwrap(), "acme");
    assert_eq!(git.repository_name().await.unwrap(), "widget");
}

#[tokio::test]
async fn test_branch_follows_checkout() {
    let repo = repository_with_remote("git@github.com:acme/widget.git");
    git(repo.path(), &["checkout", "-q", "-b", "feature/login"]);

    assert_eq!(client(repo.path()).current_branch().await.unwrap(), "feature/login");
}

#[tokio::test]
async fn test_directory_without_repository_yields_empty_values() {
    let dir = TempDir::new().unwrap();

    let coordinates = client(dir.path()).coordinates().await.unwrap();

    assert!(coordinates.vendor.is_empty());
    assert!(coordinates.repository.is_empty());
    assert!(coordinates.branch.is_empty());
}

#[tokio::test]
async fn test_runner_reports_status_and_output_of_git() {
    let repo = repository_with_remote("git@github.com:acme/widget.git");
    let invocation = ProcessInvocation::from_line("git rev-parse --abbrev-ref HEAD").in_dir(repo.path());

    let outcome = TokioProcessRunner.run_silent(&invocation).await.unwrap();

    assert!(outcome.success());
    assert_eq!(outcome.trimmed_stdout(), "trunk");
}
