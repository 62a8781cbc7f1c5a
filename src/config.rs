use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Typed view of the settings ghkit itself reads
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GhkitConfig {
    /// GitHub configuration
    #[serde(default)]
    pub github: GitHubConfig,
    /// External process settings
    pub process: ProcessConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct GitHubConfig {
    /// GitHub API token (falls back to GITHUB_TOKEN)
    pub token: Option<String>,
    /// API base URL for GitHub Enterprise installations
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProcessConfig {
    /// Timeout for every external command
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

/// Layered configuration: the typed [`GhkitConfig`] plus the raw key/value
/// source behind it, which commands query through [`Configuration::parameter`].
#[derive(Debug, Clone)]
pub struct Configuration {
    source: Config,
    settings: GhkitConfig,
}

pub const LOCAL_FILE: &str = "ghkit.toml";
pub const USER_FILE: &str = ".ghkit.toml";
pub const ENV_PREFIX: &str = "GHKIT";

impl Configuration {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. `~/.ghkit.toml`
    /// 3. `ghkit.toml` in the working directory
    /// 4. Environment variables (`GHKIT__SECTION__KEY`)
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::load_from(&cwd, home.as_deref())
    }

    pub fn load_from(working_dir: &Path, home: Option<&Path>) -> Result<Self> {
        let mut builder = Self::defaults()?;

        if let Some(home) = home {
            let user_file = home.join(USER_FILE);
            if user_file.exists() {
                builder = builder.add_source(File::from(user_file).format(FileFormat::Toml));
            }
        }

        let local_file = working_dir.join(LOCAL_FILE);
        if local_file.exists() {
            builder = builder.add_source(File::from(local_file).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        Self::finish(builder.build()?)
    }

    /// Defaults overlaid with a TOML document, without touching the
    /// filesystem or the environment.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let source = Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::finish(source)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("process.timeout_seconds", 3600_i64)?
            .set_default("observability.log_level", "info")?
            .set_default("observability.json_logs", false)?)
    }

    fn finish(source: Config) -> Result<Self> {
        let mut settings: GhkitConfig = source.clone().try_deserialize()?;

        // Special handling for GitHub token - check the conventional variable too
        if settings.github.token.as_deref().map_or(true, str::is_empty) {
            settings.github.token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        }

        if settings.process.timeout_seconds == 0 {
            anyhow::bail!("process.timeout_seconds must be greater than zero");
        }

        Ok(Self { source, settings })
    }

    pub fn settings(&self) -> &GhkitConfig {
        &self.settings
    }

    /// Raw lookup by dotted key, e.g. `github.api_url` or `branch.remote`.
    pub fn parameter(&self, key: &str) -> Option<String> {
        self.source.get_string(key).ok()
    }

    /// Typed lookup by dotted key.
    pub fn parameter_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.source.get::<T>(key).ok()
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.settings.process.timeout_seconds)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Configuration::from_toml_str("").unwrap();

        assert_eq!(config.settings().process.timeout_seconds, 3600);
        assert_eq!(config.settings().observability.log_level, "info");
        assert!(!config.settings().observability.json_logs);
        assert_eq!(config.timeout(), std::time::Duration::from_secs(3600));
    }

    #[test]
    fn test_parameter_lookup_by_dotted_key() {
        let config = Configuration::from_toml_str(
            r#"
            [branch]
            remote = "upstream"

            [github]
            api_url = "https://github.example.com/api/v3"
            "#,
        )
        .unwrap();

        assert_eq!(config.parameter("branch.remote").as_deref(), Some("upstream"));
        assert_eq!(
            config.settings().github.api_url.as_deref(),
            Some("https://github.example.com/api/v3")
        );
        assert_eq!(config.parameter("missing.key"), None);
        assert_eq!(config.parameter_as::<u64>("process.timeout_seconds"), Some(3600));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let result = Configuration::from_toml_str("[process]\ntimeout_seconds = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_local_file_overrides_user_file() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        std::fs::write(
            home.path().join(USER_FILE),
            "[process]\ntimeout_seconds = 10\n[observability]\nlog_level = \"debug\"\n",
        )
        .unwrap();
        std::fs::write(project.path().join(LOCAL_FILE), "[process]\ntimeout_seconds = 20\n").unwrap();

        let config = Configuration::load_from(project.path(), Some(home.path())).unwrap();

        assert_eq!(config.settings().process.timeout_seconds, 20);
        assert_eq!(config.settings().observability.log_level, "debug");
    }
}
