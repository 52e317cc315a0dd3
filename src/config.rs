use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::WrapErr;

use crate::cli::RootArgs;

/// Host fragment of `ANTHROPIC_BASE_URL` that means the credits provider is in use.
pub const PROVIDER_DOMAIN: &str = "claudecode-cn.com";
pub const CONFIG_FILE_NAME: &str = "aicodemirror-config.json";

pub const CACHE_DURATION: Duration = Duration::from_secs(30);
pub const GIT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub config_path: PathBuf,
    pub api_base_url: String,
    pub provider_domain: String,
    pub cache_duration: Duration,
    pub fetch_timeout: Duration,
    pub reset_timeout: Duration,
    pub git_timeout: Duration,
    pub show_cost_hint: bool,
}

impl AppConfig {
    pub fn from_args(args: &RootArgs) -> eyre::Result<Self> {
        let config_path = match &args.config {
            Some(path) => path.clone(),
            None => default_config_path().wrap_err("resolve default config path")?,
        };
        Ok(Self::with_config_path(config_path))
    }

    pub fn with_config_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            api_base_url: credits_http_client::DEFAULT_BASE_URL.to_string(),
            provider_domain: PROVIDER_DOMAIN.to_string(),
            cache_duration: CACHE_DURATION,
            fetch_timeout: credits_http_client::DEFAULT_FETCH_TIMEOUT,
            reset_timeout: credits_http_client::DEFAULT_RESET_TIMEOUT,
            git_timeout: GIT_TIMEOUT,
            show_cost_hint: true,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// `~/.claude/statusline/aicodemirror-config.json`
pub fn default_config_path() -> eyre::Result<PathBuf> {
    Ok(install_dir()?.join(CONFIG_FILE_NAME))
}

pub fn install_dir() -> eyre::Result<PathBuf> {
    Ok(claude_dir()?.join("statusline"))
}

pub fn claude_dir() -> eyre::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| eyre::eyre!("could not determine home directory"))?;
    Ok(home.join(".claude"))
}
