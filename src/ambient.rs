//! Process environment, Claude Code settings files and git state.
//!
//! This is the only place that reads anything besides the config file; the
//! rest of the crate receives an [`AmbientContext`] or a [`StatusContext`].

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::process::Command;

use crate::config::AppConfig;
use crate::display::{GitStatus, StatusContext};

const DEFAULT_URL: &str = "anthropic.com";
const DEFAULT_OUTPUT_STYLE: &str = "default";
const MAX_MODEL_LEN: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct AmbientContext {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub output_style: Option<String>,
    pub home_dir: Option<PathBuf>,
    pub cwd: Option<PathBuf>,
}

impl AmbientContext {
    pub fn from_env() -> Self {
        Self {
            base_url: non_empty_var("ANTHROPIC_BASE_URL"),
            model: non_empty_var("ANTHROPIC_MODEL"),
            output_style: non_empty_var("CLAUDE_OUTPUT_STYLE"),
            home_dir: dirs::home_dir(),
            cwd: std::env::current_dir().ok(),
        }
    }

    fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or_default()
    }

    pub fn uses_provider(&self, domain: &str) -> bool {
        self.base_url().contains(domain)
    }

    /// Host shown next to the model when the provider is not in use.
    pub fn display_url(&self, domain: &str) -> String {
        let base = self.base_url();
        if base.is_empty() {
            return DEFAULT_URL.to_string();
        }
        if base.contains(domain) {
            return domain.to_string();
        }
        url_host(base).unwrap_or(DEFAULT_URL).to_string()
    }

    /// Friendly model name from the environment or `~/.claude/settings.json`.
    pub fn current_model(&self, domain: &str) -> String {
        let configured = self.model.clone().or_else(|| {
            let settings = self.home_dir.as_ref()?.join(".claude").join("settings.json");
            read_string_key(&settings, "model")
        });

        match configured {
            Some(model) => simplify_model_name(&model),
            None if self.uses_provider(domain) => "Claude 4 Sonnet".to_string(),
            None => "Claude (Auto)".to_string(),
        }
    }

    /// `outputStyle` from the first settings file that sets it, most specific first.
    pub fn output_style(&self) -> String {
        if let Some(style) = &self.output_style {
            return style.clone();
        }
        self.settings_candidates()
            .iter()
            .find_map(|path| read_string_key(path, "outputStyle"))
            .unwrap_or_else(|| DEFAULT_OUTPUT_STYLE.to_string())
    }

    fn settings_candidates(&self) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(4);
        for file in ["settings.local.json", "settings.json"] {
            if let Some(cwd) = &self.cwd {
                paths.push(cwd.join(".claude").join(file));
            }
            if let Some(home) = &self.home_dir {
                paths.push(home.join(".claude").join(file));
            }
        }
        paths
    }

    pub fn workspace(&self) -> String {
        self.cwd
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Branch and modified-file count; `None` outside a repository or on any git failure.
    pub async fn git_status(&self, timeout: Duration) -> Option<GitStatus> {
        let branch = self
            .run_git(&["branch", "--show-current"], timeout)
            .await?
            .trim()
            .to_string();
        if branch.is_empty() {
            return None;
        }
        let modified_files = self
            .run_git(&["status", "--porcelain"], timeout)
            .await
            .map(|out| count_porcelain_entries(&out))
            .unwrap_or(0);
        Some(GitStatus {
            branch,
            modified_files,
        })
    }

    async fn run_git(&self, args: &[&str], timeout: Duration) -> Option<String> {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::debug!("git {args:?} failed to run: {e}");
                return None;
            }
            Err(_) => {
                tracing::debug!("git {args:?} timed out");
                return None;
            }
        };
        if !output.status.success() {
            return None;
        }
        String::from_utf8(output.stdout).ok()
    }

    pub async fn status_context(&self, config: &AppConfig) -> StatusContext {
        StatusContext {
            model: self.current_model(&config.provider_domain),
            output_style: self.output_style(),
            git: self.git_status(config.git_timeout).await,
            workspace: self.workspace(),
            show_cost_hint: config.show_cost_hint,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn url_host(url: &str) -> Option<&str> {
    ["https://", "http://"].iter().find_map(|scheme| {
        let start = url.find(scheme)? + scheme.len();
        let host = url[start..].split('/').next()?;
        (!host.is_empty()).then_some(host)
    })
}

fn read_string_key(path: &Path, key: &str) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    let settings: Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("ignoring unparseable settings {}: {e}", path.display());
            return None;
        }
    };
    settings
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn simplify_model_name(model: &str) -> String {
    let lower = model.to_lowercase();
    if lower.contains("claude-3") {
        if lower.contains("haiku") {
            return "Claude 3 Haiku".to_string();
        } else if lower.contains("sonnet") {
            return "Claude 3 Sonnet".to_string();
        } else if lower.contains("opus") {
            return "Claude 3 Opus".to_string();
        }
    } else if lower.contains("claude-4") || lower.contains("sonnet-4") {
        return "Claude 4 Sonnet".to_string();
    } else if lower.contains("opus-4") {
        return "Claude 4 Opus".to_string();
    } else if model.chars().count() > MAX_MODEL_LEN {
        let head: String = model.chars().take(MAX_MODEL_LEN).collect();
        return format!("{head}...");
    }
    model.to_string()
}

fn count_porcelain_entries(output: &str) -> usize {
    output.lines().filter(|l| !l.trim().is_empty()).count()
}
