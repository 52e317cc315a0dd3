//! Registers the status line and the Stop hook in Claude Code's `settings.json`.

use std::path::{Path, PathBuf};

use eyre::WrapErr;
use serde_json::{json, Value};

use crate::store::ConfigStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub settings_path: PathBuf,
    pub backup_path: Option<PathBuf>,
    pub status_command: String,
    pub refresh_command: String,
}

/// Command line Claude Code runs for one of our subcommands.
pub fn hook_command(exe: &Path, subcommand: &str) -> String {
    let exe = exe.display().to_string();
    if cfg!(windows) || exe.contains(' ') {
        format!("\"{exe}\" {subcommand}")
    } else {
        format!("{exe} {subcommand}")
    }
}

/// Point `statusLine` at `status` and replace the Stop hooks with `refresh`.
///
/// An existing settings file is copied to `settings.json.backup.<unix-ms>`
/// first; every other key is preserved.
pub fn install_settings(
    settings_path: &Path,
    exe: &Path,
    now_millis: i128,
) -> eyre::Result<InstallReport> {
    let mut settings: Value = if settings_path.exists() {
        let raw = std::fs::read_to_string(settings_path).wrap_err("read Claude settings")?;
        serde_json::from_str(&raw).wrap_err("parse Claude settings")?
    } else {
        json!({})
    };

    let backup_path = if settings_path.exists() {
        let mut name = settings_path.as_os_str().to_owned();
        name.push(format!(".backup.{now_millis}"));
        let backup = PathBuf::from(name);
        std::fs::copy(settings_path, &backup).wrap_err("back up Claude settings")?;
        tracing::info!("backed up {} to {}", settings_path.display(), backup.display());
        Some(backup)
    } else {
        None
    };

    let status_command = hook_command(exe, "status");
    let refresh_command = hook_command(exe, "refresh");

    let root = settings
        .as_object_mut()
        .ok_or_else(|| eyre::eyre!("Claude settings is not a JSON object"))?;
    root.insert(
        "statusLine".to_string(),
        json!({
            "type": "command",
            "command": status_command,
            "padding": 0
        }),
    );

    let hooks = root.entry("hooks").or_insert_with(|| json!({}));
    let hooks = hooks
        .as_object_mut()
        .ok_or_else(|| eyre::eyre!("Claude settings `hooks` is not an object"))?;
    hooks.insert(
        "Stop".to_string(),
        json!([{
            "hooks": [{
                "type": "command",
                "command": refresh_command
            }]
        }]),
    );

    if let Some(parent) = settings_path.parent() {
        std::fs::create_dir_all(parent).wrap_err("create .claude directory")?;
    }
    let output = serde_json::to_string_pretty(&settings).wrap_err("serialize Claude settings")?;
    std::fs::write(settings_path, output).wrap_err("write Claude settings")?;

    Ok(InstallReport {
        settings_path: settings_path.to_path_buf(),
        backup_path,
        status_command,
        refresh_command,
    })
}

/// Store a cookie and persist the reset defaults alongside it.
pub fn store_cookie(store: &ConfigStore, cookie: &str) -> eyre::Result<()> {
    let cookie = cookie.trim();
    if cookie.is_empty() {
        return Err(eyre::eyre!("cookie must not be empty"));
    }
    let mut doc = store.load();
    doc.cookies = Some(cookie.to_string());
    doc.materialize_reset_defaults();
    store.try_save(&doc).wrap_err("save cookie")
}
