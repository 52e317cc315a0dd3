use std::io::Write;

use credits_http_client::{CreditsApi, CreditsClient};
use eyre::WrapErr;
use models::Plan;

use crate::ambient::AmbientContext;
use crate::config::AppConfig;
use crate::credits::CreditFetcher;
use crate::display;
use crate::reset::{check_and_trigger_reset, ResetDecision};
use crate::store::ConfigStore;

pub fn build_client(config: &AppConfig) -> eyre::Result<CreditsClient> {
    CreditsClient::with_timeouts(
        &config.api_base_url,
        config.fetch_timeout,
        config.reset_timeout,
    )
    .wrap_err("initialize http client")
}

/// `status`: never fails; errors degrade to the error line.
pub async fn run_status(config: &AppConfig, ambient: &AmbientContext) -> String {
    match build_client(config) {
        Ok(client) => status_line(config, ambient, &client, true).await,
        Err(e) => {
            tracing::error!("status line failed: {e:#}");
            error_line(config, ambient)
        }
    }
}

pub fn error_line(config: &AppConfig, ambient: &AmbientContext) -> String {
    display::format_error(
        &ambient.current_model(&config.provider_domain),
        &ambient.display_url(&config.provider_domain),
    )
}

pub async fn status_line<A: CreditsApi>(
    config: &AppConfig,
    ambient: &AmbientContext,
    api: &A,
    use_cache: bool,
) -> String {
    let domain = &config.provider_domain;
    if !ambient.uses_provider(domain) {
        return display::format_plain(&ambient.current_model(domain), &ambient.display_url(domain));
    }

    let store = ConfigStore::new(config.config_path());
    let doc = store.load();
    let credits = CreditFetcher::new(api, &store, config.cache_duration)
        .get_credits(doc.cookie(), use_cache)
        .await;

    let ctx = ambient.status_context(config).await;
    display::format_display(credits.as_ref(), &ctx)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    NotUsingProvider,
    NoCookie,
    FetchFailed,
    Refreshed(ResetDecision),
}

/// `refresh`: silent cache refresh followed by the threshold check.
pub async fn run_refresh(config: &AppConfig, ambient: &AmbientContext) -> RefreshOutcome {
    if !ambient.uses_provider(&config.provider_domain) {
        return RefreshOutcome::NotUsingProvider;
    }
    match build_client(config) {
        Ok(client) => refresh(config, ambient, &client).await,
        Err(e) => {
            tracing::error!("refresh failed: {e:#}");
            RefreshOutcome::FetchFailed
        }
    }
}

pub async fn refresh<A: CreditsApi>(
    config: &AppConfig,
    ambient: &AmbientContext,
    api: &A,
) -> RefreshOutcome {
    if !ambient.uses_provider(&config.provider_domain) {
        return RefreshOutcome::NotUsingProvider;
    }

    let store = ConfigStore::new(config.config_path());
    let mut doc = store.load();
    let Some(cookies) = doc.cookie().map(str::to_string) else {
        return RefreshOutcome::NoCookie;
    };

    let fetcher = CreditFetcher::new(api, &store, config.cache_duration);
    let Some(entry) = fetcher.fetch_entry(&cookies).await else {
        return RefreshOutcome::FetchFailed;
    };

    let credits = entry.data.clone();
    doc.credits_cache = Some(entry);
    let decision = check_and_trigger_reset(api, &mut doc, &credits).await;
    store.save(&doc);

    tracing::debug!("credits refreshed, reset decision: {decision:?}");
    RefreshOutcome::Refreshed(decision)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieVerdict {
    Valid,
    Invalid,
    Inconclusive,
}

impl CookieVerdict {
    pub fn classify(status_line: &str) -> Self {
        if status_line.contains(display::NEEDS_COOKIE_MARKER) {
            Self::Invalid
        } else if Plan::known_icons()
            .iter()
            .any(|icon| status_line.contains(icon))
        {
            Self::Valid
        } else {
            Self::Inconclusive
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveCookieOutcome {
    Empty,
    SaveFailed,
    Saved(CookieVerdict),
}

/// `save-cookie`: persist the cookie, then run the status path once to test it.
pub async fn save_cookie<A: CreditsApi, W: Write>(
    config: &AppConfig,
    ambient: &AmbientContext,
    api: &A,
    cookie: &str,
    out: &mut W,
) -> eyre::Result<SaveCookieOutcome> {
    let cookie = cookie.trim();
    if cookie.is_empty() {
        writeln!(out, "❌ Cookie must not be empty")?;
        return Ok(SaveCookieOutcome::Empty);
    }

    let store = ConfigStore::new(config.config_path());
    let mut doc = store.load();
    doc.cookies = Some(cookie.to_string());
    if let Err(e) = store.try_save(&doc) {
        writeln!(out, "❌ Failed to save cookie: {e:#}")?;
        return Ok(SaveCookieOutcome::SaveFailed);
    }

    writeln!(out, "✅ Cookie saved to: {}", store.path().display())?;
    writeln!(out, "📏 Cookie length: {} characters", cookie.chars().count())?;
    writeln!(out)?;
    writeln!(out, "🧪 Testing...")?;

    // Bypass the cache so a balance fetched with a previous cookie cannot pass the test.
    let line = status_line(config, ambient, api, false).await;
    writeln!(out, "Test result: {line}")?;

    let verdict = CookieVerdict::classify(&line);
    match verdict {
        CookieVerdict::Invalid => writeln!(out, "❌ Cookie is invalid, please copy it again")?,
        CookieVerdict::Valid => {
            writeln!(out, "✅ Test passed!")?;
            writeln!(out, "🎉 Restart Claude Code to see credits in the status line")?;
        }
        CookieVerdict::Inconclusive => {
            writeln!(out, "⚠️ Unexpected output, but the cookie was saved")?
        }
    }
    Ok(SaveCookieOutcome::Saved(verdict))
}

pub async fn run_save_cookie<W: Write>(
    config: &AppConfig,
    ambient: &AmbientContext,
    cookie: &str,
    out: &mut W,
) -> eyre::Result<SaveCookieOutcome> {
    let client = build_client(config)?;
    save_cookie(config, ambient, &client, cookie, out).await
}
