use std::future::Future;
use std::time::Duration;

use eyre::WrapErr;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{StatusCode, Url};

use models::CreditsPayload;

pub const DEFAULT_BASE_URL: &str = "https://www.claudecode-cn.com";
pub const CREDITS_PATH: &str = "/api/user/credits";
pub const RESET_PATH: &str = "/api/user/credit-reset";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(5);

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Remote operations against the credits provider.
///
/// Implementations make exactly one attempt per call; callers decide how a
/// failure degrades.
pub trait CreditsApi {
    /// `GET /api/user/credits`. Only a 200 with a JSON body is `Ok`.
    fn fetch_credits(
        &self,
        cookies: &str,
    ) -> impl Future<Output = eyre::Result<CreditsPayload>> + Send;

    /// `POST /api/user/credit-reset`. `Ok(true)` means the server answered 200.
    fn trigger_reset(&self, cookies: &str) -> impl Future<Output = eyre::Result<bool>> + Send;
}

#[derive(Debug, Clone)]
pub struct CreditsClient {
    base_url: Url,
    fetch_timeout: Duration,
    reset_timeout: Duration,
    client: reqwest::Client,
}

impl CreditsClient {
    pub fn new(base_url: &str) -> eyre::Result<Self> {
        Self::with_timeouts(base_url, DEFAULT_FETCH_TIMEOUT, DEFAULT_RESET_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: &str,
        fetch_timeout: Duration,
        reset_timeout: Duration,
    ) -> eyre::Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .wrap_err_with(|| format!("parse api base url: {base_url}"))?;
        let client = reqwest::Client::builder()
            .default_headers(default_headers())
            .build()
            .wrap_err("build reqwest client")?;

        Ok(Self {
            base_url,
            fetch_timeout,
            reset_timeout,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> eyre::Result<Url> {
        self.base_url
            .join(path)
            .wrap_err_with(|| format!("resolve endpoint {path}"))
    }
}

impl CreditsApi for CreditsClient {
    async fn fetch_credits(&self, cookies: &str) -> eyre::Result<CreditsPayload> {
        let url = self.endpoint(CREDITS_PATH)?;
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::COOKIE, cookie_header(cookies)?)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| describe_send_error(e, "GET credits"))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(eyre::eyre!("credits endpoint returned HTTP {status}"));
        }

        let body = resp.bytes().await.wrap_err("read credits body")?;
        let value: serde_json::Value =
            serde_json::from_slice(&body).wrap_err("parse credits body as json")?;
        if !value.is_object() {
            return Err(eyre::eyre!("credits body is not a json object: {value}"));
        }
        tracing::debug!("credits fetched ({} bytes)", body.len());
        Ok(CreditsPayload::new(value))
    }

    async fn trigger_reset(&self, cookies: &str) -> eyre::Result<bool> {
        let url = self.endpoint(RESET_PATH)?;
        let resp = self
            .client
            .post(url)
            .header(reqwest::header::COOKIE, cookie_header(cookies)?)
            .header(HeaderName::from_static("priority"), "u=1, i")
            .timeout(self.reset_timeout)
            .send()
            .await
            .map_err(|e| describe_send_error(e, "POST credit reset"))?;

        let status = resp.status();
        if status == StatusCode::OK {
            tracing::info!("credit reset accepted");
        } else {
            tracing::warn!("credit reset rejected: HTTP {status}");
        }
        Ok(status == StatusCode::OK)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_static(USER_AGENT),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static("application/json"),
    );
    headers
}

fn cookie_header(cookies: &str) -> eyre::Result<HeaderValue> {
    HeaderValue::from_str(cookies).map_err(|_| eyre::eyre!("cookie is not a valid header value"))
}

fn describe_send_error(err: reqwest::Error, what: &str) -> eyre::Report {
    if err.is_timeout() {
        eyre::eyre!("{what}: request timed out")
    } else {
        eyre::Report::new(err).wrap_err(format!("{what}: request failed"))
    }
}
