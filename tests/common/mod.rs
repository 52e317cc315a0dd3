#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use credit_statusline::ambient::AmbientContext;
use credit_statusline::config::AppConfig;
use credits_http_client::CreditsApi;
use models::CreditsPayload;
use serde_json::Value;

/// In-memory provider that counts every remote call.
#[derive(Default)]
pub struct FakeApi {
    pub credits_body: Mutex<Option<Value>>,
    pub reset_accepted: bool,
    pub fetch_calls: AtomicUsize,
    pub reset_calls: AtomicUsize,
    pub last_cookie: Mutex<Option<String>>,
}

impl FakeApi {
    pub fn returning(body: Value) -> Self {
        Self {
            credits_body: Mutex::new(Some(body)),
            reset_accepted: true,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    pub fn set_body(&self, body: Option<Value>) {
        *self.credits_body.lock().unwrap() = body;
    }
}

impl CreditsApi for FakeApi {
    async fn fetch_credits(&self, cookies: &str) -> eyre::Result<CreditsPayload> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_cookie.lock().unwrap() = Some(cookies.to_string());
        let body = self.credits_body.lock().unwrap().clone();
        body.map(CreditsPayload::new)
            .ok_or_else(|| eyre::eyre!("credits endpoint returned HTTP 401 Unauthorized"))
    }

    async fn trigger_reset(&self, cookies: &str) -> eyre::Result<bool> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_cookie.lock().unwrap() = Some(cookies.to_string());
        Ok(self.reset_accepted)
    }
}

pub fn provider_ambient(cwd: &std::path::Path) -> AmbientContext {
    AmbientContext {
        base_url: Some("https://www.claudecode-cn.com".to_string()),
        model: Some("claude-sonnet-4-20250514".to_string()),
        output_style: Some("default".to_string()),
        home_dir: None,
        cwd: Some(cwd.to_path_buf()),
    }
}

pub fn app_config(dir: &std::path::Path) -> AppConfig {
    AppConfig::with_config_path(dir.join("statusline").join("aicodemirror-config.json"))
}
