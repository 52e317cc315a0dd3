use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::CreditsPayload;

pub const DEFAULT_CREDIT_THRESHOLD: i64 = 1000;
pub const DEFAULT_AUTO_RESET_ENABLED: bool = true;

/// The persisted settings file, which doubles as the credits cache.
///
/// Keys this tool does not know about are kept in `extra` so that a
/// load/save cycle never drops them. Known keys are read leniently: a key
/// holding the wrong type reads as absent instead of failing the whole file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct ConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,

    #[serde(
        rename = "creditThreshold",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub credit_threshold: Option<i64>,

    #[serde(
        rename = "autoResetEnabled",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_reset_enabled: Option<bool>,

    #[serde(
        rename = "credits_cache",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub credits_cache: Option<CreditsCache>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Single-slot cache entry. `timestamp` is unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditsCache {
    pub data: CreditsPayload,
    #[serde(default)]
    pub timestamp: f64,
}

impl CreditsCache {
    pub fn new(data: CreditsPayload, timestamp: f64) -> Self {
        Self { data, timestamp }
    }

    /// Lenient read of an on-disk entry. Without an object holding non-null
    /// `data` there is no entry; a missing or non-numeric `timestamp` reads as 0.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut entry) = value else {
            return None;
        };
        let data = entry.remove("data").filter(|d| !d.is_null())?;
        let timestamp = entry
            .get("timestamp")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        Some(Self::new(CreditsPayload::new(data), timestamp))
    }

    /// Fresh strictly while `now - timestamp < ttl_secs`.
    pub fn is_fresh(&self, now: f64, ttl_secs: f64) -> bool {
        now - self.timestamp < ttl_secs
    }
}

impl From<Map<String, Value>> for ConfigDocument {
    fn from(mut map: Map<String, Value>) -> Self {
        let cookies = match map.remove("cookies") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        let credit_threshold = map
            .remove("creditThreshold")
            .as_ref()
            .and_then(threshold_from_value);
        let auto_reset_enabled = map.remove("autoResetEnabled").and_then(|v| v.as_bool());
        let credits_cache = map.remove("credits_cache").and_then(CreditsCache::from_value);

        Self {
            cookies,
            credit_threshold,
            auto_reset_enabled,
            credits_cache,
            extra: map,
        }
    }
}

/// Fractional thresholds round up: balances are whole numbers, so
/// `credits < t` and `credits < ceil(t)` agree.
fn threshold_from_value(value: &Value) -> Option<i64> {
    if let Some(t) = value.as_i64() {
        return Some(t);
    }
    value
        .as_f64()
        .filter(|t| t.is_finite())
        .map(|t| t.ceil() as i64)
}

impl ConfigDocument {
    /// Stored cookie, if it is non-empty.
    pub fn cookie(&self) -> Option<&str> {
        self.cookies.as_deref().filter(|c| !c.is_empty())
    }

    /// A zero threshold counts as unset.
    pub fn effective_threshold(&self) -> i64 {
        match self.credit_threshold {
            Some(t) if t != 0 => t,
            _ => DEFAULT_CREDIT_THRESHOLD,
        }
    }

    pub fn effective_auto_reset(&self) -> bool {
        self.auto_reset_enabled.unwrap_or(DEFAULT_AUTO_RESET_ENABLED)
    }

    /// Write the reset defaults into the document so the next save persists them.
    pub fn materialize_reset_defaults(&mut self) {
        self.credit_threshold = Some(self.effective_threshold());
        self.auto_reset_enabled = Some(self.effective_auto_reset());
    }
}
