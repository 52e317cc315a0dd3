use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

pub mod config;

pub use config::{ConfigDocument, CreditsCache};

/// Service tier reported by the credits endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, Display)]
pub enum Plan {
    #[strum(serialize = "ULTRA")]
    Ultra,
    #[strum(serialize = "MAX")]
    Max,
    #[strum(serialize = "PRO")]
    Pro,
    #[strum(serialize = "FREE")]
    Free,
    #[strum(default)]
    Unknown(String),
}

impl Plan {
    pub const UNKNOWN_ICON: &'static str = "❓";

    /// Parse a tier name; names outside the known set become `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name.parse() {
            Ok(plan) => plan,
            // unreachable while `Unknown` is the strum default
            Err(_) => Self::Unknown(name.to_string()),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Ultra => "👑",
            Self::Max => "💎",
            Self::Pro => "⭐",
            Self::Free => "🆓",
            Self::Unknown(_) => Self::UNKNOWN_ICON,
        }
    }

    /// Icons of every known tier, used to recognise a successful status line.
    pub fn known_icons() -> [&'static str; 4] {
        [
            Self::Ultra.icon(),
            Self::Max.icon(),
            Self::Pro.icon(),
            Self::Free.icon(),
        ]
    }
}

/// Raw body of a successful credits response.
///
/// Kept as the literal JSON value so the cache always stores exactly what the
/// server sent; interpretation happens in [`CreditsPayload::summary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditsPayload(pub Value);

/// Interpreted view of a [`CreditsPayload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditsSummary {
    pub credits: i64,
    pub plan: Plan,
}

impl CreditsPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Balance as a whole number. Missing or null reads as 0.
    pub fn credits(&self) -> eyre::Result<i64> {
        let obj = self
            .0
            .as_object()
            .ok_or_else(|| eyre::eyre!("credits payload is not an object"))?;
        match obj.get("credits") {
            None | Some(Value::Null) => Ok(0),
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_i64() {
                    Ok(v)
                } else if let Some(v) = n.as_f64() {
                    Ok(v.trunc() as i64)
                } else {
                    Err(eyre::eyre!("credits out of range: {n}"))
                }
            }
            Some(other) => Err(eyre::eyre!("credits is not a number: {other}")),
        }
    }

    /// Tier name. Missing or null reads as FREE.
    pub fn plan(&self) -> eyre::Result<Plan> {
        let obj = self
            .0
            .as_object()
            .ok_or_else(|| eyre::eyre!("credits payload is not an object"))?;
        match obj.get("plan") {
            None | Some(Value::Null) => Ok(Plan::Free),
            Some(Value::String(s)) if s.is_empty() => Ok(Plan::Free),
            Some(Value::String(s)) => Ok(Plan::from_name(s)),
            Some(other) => Err(eyre::eyre!("plan is not a string: {other}")),
        }
    }

    pub fn summary(&self) -> eyre::Result<CreditsSummary> {
        Ok(CreditsSummary {
            credits: self.credits()?,
            plan: self.plan()?,
        })
    }
}
