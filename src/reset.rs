use credits_http_client::CreditsApi;
use models::{ConfigDocument, CreditsPayload};

/// What the threshold check decided. The POST result itself is not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetDecision {
    Disabled,
    AboveThreshold,
    UnreadableBalance,
    NoCookie,
    Triggered,
}

/// Fire a credit reset when the balance is below the configured threshold.
///
/// Always writes the threshold/auto-reset defaults into `doc` first. There is
/// no debounce: every call below threshold posts again.
pub async fn check_and_trigger_reset<A: CreditsApi>(
    api: &A,
    doc: &mut ConfigDocument,
    credits: &CreditsPayload,
) -> ResetDecision {
    doc.materialize_reset_defaults();

    if !doc.effective_auto_reset() {
        return ResetDecision::Disabled;
    }

    let balance = match credits.credits() {
        Ok(balance) => balance,
        Err(e) => {
            tracing::warn!("skipping credit reset check: {e:#}");
            return ResetDecision::UnreadableBalance;
        }
    };
    let threshold = doc.effective_threshold();
    if balance >= threshold {
        return ResetDecision::AboveThreshold;
    }

    let Some(cookies) = doc.cookie() else {
        return ResetDecision::NoCookie;
    };

    tracing::info!("credits {balance} below threshold {threshold}, requesting reset");
    if let Err(e) = api.trigger_reset(cookies).await {
        tracing::error!("credit reset failed: {e:#}");
    }
    ResetDecision::Triggered
}
