use models::CreditsPayload;

pub const PURPLE: &str = "\x1b[35m";
pub const RESET: &str = "\x1b[0m";

/// Marker shown when no usable cookie/balance is available.
pub const NEEDS_COOKIE_MARKER: &str = "🍪";
const NEEDS_COOKIE_TEXT: &str = "🍪 Cookie required";
const PARSE_FAILED_TEXT: &str = "🔴 Parse failed";
const ERROR_TEXT: &str = "🔴 Error";
const COST_HINT: &str = "💰/cost";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitStatus {
    pub branch: String,
    pub modified_files: usize,
}

/// Everything besides the balance that goes on the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusContext {
    pub model: String,
    pub output_style: String,
    pub git: Option<GitStatus>,
    pub workspace: String,
    pub show_cost_hint: bool,
}

/// Render the status line for the provider.
///
/// `None` yields the cookie-required variant; a payload whose fields cannot
/// be interpreted yields the parse-failed variant.
pub fn format_display(data: Option<&CreditsPayload>, ctx: &StatusContext) -> String {
    let head = match data {
        None => NEEDS_COOKIE_TEXT.to_string(),
        Some(payload) => match payload.summary() {
            Ok(summary) => format!("{} {}", summary.plan.icon(), summary.credits),
            Err(e) => {
                tracing::warn!("unreadable credits payload: {e:#}");
                PARSE_FAILED_TEXT.to_string()
            }
        },
    };

    let mut line = format!("{PURPLE}{head}({})", ctx.model);
    line.push_str(&format!(" | {}", ctx.output_style));
    if ctx.show_cost_hint {
        line.push_str(&format!(" | {COST_HINT}"));
    }
    if let Some(git) = &ctx.git {
        line.push_str(&format!(" | {}({})", git.branch, git.modified_files));
    }
    line.push_str(&format!(" | {}", ctx.workspace));
    line.push_str(RESET);
    line
}

/// Line shown when the provider is not in use.
pub fn format_plain(model: &str, url: &str) -> String {
    format!("{model} | {url}")
}

/// Line shown when the status path itself failed.
pub fn format_error(model: &str, url: &str) -> String {
    format!("{ERROR_TEXT} | {model} | {url}")
}
