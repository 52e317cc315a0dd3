use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "credit-statusline")]
#[command(about = "Credit balance status line for Claude Code (claudecode-cn.com)")]
#[command(arg_required_else_help = true)]
pub struct RootArgs {
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "Path to the settings/cache JSON (default: ~/.claude/statusline/aicodemirror-config.json)"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Print the status line (cached credits, model, git, workspace)")]
    Status,
    #[command(about = "Force-refresh the credits cache and auto-reset below threshold (silent)")]
    Refresh,
    #[command(
        about = "Store the session cookie and test it",
        after_help = "Steps:\n  1. Log in at https://www.claudecode-cn.com/dashboard\n  2. F12 -> Network -> reload -> select /api/user/credits\n  3. Copy the Cookie request header value\n  4. credit-statusline save-cookie '<cookie>'"
    )]
    SaveCookie {
        #[arg(value_name = "COOKIE", help = "Cookie header value copied from the browser")]
        cookie: String,
    },
    #[command(about = "Register the status line and Stop hook in Claude Code settings.json")]
    Install {
        #[arg(long, value_name = "COOKIE", help = "Also store this cookie")]
        cookie: Option<String>,

        #[arg(
            long,
            value_name = "FILE",
            help = "Claude Code settings file (default: ~/.claude/settings.json)"
        )]
        settings: Option<PathBuf>,
    },
}
