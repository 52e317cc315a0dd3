use clap::Parser;
use eyre::WrapErr;

use credit_statusline::ambient::AmbientContext;
use credit_statusline::cli::{Command, RootArgs};
use credit_statusline::commands;
use credit_statusline::config::{self, AppConfig};
use credit_statusline::display;
use credit_statusline::install;
use credit_statusline::store::ConfigStore;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = RootArgs::parse();
    let ambient = AmbientContext::from_env();
    let app_config = AppConfig::from_args(&args);

    match args.command {
        Command::Status => {
            let line = match &app_config {
                Ok(app_config) => commands::run_status(app_config, &ambient).await,
                Err(e) => {
                    tracing::error!("load config: {e:#}");
                    display::format_error(
                        &ambient.current_model(config::PROVIDER_DOMAIN),
                        &ambient.display_url(config::PROVIDER_DOMAIN),
                    )
                }
            };
            println!("{line}");
        }
        Command::Refresh => match &app_config {
            Ok(app_config) => {
                let outcome = commands::run_refresh(app_config, &ambient).await;
                tracing::debug!("refresh finished: {outcome:?}");
            }
            Err(e) => tracing::error!("load config: {e:#}"),
        },
        Command::SaveCookie { cookie } => {
            let app_config = match app_config {
                Ok(app_config) => app_config,
                Err(e) => {
                    println!("❌ Failed to save cookie: {e:#}");
                    return Ok(());
                }
            };
            let mut stdout = std::io::stdout().lock();
            if let Err(e) =
                commands::run_save_cookie(&app_config, &ambient, &cookie, &mut stdout).await
            {
                println!("❌ Failed to save cookie: {e:#}");
            }
        }
        Command::Install { cookie, settings } => {
            let app_config = app_config.wrap_err("load config")?;
            let settings_path = match settings {
                Some(path) => path,
                None => config::claude_dir()?.join("settings.json"),
            };
            let exe = std::env::current_exe().wrap_err("locate current executable")?;
            let now_millis = time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;

            let report = install::install_settings(&settings_path, &exe, now_millis)
                .wrap_err("configure Claude Code settings")?;
            if let Some(backup) = &report.backup_path {
                println!("✅ Backup saved to: {}", backup.display());
            }
            println!("✅ {} configured", report.settings_path.display());
            println!("   statusLine: {}", report.status_command);
            println!("   Stop hook:  {}", report.refresh_command);

            match cookie {
                Some(cookie) => {
                    let store = ConfigStore::new(app_config.config_path());
                    install::store_cookie(&store, &cookie)?;
                    println!("✅ Cookie saved to: {}", store.path().display());
                }
                None => println!(
                    "ℹ️  Store a cookie with: {}",
                    install::hook_command(&exe, "save-cookie '<cookie>'")
                ),
            }
            println!("🎉 Restart Claude Code to see the status line");
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
