use clap::Parser;
use screener_core::ingest::history::HttpJsonHistoryProvider;
use screener_core::ingest::symbols::CsvSymbolSource;
use screener_core::notify::telegram::TelegramNotifier;
use screener_core::notify::Notifier;
use screener_core::report;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod screen;

#[derive(Debug, Parser)]
#[command(name = "screener_worker")]
struct Args {
    /// Market as-of date (YYYY-MM-DD). Defaults to the latest completed
    /// IST trading day.
    #[arg(long)]
    as_of_date: Option<String>,

    /// Do everything except sending the Telegram message.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = screener_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let as_of_date =
        screener_core::time::market::resolve_run_date(args.as_of_date.as_deref(), chrono::Utc::now())?;

    let notifier = TelegramNotifier::from_settings(&settings)?;
    let symbols = CsvSymbolSource::from_settings(&settings)?;
    let history = HttpJsonHistoryProvider::from_settings(&settings)?;

    // Single outer error boundary: any fault that escapes the run is
    // reported through the same channel the run delivers to, then
    // swallowed. There is no further escalation path.
    if let Err(err) = screen::run_screen(&symbols, &history, &notifier, as_of_date, args.dry_run).await
    {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(%as_of_date, error = %err, "screening run failed");

        if !args.dry_run {
            if let Err(send_err) = notifier.send(&report::error_report(&err)).await {
                tracing::warn!(error = %send_err, "failed to deliver error report");
            }
        }
    }

    Ok(())
}

fn init_sentry(settings: &screener_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
