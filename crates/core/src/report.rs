use crate::domain::series::ScoreResult;

const TITLE: &str = "📊 DAILY TOP 10";
const BREAKOUT_MARKER: &str = " 🔥 Breakout";

/// Render the ranked results into the daily Telegram message.
/// Pure formatting; the input is assumed already filtered and sorted.
pub fn format_report(date: &str, top: &[ScoreResult]) -> String {
    let mut out = format!("{TITLE}\n📅 {date}\n\n");

    for result in top {
        let score = result.score.unwrap_or(f64::NAN);
        out.push_str(&format!("{} | Score: {:.2}", result.symbol, score));
        if result.breakout {
            out.push_str(BREAKOUT_MARKER);
        }
        out.push('\n');
    }

    out
}

pub fn no_data_notice() -> String {
    "⚠️ Screener: No data processed today.".to_string()
}

pub fn no_valid_scores_notice() -> String {
    "⚠️ Screener: No valid stocks processed today.".to_string()
}

/// Diagnostic payload for the run-level error boundary. `{:#}` keeps the
/// full anyhow context chain in the message.
pub fn error_report(err: &anyhow::Error) -> String {
    format!("❌ Screener Error:\n{err:#}")
}
