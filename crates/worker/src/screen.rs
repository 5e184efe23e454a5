use chrono::NaiveDate;
use screener_core::domain::score::{score, select_top, TOP_N};
use screener_core::domain::series::ScoreResult;
use screener_core::ingest::history::HistoryProvider;
use screener_core::ingest::symbols::SymbolSource;
use screener_core::notify::Notifier;
use screener_core::report;
use screener_core::time::market::format_run_date;

/// One full screening run: universe -> per-symbol scores -> top 10 ->
/// Telegram. Symbols are processed strictly sequentially; per-symbol
/// faults degrade to "skipped" and never abort the batch. Anything that
/// escapes this function is handled by the caller's error boundary.
pub async fn run_screen(
    symbols: &dyn SymbolSource,
    history: &dyn HistoryProvider,
    notifier: &dyn Notifier,
    as_of_date: NaiveDate,
    dry_run: bool,
) -> anyhow::Result<()> {
    let universe = symbols.fetch_symbols().await?;
    tracing::info!(%as_of_date, universe_len = universe.len(), "fetched symbol universe");

    if universe.is_empty() {
        deliver(notifier, &report::no_data_notice(), dry_run).await;
        return Ok(());
    }

    let results = score_universe(history, &universe, as_of_date).await;
    let top = select_top(results, TOP_N);

    if top.is_empty() {
        deliver(notifier, &report::no_valid_scores_notice(), dry_run).await;
        return Ok(());
    }

    let message = report::format_report(&format_run_date(as_of_date), &top);
    tracing::info!(ranked = top.len(), "formatted daily report");
    deliver(notifier, &message, dry_run).await;

    Ok(())
}

async fn score_universe(
    history: &dyn HistoryProvider,
    universe: &[String],
    as_of_date: NaiveDate,
) -> Vec<ScoreResult> {
    let mut results = Vec::new();

    for symbol in universe {
        let series = match history.fetch_history(symbol, as_of_date).await {
            Ok(series) => series,
            Err(err) => {
                tracing::warn!(%symbol, error = %err, "history fetch failed; skipping symbol");
                continue;
            }
        };

        match score(&series) {
            Some(result) => results.push(result),
            None => {
                tracing::debug!(%symbol, closes = series.len(), "insufficient history; skipping symbol");
            }
        }
    }

    results
}

/// Outbound delivery is best-effort: a notifier fault is logged and
/// swallowed, since the message is itself the escalation path.
async fn deliver(notifier: &dyn Notifier, text: &str, dry_run: bool) {
    if dry_run {
        tracing::info!(dry_run = true, message = %text, "dry-run: skipping telegram delivery");
        return;
    }

    if let Err(err) = notifier.send(text).await {
        tracing::warn!(error = %err, "telegram delivery failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::NaiveDate;
    use screener_core::domain::series::{DailyClose, PriceSeries};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct StaticSymbols(Vec<&'static str>);

    #[async_trait::async_trait]
    impl SymbolSource for StaticSymbols {
        async fn fetch_symbols(&self) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct MapHistory(HashMap<&'static str, Vec<f64>>);

    #[async_trait::async_trait]
    impl HistoryProvider for MapHistory {
        fn provider_name(&self) -> &'static str {
            "map"
        }

        async fn fetch_history(&self, symbol: &str, _as_of: NaiveDate) -> Result<PriceSeries> {
            let closes = self
                .0
                .get(symbol)
                .ok_or_else(|| anyhow::anyhow!("unknown symbol {symbol}"))?;
            let start = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
            Ok(PriceSeries {
                symbol: symbol.to_string(),
                closes: closes
                    .iter()
                    .enumerate()
                    .map(|(i, &close)| DailyClose {
                        date: start + chrono::Duration::days(i as i64),
                        close,
                    })
                    .collect(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> Result<()> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait::async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _text: &str) -> Result<()> {
            anyhow::bail!("telegram HTTP 502")
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 27).unwrap()
    }

    /// 70 flat closes ending in a final jump sized so the blended momentum
    /// score comes out to `score_pct`. An old spike keeps the last close
    /// below the trailing high, so none of these count as breakouts.
    fn history_with_score(score_pct: f64) -> Vec<f64> {
        let last = 100.0 * (1.0 + score_pct / 100.0);
        let mut closes = vec![100.0; 69];
        closes[10] = 500.0;
        closes.push(last);
        closes
    }

    #[tokio::test]
    async fn ranks_valid_symbols_and_drops_short_histories() {
        let symbols = StaticSymbols(vec!["AAA", "BBB", "CCC"]);
        let history = MapHistory(HashMap::from([
            ("AAA", history_with_score(4.0)),
            ("BBB", history_with_score(7.0)),
            ("CCC", vec![100.0; 10]),
        ]));
        let notifier = RecordingNotifier::default();

        run_screen(&symbols, &history, &notifier, as_of(), false)
            .await
            .unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);

        let ranked: Vec<&str> = sent[0]
            .lines()
            .filter(|l| l.contains("| Score:"))
            .collect();
        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].starts_with("BBB"));
        assert!(ranked[1].starts_with("AAA"));
        assert!(!sent[0].contains("CCC"));
    }

    #[tokio::test]
    async fn one_failing_fetch_does_not_abort_the_batch() {
        let symbols = StaticSymbols(vec!["GONE", "AAA"]);
        let history = MapHistory(HashMap::from([("AAA", history_with_score(4.0))]));
        let notifier = RecordingNotifier::default();

        run_screen(&symbols, &history, &notifier, as_of(), false)
            .await
            .unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("AAA | Score: 4.00"));
    }

    #[tokio::test]
    async fn empty_universe_sends_exactly_one_no_data_notice() {
        let symbols = StaticSymbols(vec![]);
        let history = MapHistory(HashMap::new());
        let notifier = RecordingNotifier::default();

        run_screen(&symbols, &history, &notifier, as_of(), false)
            .await
            .unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], report::no_data_notice());
    }

    #[tokio::test]
    async fn all_short_histories_send_no_valid_scores_notice() {
        let symbols = StaticSymbols(vec!["AAA", "BBB"]);
        let history = MapHistory(HashMap::from([
            ("AAA", vec![100.0; 10]),
            ("BBB", vec![100.0; 59]),
        ]));
        let notifier = RecordingNotifier::default();

        run_screen(&symbols, &history, &notifier, as_of(), false)
            .await
            .unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], report::no_valid_scores_notice());
    }

    #[tokio::test]
    async fn notifier_failure_does_not_fail_the_run() {
        let symbols = StaticSymbols(vec!["AAA"]);
        let history = MapHistory(HashMap::from([("AAA", history_with_score(4.0))]));

        let res = run_screen(&symbols, &history, &FailingNotifier, as_of(), false).await;
        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn dry_run_sends_nothing() {
        let symbols = StaticSymbols(vec!["AAA"]);
        let history = MapHistory(HashMap::from([("AAA", history_with_score(4.0))]));
        let notifier = RecordingNotifier::default();

        run_screen(&symbols, &history, &notifier, as_of(), true)
            .await
            .unwrap();

        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_symbol_source_propagates_to_the_boundary() {
        struct FailingSymbols;

        #[async_trait::async_trait]
        impl SymbolSource for FailingSymbols {
            async fn fetch_symbols(&self) -> Result<Vec<String>> {
                anyhow::bail!("symbol source HTTP 503")
            }
        }

        let history = MapHistory(HashMap::new());
        let notifier = RecordingNotifier::default();

        let res = run_screen(&FailingSymbols, &history, &notifier, as_of(), false).await;
        assert!(res.is_err());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }
}
