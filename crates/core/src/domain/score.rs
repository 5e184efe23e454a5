use crate::domain::series::{PriceSeries, ScoreResult};

/// Minimum number of daily closes required before a symbol is scored at all.
pub const MIN_HISTORY: usize = 60;

/// Trading-session offsets for the two momentum legs.
pub const ONE_MONTH_SESSIONS: usize = 21;
pub const THREE_MONTH_SESSIONS: usize = 63;

/// Lookback window for the breakout check (excluding the latest close).
pub const BREAKOUT_WINDOW: usize = 60;

/// How many ranked symbols go into the daily report.
pub const TOP_N: usize = 10;

const MOMENTUM_WEIGHT: f64 = 50.0;

/// Score one symbol's history, or `None` when the series is too short.
///
/// A short series (< 60 closes) is not an error; the symbol is simply
/// dropped from the run. A series long enough to score but too short for
/// the 63-session leg yields a result with `score: None`, which ranking
/// filters out.
pub fn score(series: &PriceSeries) -> Option<ScoreResult> {
    if series.len() < MIN_HISTORY {
        return None;
    }

    let closes: Vec<f64> = series.closes.iter().map(|c| c.close).collect();

    let one_month = trailing_return(&closes, ONE_MONTH_SESSIONS);
    let three_month = trailing_return(&closes, THREE_MONTH_SESSIONS);

    let score = match (one_month, three_month) {
        (Some(m1), Some(m3)) => {
            let blended = m1 * MOMENTUM_WEIGHT + m3 * MOMENTUM_WEIGHT;
            blended.is_finite().then_some(blended)
        }
        _ => None,
    };

    Some(ScoreResult {
        symbol: series.symbol.clone(),
        score,
        breakout: is_breakout(&closes),
    })
}

/// Percent change between the close `sessions` trading days ago and the
/// most recent close. `None` when the series is too short for the offset
/// or the base close is unusable.
fn trailing_return(closes: &[f64], sessions: usize) -> Option<f64> {
    let len = closes.len();
    if len < sessions + 1 {
        return None;
    }

    let latest = closes[len - 1];
    let base = closes[len - 1 - sessions];
    if base == 0.0 || !base.is_finite() || !latest.is_finite() {
        return None;
    }

    Some(latest / base - 1.0)
}

/// True when the latest close strictly exceeds the highest of the up to 60
/// preceding closes, i.e. a fresh 60-session high was made today.
fn is_breakout(closes: &[f64]) -> bool {
    let len = closes.len();
    if len < 2 {
        return false;
    }

    let latest = closes[len - 1];
    let window_start = len.saturating_sub(BREAKOUT_WINDOW + 1);
    let prior_high = closes[window_start..len - 1]
        .iter()
        .fold(f64::NEG_INFINITY, |acc, &c| acc.max(c));

    latest > prior_high
}

/// Rank a run's results: drop anything without a finite score, sort
/// descending, keep the top `n`. The sort is stable, so symbols with equal
/// scores keep their original relative order.
pub fn select_top(results: Vec<ScoreResult>, n: usize) -> Vec<ScoreResult> {
    let mut ranked: Vec<ScoreResult> = results
        .into_iter()
        .filter(|r| r.score.is_some_and(f64::is_finite))
        .collect();

    ranked.sort_by(|a, b| {
        let (sa, sb) = (a.score.unwrap_or(f64::NAN), b.score.unwrap_or(f64::NAN));
        sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
    });

    ranked.truncate(n);
    ranked
}
