use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One end-of-day observation for a single instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// Daily closes for one symbol, chronologically ascending.
/// Fetched fresh each run; never cached or persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub closes: Vec<DailyClose>,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().map(|c| c.close)
    }
}

/// Per-symbol output of one screening run.
///
/// `score` is `None` when either momentum return could not be computed
/// (too few sessions for the offset, or a non-finite blend); such results
/// are excluded from ranking rather than treated as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub symbol: String,
    pub score: Option<f64>,
    pub breakout: bool,
}
