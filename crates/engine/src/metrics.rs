//! Headline numbers and chart series for the dashboard.
//!
//! A backend summary is preferred field by field; anything it omits (or
//! sends as a non-finite number) is computed from the stored collection.
use api_types::metrics::MetricsSummary;
use chrono::Timelike;
use chrono_tz::Tz;

use crate::{ApprovalStatus, MoneyCents, RiskLevel, Transaction};

/// Fraud rates (percent) below this are shown as healthy.
pub const HEALTHY_FRAUD_RATE: f64 = 35.0;
/// Fraud rates (percent) below this, and not healthy, are moderate.
pub const MODERATE_FRAUD_RATE: f64 = 60.0;

pub const SCORE_BUCKET_LABELS: [&str; 5] = ["0-20", "21-40", "41-60", "61-80", "81-100"];

/// Where the numbers of a snapshot came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MetricsSource {
    /// Every summary field came from the backend.
    Backend,
    #[default]
    Computed,
    Mixed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FraudRateBand {
    Healthy,
    Moderate,
    Critical,
}

impl FraudRateBand {
    pub fn from_rate(rate: f64) -> Self {
        if rate < HEALTHY_FRAUD_RATE {
            Self::Healthy
        } else if rate < MODERATE_FRAUD_RATE {
            Self::Moderate
        } else {
            Self::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Moderate => "Moderate",
            Self::Critical => "Critical",
        }
    }
}

/// One atomic set of dashboard numbers.
///
/// Built in one go by [`aggregate`] or [`compute`] and replaced wholesale by
/// the store; never patched in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub total_transactions: u64,
    pub fraud_transactions: u64,
    /// Percentage, `0.0..=100.0`.
    pub fraud_rate: f64,
    pub high_risk_transactions: u64,
    pub blocked_amount: MoneyCents,
    pub average_fraud_score: f64,
    pub low_risk_count: u64,
    pub medium_risk_count: u64,
    pub high_risk_count: u64,
    /// Counts per [`SCORE_BUCKET_LABELS`] bucket.
    pub score_distribution: [u64; 5],
    /// Fraud count per hour of day, in the display zone.
    pub fraud_by_hour: [u64; 24],
    pub source: MetricsSource,
}

impl MetricsSnapshot {
    pub fn fraud_rate_band(&self) -> FraudRateBand {
        FraudRateBand::from_rate(self.fraud_rate)
    }
}

/// Computes every field from `transactions`.
///
/// An empty slice yields an all-zero snapshot.
pub fn compute(transactions: &[Transaction], tz: Tz) -> MetricsSnapshot {
    let mut snapshot = MetricsSnapshot {
        total_transactions: transactions.len() as u64,
        ..MetricsSnapshot::default()
    };

    let mut score_sum = 0u64;
    let mut scored = 0u64;
    for tx in transactions {
        if tx.is_fraud {
            snapshot.fraud_transactions += 1;
            if let Some(time) = tx.transaction_time {
                let hour = time.with_timezone(&tz).hour() as usize;
                snapshot.fraud_by_hour[hour] += 1;
            }
        }
        match tx.risk_level {
            Some(RiskLevel::Low) => snapshot.low_risk_count += 1,
            Some(RiskLevel::Medium) => snapshot.medium_risk_count += 1,
            Some(RiskLevel::High) => snapshot.high_risk_count += 1,
            None => {}
        }
        if tx.approval_status == Some(ApprovalStatus::Blocked) {
            snapshot.blocked_amount += tx.amount;
        }
        if let Some(score) = tx.fraud_score {
            score_sum += u64::from(score);
            scored += 1;
            snapshot.score_distribution[score_bucket(score)] += 1;
        }
    }

    snapshot.high_risk_transactions = snapshot.high_risk_count;
    snapshot.fraud_rate = percentage(snapshot.fraud_transactions, snapshot.total_transactions);
    if scored > 0 {
        snapshot.average_fraud_score = score_sum as f64 / scored as f64;
    }
    snapshot
}

/// Merges a backend summary over the values computed from `transactions`.
pub fn aggregate(
    backend: Option<&MetricsSummary>,
    transactions: &[Transaction],
    tz: Tz,
) -> MetricsSnapshot {
    let mut snapshot = compute(transactions, tz);
    let Some(summary) = backend else {
        return snapshot;
    };

    let mut merged = Merge::default();
    merged.count(&mut snapshot.total_transactions, summary.total_transactions);
    merged.count(&mut snapshot.fraud_transactions, summary.fraud_transactions);
    merged.count(
        &mut snapshot.high_risk_transactions,
        summary.high_risk_transactions,
    );
    merged.count(&mut snapshot.low_risk_count, summary.low_risk_count);
    merged.count(&mut snapshot.medium_risk_count, summary.medium_risk_count);
    merged.count(&mut snapshot.high_risk_count, summary.high_risk_count);
    merged.rate(&mut snapshot.fraud_rate, summary.fraud_rate);
    merged.rate(
        &mut snapshot.average_fraud_score,
        summary.average_fraud_score.or(summary.avg_fraud_score),
    );
    match summary.blocked_amount.filter(|v| v.is_finite() && *v >= 0.0) {
        Some(amount) => {
            snapshot.blocked_amount = MoneyCents::from_major(amount);
            merged.backend += 1;
        }
        None => merged.computed += 1,
    }

    snapshot.source = merged.source();
    tracing::debug!(source = ?snapshot.source, "metrics aggregated");
    snapshot
}

#[derive(Default)]
struct Merge {
    backend: usize,
    computed: usize,
}

impl Merge {
    fn count(&mut self, field: &mut u64, value: Option<u64>) {
        match value {
            Some(value) => {
                *field = value;
                self.backend += 1;
            }
            None => self.computed += 1,
        }
    }

    fn rate(&mut self, field: &mut f64, value: Option<f64>) {
        match value.filter(|v| v.is_finite()) {
            Some(value) => {
                *field = value.max(0.0);
                self.backend += 1;
            }
            None => self.computed += 1,
        }
    }

    fn source(&self) -> MetricsSource {
        match (self.backend, self.computed) {
            (0, _) => MetricsSource::Computed,
            (_, 0) => MetricsSource::Backend,
            _ => MetricsSource::Mixed,
        }
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

fn score_bucket(score: u8) -> usize {
    match score {
        0..=20 => 0,
        21..=40 => 1,
        41..=60 => 2,
        61..=80 => 3,
        _ => 4,
    }
}
