//! Last applied transaction batch and metrics snapshot.
//!
//! Every refresh takes a [`FetchTicket`] before going to the network; a
//! completion is applied only when its ticket is newer than the one that
//! produced the current contents, so a slow early fetch can never overwrite
//! a later one.
use api_types::{metrics::MetricsSummary, transaction::TransactionRecord};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rand::Rng;

use crate::{
    MetricsSnapshot, Transaction,
    demo::{self, DemoData},
    enrichment::enrich,
    metrics,
};

/// Provenance of the stored batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DataSource {
    /// Nothing applied yet.
    #[default]
    Empty,
    Live,
    /// The backend answered with no transactions; a demo batch is shown.
    Fallback,
    /// The backend could not be reached; a demo batch is shown.
    Demo { reason: String },
}

impl DataSource {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Fallback | Self::Demo { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Empty => "Loading",
            Self::Live => "Live",
            Self::Fallback => "No data, showing samples",
            Self::Demo { .. } => "Backend unavailable, demo mode",
        }
    }
}

/// Sequence number of one refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// Both halves of a dashboard fetch, each failing independently.
///
/// `Ok(None)` means the backend answered with an empty body.
#[derive(Debug)]
pub struct FetchResult {
    pub transactions: Result<Option<Vec<TransactionRecord>>, String>,
    pub metrics: Result<Option<MetricsSummary>, String>,
}

/// A complete replacement for the store contents.
#[derive(Clone, Debug)]
pub struct StoreUpdate {
    pub transactions: Vec<Transaction>,
    pub metrics: MetricsSnapshot,
    pub source: DataSource,
    pub fetched_at: DateTime<Utc>,
}

impl StoreUpdate {
    /// Turns raw fetch results into a store update.
    ///
    /// Live records are converted and enriched, and their metrics combine the
    /// backend summary with the batch. Empty or failed transaction fetches are
    /// replaced by a demo batch whose snapshot is computed from that batch
    /// alone; the backend summary is never mixed into it.
    pub fn from_fetch<R: Rng + ?Sized>(
        result: FetchResult,
        tz: Tz,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Self {
        let records = match result.transactions {
            Ok(Some(records)) if !records.is_empty() => records,
            Ok(_) => {
                tracing::info!("backend returned no transactions, using sample batch");
                return Self::synthetic(DataSource::Fallback, tz, rng, now);
            }
            Err(reason) => {
                tracing::warn!(%reason, "transactions fetch failed, switching to demo mode");
                return Self::synthetic(DataSource::Demo { reason }, tz, rng, now);
            }
        };

        let transactions: Vec<Transaction> = records
            .into_iter()
            .map(|record| enrich(Transaction::from_record(record, tz), rng))
            .collect();
        let summary = match result.metrics {
            Ok(summary) => summary,
            Err(reason) => {
                tracing::warn!(%reason, "metrics fetch failed, computing locally");
                None
            }
        };
        let metrics = metrics::aggregate(summary.as_ref(), &transactions, tz);

        Self {
            transactions,
            metrics,
            source: DataSource::Live,
            fetched_at: now,
        }
    }

    fn synthetic<R: Rng + ?Sized>(
        source: DataSource,
        tz: Tz,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Self {
        let DemoData {
            transactions,
            metrics,
        } = demo::generate(rng, now, tz);
        Self {
            transactions,
            metrics,
            source,
            fetched_at: now,
        }
    }
}

/// Outcome of [`TransactionStore::complete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Applied {
        /// The batch holds at least one HIGH risk record and did not come
        /// from demo mode.
        high_risk: bool,
    },
    /// A newer fetch was already applied; the update was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    metrics: MetricsSnapshot,
    source: DataSource,
    last_updated: Option<DateTime<Utc>>,
    issued: u64,
    applied: u64,
    in_flight: usize,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.in_flight += 1;
        FetchTicket(self.issued)
    }

    pub fn complete(&mut self, ticket: FetchTicket, update: StoreUpdate) -> Completion {
        self.in_flight = self.in_flight.saturating_sub(1);
        if ticket.0 <= self.applied {
            tracing::debug!(
                ticket = ticket.0,
                applied = self.applied,
                "discarding stale fetch"
            );
            return Completion::Stale;
        }

        let high_risk = !matches!(update.source, DataSource::Demo { .. })
            && update.transactions.iter().any(Transaction::is_high_risk);

        tracing::debug!(
            ticket = ticket.0,
            count = update.transactions.len(),
            source = update.source.label(),
            "store updated"
        );
        self.applied = ticket.0;
        self.transactions = update.transactions;
        self.metrics = update.metrics;
        self.source = update.source;
        self.last_updated = Some(update.fetched_at);

        Completion::Applied { high_risk }
    }

    /// `true` while at least one issued ticket has not completed.
    pub fn is_fetching(&self) -> bool {
        self.in_flight > 0
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn metrics(&self) -> &MetricsSnapshot {
        &self.metrics
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }
}

#[cfg(test)]
mod tests {
    use api_types::transaction::TransactionId;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{RiskLevel, enrichment::is_consistent, metrics::MetricsSource};

    fn record(id: i64, risk: &str) -> TransactionRecord {
        TransactionRecord {
            id: Some(TransactionId::Number(id)),
            risk_level: Some(risk.to_string()),
            amount: Some(25.0),
            ..Default::default()
        }
    }

    fn update(records: Vec<TransactionRecord>) -> StoreUpdate {
        let mut rng = StdRng::seed_from_u64(1);
        StoreUpdate::from_fetch(
            FetchResult {
                transactions: Ok(Some(records)),
                metrics: Ok(None),
            },
            Tz::UTC,
            &mut rng,
            Utc::now(),
        )
    }

    #[test]
    fn live_records_are_enriched() {
        let update = update(vec![record(1, "HIGH"), record(2, "LOW")]);
        assert_eq!(update.source, DataSource::Live);
        assert_eq!(update.transactions.len(), 2);
        assert!(update.transactions.iter().all(is_consistent));
        assert!(update.transactions.iter().all(|tx| tx.device_id.is_some()));
        assert_eq!(update.metrics.total_transactions, 2);
    }

    #[test]
    fn empty_answer_falls_back_to_samples() {
        let mut rng = StdRng::seed_from_u64(1);
        for transactions in [Ok(None), Ok(Some(Vec::new()))] {
            let update = StoreUpdate::from_fetch(
                FetchResult {
                    transactions,
                    metrics: Ok(None),
                },
                Tz::UTC,
                &mut rng,
                Utc::now(),
            );
            assert_eq!(update.source, DataSource::Fallback);
            assert_eq!(update.transactions.len(), demo::DEMO_BATCH_SIZE);
        }
    }

    #[test]
    fn failure_switches_to_demo_and_keeps_reason() {
        let mut rng = StdRng::seed_from_u64(1);
        let update = StoreUpdate::from_fetch(
            FetchResult {
                transactions: Err("connection refused".to_string()),
                metrics: Err("connection refused".to_string()),
            },
            Tz::UTC,
            &mut rng,
            Utc::now(),
        );
        assert_eq!(
            update.source,
            DataSource::Demo {
                reason: "connection refused".to_string()
            }
        );
        assert!(!update.transactions.is_empty());
        assert_eq!(update.metrics.source, MetricsSource::Computed);
        assert_eq!(
            update.metrics.total_transactions,
            update.transactions.len() as u64
        );
    }

    #[test]
    fn demo_snapshot_ignores_backend_summary() {
        let mut rng = StdRng::seed_from_u64(1);
        let summary = MetricsSummary {
            total_transactions: Some(0),
            fraud_transactions: Some(0),
            fraud_rate: Some(0.0),
            ..Default::default()
        };
        for transactions in [Ok(Some(Vec::new())), Err("timeout".to_string())] {
            let update = StoreUpdate::from_fetch(
                FetchResult {
                    transactions,
                    metrics: Ok(Some(summary.clone())),
                },
                Tz::UTC,
                &mut rng,
                Utc::now(),
            );
            let rows = update.transactions.len() as u64;
            let fraud = update.transactions.iter().filter(|tx| tx.is_fraud).count() as u64;
            let metrics = &update.metrics;

            assert!(update.source.is_synthetic());
            assert_eq!(metrics.source, MetricsSource::Computed);
            assert_eq!(metrics.total_transactions, rows);
            assert_eq!(metrics.fraud_transactions, fraud);
            assert_eq!(
                metrics.low_risk_count + metrics.medium_risk_count + metrics.high_risk_count,
                rows
            );
        }
    }

    #[test]
    fn live_metrics_combine_backend_summary() {
        let mut rng = StdRng::seed_from_u64(1);
        let update = StoreUpdate::from_fetch(
            FetchResult {
                transactions: Ok(Some(vec![record(1, "LOW")])),
                metrics: Ok(Some(MetricsSummary {
                    total_transactions: Some(999),
                    ..Default::default()
                })),
            },
            Tz::UTC,
            &mut rng,
            Utc::now(),
        );
        assert_eq!(update.source, DataSource::Live);
        assert_eq!(update.metrics.total_transactions, 999);
        assert_eq!(update.metrics.source, MetricsSource::Mixed);
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut store = TransactionStore::new();
        let first = store.begin_fetch();
        let second = store.begin_fetch();
        assert!(store.is_fetching());

        let newer = update(vec![record(2, "LOW")]);
        assert_eq!(
            store.complete(second, newer),
            Completion::Applied { high_risk: false }
        );
        let older = update(vec![record(1, "HIGH"), record(3, "HIGH")]);
        assert_eq!(store.complete(first, older), Completion::Stale);

        assert!(!store.is_fetching());
        assert_eq!(store.transactions().len(), 1);
        assert_eq!(store.transactions()[0].id, TransactionId::Number(2));
    }

    #[test]
    fn high_risk_reported_unless_demo_mode() {
        let mut store = TransactionStore::new();
        let ticket = store.begin_fetch();
        let outcome = store.complete(ticket, update(vec![record(1, "HIGH"), record(2, "HIGH")]));
        assert_eq!(outcome, Completion::Applied { high_risk: true });
        assert_eq!(store.source(), &DataSource::Live);
        assert_eq!(store.transactions()[0].risk_level, Some(RiskLevel::High));

        let mut rng = StdRng::seed_from_u64(3);
        let demo = StoreUpdate::from_fetch(
            FetchResult {
                transactions: Err("down".to_string()),
                metrics: Ok(None),
            },
            Tz::UTC,
            &mut rng,
            Utc::now(),
        );
        let ticket = store.begin_fetch();
        assert_eq!(
            store.complete(ticket, demo),
            Completion::Applied { high_risk: false }
        );
        assert!(store.source().is_synthetic());
    }

    #[test]
    fn fallback_batch_with_high_risk_still_alerts() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut fallback = StoreUpdate::from_fetch(
            FetchResult {
                transactions: Ok(None),
                metrics: Ok(None),
            },
            Tz::UTC,
            &mut rng,
            Utc::now(),
        );
        assert_eq!(fallback.source, DataSource::Fallback);
        if let Some(tx) = fallback.transactions.first_mut() {
            tx.risk_level = Some(RiskLevel::High);
        }

        let mut store = TransactionStore::new();
        let ticket = store.begin_fetch();
        assert_eq!(
            store.complete(ticket, fallback),
            Completion::Applied { high_risk: true }
        );
    }
}
