//! Filtered, searched and sorted view over the stored transactions.
//!
//! [`derive_view`] is pure: it reads the stored collection and returns a new
//! `Vec`, so it can be re-run on every keystroke.
use std::cmp::Ordering;

use api_types::transaction::TransactionId;

use crate::{ApprovalStatus, Dialect, RiskLevel, Transaction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FraudStatus {
    Fraud,
    Legitimate,
}

impl FraudStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Fraud => "Fraud",
            Self::Legitimate => "Legitimate",
        }
    }

    fn matches(self, is_fraud: bool) -> bool {
        match self {
            Self::Fraud => is_fraud,
            Self::Legitimate => !is_fraud,
        }
    }
}

/// Equality predicates; `None` matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub risk_level: Option<RiskLevel>,
    pub approval_status: Option<ApprovalStatus>,
    pub fraud_status: Option<FraudStatus>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.risk_level.is_none() && self.approval_status.is_none() && self.fraud_status.is_none()
    }

    /// All → LOW → MEDIUM → HIGH → All.
    pub fn cycle_risk_level(&mut self) {
        self.risk_level = cycle(self.risk_level, &RiskLevel::ALL);
    }

    /// All → approved → pending → blocked → All.
    pub fn cycle_approval_status(&mut self) {
        self.approval_status = cycle(self.approval_status, &ApprovalStatus::ALL);
    }

    /// All → fraud → legitimate → All.
    pub fn cycle_fraud_status(&mut self) {
        self.fraud_status = cycle(
            self.fraud_status,
            &[FraudStatus::Fraud, FraudStatus::Legitimate],
        );
    }

    /// One-line summary, with status labels in the backend's vocabulary.
    pub fn describe(&self, dialect: Dialect) -> String {
        let risk = self.risk_level.map_or("All", RiskLevel::as_str);
        let status = self
            .approval_status
            .map_or("All", |status| dialect.status_label(status));
        let fraud = self.fraud_status.map_or("All", FraudStatus::label);
        format!("Risk: {risk} | Status: {status} | Fraud: {fraud}")
    }
}

fn cycle<T: Copy + PartialEq>(current: Option<T>, values: &[T]) -> Option<T> {
    match current {
        None => values.first().copied(),
        Some(value) => {
            let idx = values.iter().position(|v| *v == value)?;
            values.get(idx + 1).copied()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Newest first; missing times count as the epoch.
    #[default]
    Latest,
    /// Highest score first; missing scores count as 0.
    HighestScore,
    /// HIGH, MEDIUM, LOW, then unknown.
    HighestRisk,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [Self::Latest, Self::HighestScore, Self::HighestRisk];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::HighestScore => "highest-score",
            Self::HighestRisk => "highest-risk",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(raw.trim()))
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn compare(self, a: &Transaction, b: &Transaction) -> Ordering {
        match self {
            Self::Latest => time_key(b)
                .cmp(&time_key(a))
                .then_with(|| compare_ids(&b.id, &a.id)),
            Self::HighestScore => b.fraud_score.unwrap_or(0).cmp(&a.fraud_score.unwrap_or(0)),
            Self::HighestRisk => risk_rank(a).cmp(&risk_rank(b)),
        }
    }
}

/// Everything the view depends on besides the transactions themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub filters: FilterSet,
    pub search: String,
    pub sort: SortKey,
}

/// Filters (risk → approval → fraud → search) and then stably sorts.
pub fn derive_view(transactions: &[Transaction], query: &ViewQuery) -> Vec<Transaction> {
    let needle = query.search.trim().to_lowercase();
    let filters = &query.filters;

    let mut view: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| filters.risk_level.is_none_or(|level| tx.risk_level == Some(level)))
        .filter(|tx| {
            filters
                .approval_status
                .is_none_or(|status| tx.approval_status == Some(status))
        })
        .filter(|tx| {
            filters
                .fraud_status
                .is_none_or(|status| status.matches(tx.is_fraud))
        })
        .filter(|tx| needle.is_empty() || matches_search(tx, &needle))
        .cloned()
        .collect();

    view.sort_by(|a, b| query.sort.compare(a, b));
    view
}

/// `needle` must already be lowercase.
fn matches_search(tx: &Transaction, needle: &str) -> bool {
    let contains = |value: &str| value.to_lowercase().contains(needle);

    tx.account_number.as_deref().is_some_and(contains)
        || tx.location.as_deref().is_some_and(contains)
        || tx
            .transaction_type
            .is_some_and(|kind| contains(kind.as_str()))
        || contains(tx.id.to_string().as_str())
}

fn time_key(tx: &Transaction) -> i64 {
    tx.transaction_time
        .map(|time| time.timestamp_millis())
        .unwrap_or(0)
}

fn risk_rank(tx: &Transaction) -> u8 {
    tx.risk_level.map_or(u8::MAX, RiskLevel::severity_rank)
}

fn compare_ids(a: &TransactionId, b: &TransactionId) -> Ordering {
    match (a, b) {
        (TransactionId::Number(a), TransactionId::Number(b)) => a.cmp(b),
        (TransactionId::Text(a), TransactionId::Text(b)) => a.cmp(b),
        (TransactionId::Number(_), TransactionId::Text(_)) => Ordering::Less,
        (TransactionId::Text(_), TransactionId::Number(_)) => Ordering::Greater,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{MoneyCents, TransactionType};

    fn tx(id: i64, risk_level: Option<RiskLevel>) -> Transaction {
        Transaction {
            id: TransactionId::Number(id),
            account_number: Some(format!("ACC00{id}")),
            transaction_type: Some(TransactionType::Transfer),
            amount: MoneyCents::new(100),
            location: Some("London".to_string()),
            country: None,
            city: None,
            risk_level,
            fraud_score: None,
            is_fraud: false,
            fraud_reason: None,
            approval_status: None,
            device_id: None,
            ip_address: None,
            merchant_id: None,
            transaction_time: None,
        }
    }

    fn ids(view: &[Transaction]) -> Vec<String> {
        view.iter().map(|tx| tx.id.to_string()).collect()
    }

    #[test]
    fn highest_risk_is_stable_and_puts_unknown_last() {
        let batch = [
            tx(1, None),
            tx(2, Some(RiskLevel::Medium)),
            tx(3, Some(RiskLevel::High)),
            tx(4, Some(RiskLevel::Low)),
            tx(5, Some(RiskLevel::High)),
        ];
        let query = ViewQuery {
            sort: SortKey::HighestRisk,
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&batch, &query)), ["3", "5", "2", "4", "1"]);
    }

    #[test]
    fn latest_treats_missing_time_as_epoch() {
        let mut old = tx(1, None);
        old.transaction_time = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let mut new = tx(2, None);
        new.transaction_time = Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let timeless = tx(3, None);

        let view = derive_view(&[timeless, old, new], &ViewQuery::default());
        assert_eq!(ids(&view), ["2", "1", "3"]);
    }

    #[test]
    fn latest_breaks_time_ties_by_id() {
        let view = derive_view(&[tx(7, None), tx(9, None), tx(8, None)], &ViewQuery::default());
        assert_eq!(ids(&view), ["9", "8", "7"]);
    }

    #[test]
    fn highest_score_treats_zero_and_missing_alike() {
        let mut zero = tx(1, None);
        zero.fraud_score = Some(0);
        let missing = tx(2, None);
        let mut high = tx(3, None);
        high.fraud_score = Some(88);

        let query = ViewQuery {
            sort: SortKey::HighestScore,
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&[zero, missing, high], &query)), ["3", "1", "2"]);
    }

    #[test]
    fn filters_are_anded() {
        let mut a = tx(1, Some(RiskLevel::High));
        a.is_fraud = true;
        a.approval_status = Some(ApprovalStatus::Blocked);
        let mut b = tx(2, Some(RiskLevel::High));
        b.approval_status = Some(ApprovalStatus::Pending);
        let c = tx(3, Some(RiskLevel::Low));

        let query = ViewQuery {
            filters: FilterSet {
                risk_level: Some(RiskLevel::High),
                approval_status: Some(ApprovalStatus::Blocked),
                fraud_status: Some(FraudStatus::Fraud),
            },
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&[a, b, c], &query)), ["1"]);
    }

    #[test]
    fn search_is_case_insensitive_over_known_fields() {
        let mut tokyo = tx(42, None);
        tokyo.location = Some("Tokyo".to_string());
        tokyo.transaction_type = Some(TransactionType::Deposit);
        let batch = [tx(1, None), tokyo];

        let search = |term: &str| {
            let query = ViewQuery {
                search: term.to_string(),
                ..Default::default()
            };
            ids(&derive_view(&batch, &query))
        };

        assert_eq!(search("  TOKYO "), ["42"]);
        assert_eq!(search("deposit"), ["42"]);
        assert_eq!(search("acc001"), ["1"]);
        assert_eq!(search("42"), ["42"]);
        assert_eq!(search("").len(), 2);
        assert!(search("paris").is_empty());
    }

    #[test]
    fn filter_cycles_wrap_to_all() {
        let mut filters = FilterSet::default();
        for expected in [Some(RiskLevel::Low), Some(RiskLevel::Medium), Some(RiskLevel::High), None] {
            filters.cycle_risk_level();
            assert_eq!(filters.risk_level, expected);
        }
        filters.cycle_fraud_status();
        filters.cycle_fraud_status();
        filters.cycle_fraud_status();
        assert!(filters.is_empty());
    }

    #[test]
    fn describe_uses_dialect_labels() {
        let filters = FilterSet {
            approval_status: Some(ApprovalStatus::Blocked),
            ..Default::default()
        };
        assert_eq!(
            filters.describe(Dialect::Legacy),
            "Risk: All | Status: FAILURE | Fraud: All"
        );
    }
}
