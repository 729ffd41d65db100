//! JSON bodies exchanged with the fraud-detection backend.
//!
//! Every response type decodes leniently: fields the backend omits fall back
//! to `None` / empty collections instead of failing the whole payload.
use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer, Serialize, de::IgnoredAny};

/// Error body returned by the backend on non-2xx responses.
///
/// Spring answers with `message`, other deployments with `error`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message
            .filter(|m| !m.trim().is_empty())
            .or(self.error.filter(|m| !m.trim().is_empty()))
    }
}

/// Decodes an optional field, turning a value of the wrong type into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient<T> {
        Value(Option<T>),
        Other(IgnoredAny),
    }

    Ok(match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Value(value) => value,
        Lenient::Other(_) => None,
    })
}

pub mod transaction {
    use super::*;

    /// Transaction id as sent by the backend.
    ///
    /// The current backend uses numeric ids, older deployments used strings.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum TransactionId {
        Number(i64),
        Text(String),
    }

    impl Default for TransactionId {
        fn default() -> Self {
            Self::Text(String::new())
        }
    }

    impl fmt::Display for TransactionId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Number(id) => write!(f, "{id}"),
                Self::Text(id) => f.write_str(id),
            }
        }
    }

    /// A transaction exactly as listed by `GET /transactions`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct TransactionRecord {
        #[serde(deserialize_with = "lenient")]
        pub id: Option<TransactionId>,
        #[serde(deserialize_with = "lenient")]
        pub account_number: Option<String>,
        #[serde(deserialize_with = "lenient")]
        pub transaction_type: Option<String>,
        #[serde(deserialize_with = "lenient")]
        pub amount: Option<f64>,
        #[serde(deserialize_with = "lenient")]
        pub location: Option<String>,
        #[serde(deserialize_with = "lenient")]
        pub country: Option<String>,
        #[serde(deserialize_with = "lenient")]
        pub city: Option<String>,
        #[serde(deserialize_with = "lenient")]
        pub risk_level: Option<String>,
        #[serde(deserialize_with = "lenient")]
        pub fraud_score: Option<f64>,
        #[serde(deserialize_with = "lenient")]
        pub is_fraud: Option<bool>,
        #[serde(deserialize_with = "lenient")]
        pub fraud_reason: Option<String>,
        /// APPROVED/PENDING/BLOCKED or SUCCESS/PENDING/FAILURE, depending on
        /// the backend dialect.
        #[serde(deserialize_with = "lenient")]
        pub approval_status: Option<String>,
        #[serde(deserialize_with = "lenient")]
        pub device_id: Option<String>,
        #[serde(deserialize_with = "lenient")]
        pub ip_address: Option<String>,
        #[serde(deserialize_with = "lenient")]
        pub merchant_id: Option<String>,
        /// RFC3339 or zone-less ISO local date-time.
        #[serde(deserialize_with = "lenient")]
        pub transaction_time: Option<String>,
        /// Legacy name of `transaction_time`.
        #[serde(deserialize_with = "lenient")]
        pub timestamp: Option<String>,
    }

    /// `GET /transactions` answers with an array, or a single object on some
    /// deployments.
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum TransactionListBody {
        Many(Vec<ListEntry>),
        One(TransactionRecord),
    }

    /// One array element; anything that is not a record is kept as `Invalid`.
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum ListEntry {
        Record(TransactionRecord),
        Invalid(IgnoredAny),
    }

    impl TransactionListBody {
        /// The decodable records and the number of entries skipped.
        pub fn into_records(self) -> (Vec<TransactionRecord>, usize) {
            match self {
                Self::Many(entries) => {
                    let total = entries.len();
                    let records: Vec<_> = entries
                        .into_iter()
                        .filter_map(|entry| match entry {
                            ListEntry::Record(record) => Some(record),
                            ListEntry::Invalid(_) => None,
                        })
                        .collect();
                    let skipped = total - records.len();
                    (records, skipped)
                }
                Self::One(record) => (vec![record], 0),
            }
        }
    }

    /// Body of `POST /transactions` (and one element of `/transactions/batch`).
    ///
    /// Risk fields are absent on purpose: scoring happens server-side.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct NewTransaction {
        pub account_number: String,
        pub transaction_type: String,
        pub amount: f64,
        pub location: String,
        pub country: String,
        pub city: String,
    }
}

pub mod metrics {
    use super::*;

    /// `GET /metrics/summary`. Any field may be missing.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct MetricsSummary {
        pub total_transactions: Option<u64>,
        pub fraud_transactions: Option<u64>,
        pub fraud_rate: Option<f64>,
        pub high_risk_transactions: Option<u64>,
        /// Major units (dollars).
        pub blocked_amount: Option<f64>,
        pub average_fraud_score: Option<f64>,
        /// Older backends name the average `avgFraudScore`.
        pub avg_fraud_score: Option<f64>,
        pub low_risk_count: Option<u64>,
        pub medium_risk_count: Option<u64>,
        pub high_risk_count: Option<u64>,
    }

    /// `GET /metrics/rule-breakdown`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct RuleBreakdown {
        pub rule_counts: BTreeMap<String, u64>,
        /// Percentage of all rule triggers, per rule name.
        pub rule_percentages: BTreeMap<String, f64>,
        pub total_rule_triggers: Option<u64>,
        pub most_common_rule: Option<String>,
        pub least_common_rule: Option<String>,
    }

    /// `GET /metrics/effectiveness`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct Effectiveness {
        pub detection_rate: Option<f64>,
        pub false_positive_rate: Option<f64>,
        pub accuracy: Option<f64>,
        pub precision: Option<f64>,
        pub recall: Option<f64>,
        pub f1_score: Option<f64>,
        pub effectiveness_score: Option<f64>,
        /// Qualitative rating, e.g. `EXCELLENT`.
        pub rating: Option<String>,
        pub recommendations: Vec<String>,
    }
}

pub mod scenario {
    use super::*;

    /// `POST /scenarios/run-all`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct ScenarioReport {
        pub total_scenarios: u32,
        pub passed: u32,
        pub failed: u32,
        pub success_rate: f64,
        /// `ALL_PASSED`, `PARTIAL_PASS` or `ALL_FAILED`.
        pub overall_status: Option<String>,
        pub scenarios: Vec<ScenarioResult>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct ScenarioResult {
        pub scenario: String,
        pub test_passed: bool,
        pub score: Option<f64>,
        pub risk: Option<String>,
        pub message: Option<String>,
    }
}

pub mod health {
    use super::*;

    /// `GET /health`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct Health {
        pub status: Option<String>,
        pub service: Option<String>,
    }
}
