use std::{fmt, ops::RangeInclusive};

use api_types::transaction::{TransactionId, TransactionRecord};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::MoneyCents;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Transfer,
    Purchase,
    Withdrawal,
    Deposit,
}

impl TransactionType {
    pub const ALL: [TransactionType; 4] = [
        Self::Transfer,
        Self::Purchase,
        Self::Withdrawal,
        Self::Deposit,
    ];

    /// Returns the wire label (`TRANSFER`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "TRANSFER",
            Self::Purchase => "PURCHASE",
            Self::Withdrawal => "WITHDRAWAL",
            Self::Deposit => "DEPOSIT",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw.trim()))
    }

    /// Next type in [`Self::ALL`], wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Coarse fraud-severity bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(raw.trim()))
    }

    /// Scores a transaction of this level must fall in.
    pub fn band(self) -> RangeInclusive<u8> {
        match self {
            Self::Low => 0..=34,
            Self::Medium => 35..=69,
            Self::High => 70..=100,
        }
    }

    pub fn from_score(score: u8) -> Self {
        match score {
            0..=34 => Self::Low,
            35..=69 => Self::Medium,
            _ => Self::High,
        }
    }

    /// Position under the `highest-risk` ordering (HIGH first).
    pub fn severity_rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

/// Canonical approval outcome.
///
/// The backend speaks one of two vocabularies (see [`Dialect`]); both map
/// onto these three values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Approved,
    Pending,
    Blocked,
}

impl ApprovalStatus {
    pub const ALL: [ApprovalStatus; 3] = [Self::Approved, Self::Pending, Self::Blocked];

    /// Accepts both backend vocabularies.
    ///
    /// `SUCCESS` maps to [`Approved`](Self::Approved) and `FAILURE` to
    /// [`Blocked`](Self::Blocked).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "APPROVED" | "SUCCESS" => Some(Self::Approved),
            "PENDING" => Some(Self::Pending),
            "BLOCKED" | "FAILURE" => Some(Self::Blocked),
            _ => None,
        }
    }
}

/// Approval-status vocabulary of the backend deployment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// APPROVED / PENDING / BLOCKED
    #[default]
    Standard,
    /// SUCCESS / PENDING / FAILURE
    Legacy,
}

impl Dialect {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }

    /// Label the backend of this dialect uses for `status`.
    pub fn status_label(self, status: ApprovalStatus) -> &'static str {
        match (self, status) {
            (Self::Standard, ApprovalStatus::Approved) => "APPROVED",
            (Self::Standard, ApprovalStatus::Blocked) => "BLOCKED",
            (Self::Legacy, ApprovalStatus::Approved) => "SUCCESS",
            (Self::Legacy, ApprovalStatus::Blocked) => "FAILURE",
            (_, ApprovalStatus::Pending) => "PENDING",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

/// A transaction as held by the store.
///
/// Fields the backend may omit are `Option`s; [`crate::enrichment::enrich`]
/// fills the display-relevant ones.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_number: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub amount: MoneyCents,
    pub location: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub risk_level: Option<RiskLevel>,
    pub fraud_score: Option<u8>,
    pub is_fraud: bool,
    pub fraud_reason: Option<String>,
    pub approval_status: Option<ApprovalStatus>,
    pub device_id: Option<String>,
    pub ip_address: Option<String>,
    pub merchant_id: Option<String>,
    pub transaction_time: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Builds a store record out of a wire record.
    ///
    /// Never fails: unreadable values are treated as absent. Zone-less
    /// timestamps are read in `tz`.
    pub fn from_record(record: TransactionRecord, tz: Tz) -> Self {
        let id = record.id.unwrap_or_default();

        let transaction_type = record.transaction_type.as_deref().and_then(|raw| {
            let parsed = TransactionType::parse(raw);
            if parsed.is_none() {
                tracing::debug!(%id, raw, "unrecognized transaction type");
            }
            parsed
        });
        let risk_level = record.risk_level.as_deref().and_then(|raw| {
            let parsed = RiskLevel::parse(raw);
            if parsed.is_none() {
                tracing::debug!(%id, raw, "unrecognized risk level");
            }
            parsed
        });
        let approval_status = record.approval_status.as_deref().and_then(|raw| {
            let parsed = ApprovalStatus::parse(raw);
            if parsed.is_none() {
                tracing::debug!(%id, raw, "unrecognized approval status");
            }
            parsed
        });

        let amount = record
            .amount
            .map(MoneyCents::from_major)
            .filter(|amount| !amount.is_negative())
            .unwrap_or_default();

        let fraud_score = record
            .fraud_score
            .filter(|score| score.is_finite())
            .map(|score| score.round().clamp(0.0, 100.0) as u8);

        let transaction_time = record
            .transaction_time
            .as_deref()
            .or(record.timestamp.as_deref())
            .and_then(|raw| parse_timestamp(raw, tz));

        Self {
            id,
            account_number: non_blank(record.account_number),
            transaction_type,
            amount,
            location: non_blank(record.location),
            country: non_blank(record.country),
            city: non_blank(record.city),
            risk_level,
            fraud_score,
            is_fraud: record.is_fraud.unwrap_or(false),
            fraud_reason: non_blank(record.fraud_reason),
            approval_status,
            device_id: non_blank(record.device_id),
            ip_address: non_blank(record.ip_address),
            merchant_id: non_blank(record.merchant_id),
            transaction_time,
        }
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_level == Some(RiskLevel::High)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parses RFC 3339, falling back to an ISO local date-time read in `tz`.
pub fn parse_timestamp(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_accepts_both_dialects() {
        assert_eq!(ApprovalStatus::parse("APPROVED"), Some(ApprovalStatus::Approved));
        assert_eq!(ApprovalStatus::parse("success"), Some(ApprovalStatus::Approved));
        assert_eq!(ApprovalStatus::parse("FAILURE"), Some(ApprovalStatus::Blocked));
        assert_eq!(ApprovalStatus::parse("BLOCKED"), Some(ApprovalStatus::Blocked));
        assert_eq!(ApprovalStatus::parse("REVIEW"), None);
    }

    #[test]
    fn dialect_labels() {
        assert_eq!(Dialect::Standard.status_label(ApprovalStatus::Blocked), "BLOCKED");
        assert_eq!(Dialect::Legacy.status_label(ApprovalStatus::Blocked), "FAILURE");
        assert_eq!(Dialect::Legacy.status_label(ApprovalStatus::Approved), "SUCCESS");
        assert_eq!(Dialect::Legacy.status_label(ApprovalStatus::Pending), "PENDING");
    }

    #[test]
    fn risk_band_and_score_agree() {
        for score in 0..=100u8 {
            assert!(RiskLevel::from_score(score).band().contains(&score));
        }
    }

    #[test]
    fn record_with_garbage_still_converts() {
        let record = TransactionRecord {
            id: Some(TransactionId::Number(4)),
            transaction_type: Some("REFUND".to_string()),
            risk_level: Some("EXTREME".to_string()),
            amount: Some(-10.0),
            fraud_score: Some(140.0),
            account_number: Some("   ".to_string()),
            transaction_time: Some("yesterday".to_string()),
            ..Default::default()
        };

        let tx = Transaction::from_record(record, Tz::UTC);
        assert_eq!(tx.transaction_type, None);
        assert_eq!(tx.risk_level, None);
        assert_eq!(tx.amount, MoneyCents::ZERO);
        assert_eq!(tx.fraud_score, Some(100));
        assert_eq!(tx.account_number, None);
        assert_eq!(tx.transaction_time, None);
    }

    #[test]
    fn timestamps_with_and_without_zone() {
        use chrono::Timelike;

        let utc = parse_timestamp("2026-03-01T10:00:00Z", Tz::UTC).unwrap();
        let naive = parse_timestamp("2026-03-01T11:00:00.250", Tz::Europe__Rome).unwrap();
        assert_eq!(utc, naive.with_nanosecond(0).unwrap());

        let legacy = TransactionRecord {
            timestamp: Some("2026-03-01 10:00:00".to_string()),
            ..Default::default()
        };
        let tx = Transaction::from_record(legacy, Tz::UTC);
        assert_eq!(tx.transaction_time, Some(utc));
    }
}
