//! Backfills missing per-transaction fields so no row is shown without risk
//! data.
//!
//! Random values only ever fill gaps. The one exception is the score/risk/
//! fraud-flag invariant, which is repaired when the backend violates it:
//!
//! - LOW → score in `0..=34`, MEDIUM → `35..=69`, HIGH → `70..=100`
//! - `is_fraud` → score ≥ [`FRAUD_SCORE_FLOOR`]
use std::ops::RangeInclusive;

use rand::{Rng, seq::SliceRandom};

use crate::{RiskLevel, Transaction};

/// Lowest score a transaction flagged as fraud may carry.
pub const FRAUD_SCORE_FLOOR: u8 = 65;

const HIGH_RISK_REASONS: [&str; 3] = [
    "Multiple risk rules triggered",
    "Unusual location pattern",
    "High velocity transaction",
];
const NO_INDICATORS: &str = "No indicators detected";

/// Returns `tx` with device, IP, merchant, reason and score populated.
pub fn enrich<R: Rng + ?Sized>(mut tx: Transaction, rng: &mut R) -> Transaction {
    if tx.device_id.is_none() {
        tx.device_id = Some(fake_device_id(rng));
    }
    if tx.ip_address.is_none() {
        tx.ip_address = Some(fake_ip(rng));
    }
    if tx.merchant_id.is_none() {
        tx.merchant_id = Some(fake_merchant_id(rng));
    }
    if tx.fraud_reason.is_none() {
        tx.fraud_reason = Some(fake_fraud_reason(tx.risk_level, rng));
    }

    let mut score = match tx.fraud_score {
        Some(score) => score,
        None => rng.gen_range(display_range(tx.risk_level)),
    };

    if let Some(level) = tx.risk_level {
        let band = level.band();
        score = score.clamp(*band.start(), *band.end());
    }

    if tx.is_fraud && score < FRAUD_SCORE_FLOOR {
        score = rng.gen_range(fraud_range(tx.risk_level));
        if let Some(level) = tx.risk_level
            && !level.band().contains(&score)
        {
            tx.risk_level = Some(RiskLevel::from_score(score));
        }
    }

    tx.fraud_score = Some(score);
    tx
}

/// Returns `true` when score, risk level and fraud flag agree.
pub fn is_consistent(tx: &Transaction) -> bool {
    let Some(score) = tx.fraud_score else {
        return false;
    };
    if let Some(level) = tx.risk_level
        && !level.band().contains(&score)
    {
        return false;
    }
    !tx.is_fraud || score >= FRAUD_SCORE_FLOOR
}

/// Range random scores are drawn from for a level.
///
/// Narrower than [`RiskLevel::band`] at the top so synthetic values never
/// look like certainties.
pub(crate) fn display_range(level: Option<RiskLevel>) -> RangeInclusive<u8> {
    match level {
        Some(RiskLevel::High) => 70..=95,
        Some(RiskLevel::Medium) => 35..=69,
        Some(RiskLevel::Low) | None => 0..=34,
    }
}

fn fraud_range(level: Option<RiskLevel>) -> RangeInclusive<u8> {
    match level {
        Some(RiskLevel::Medium) => FRAUD_SCORE_FLOOR..=69,
        Some(RiskLevel::High) => 70..=95,
        Some(RiskLevel::Low) | None => FRAUD_SCORE_FLOOR..=95,
    }
}

pub(crate) fn fake_device_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("DEV-{}", rng.gen_range(1000..=9999))
}

pub(crate) fn fake_merchant_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("MRC-{}", rng.gen_range(100..=999))
}

pub(crate) fn fake_ip<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{}.{}.{}.{}",
        rng.gen_range(10..=255),
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(0..=255)
    )
}

pub(crate) fn fake_fraud_reason<R: Rng + ?Sized>(level: Option<RiskLevel>, rng: &mut R) -> String {
    match level {
        Some(RiskLevel::High) => HIGH_RISK_REASONS
            .choose(rng)
            .copied()
            .unwrap_or(HIGH_RISK_REASONS[0])
            .to_string(),
        _ => NO_INDICATORS.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use api_types::transaction::TransactionId;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::MoneyCents;

    fn bare(risk_level: Option<RiskLevel>, fraud_score: Option<u8>, is_fraud: bool) -> Transaction {
        Transaction {
            id: TransactionId::Number(1),
            account_number: Some("ACC001".to_string()),
            transaction_type: None,
            amount: MoneyCents::new(100),
            location: None,
            country: None,
            city: None,
            risk_level,
            fraud_score,
            is_fraud,
            fraud_reason: None,
            approval_status: None,
            device_id: None,
            ip_address: None,
            merchant_id: None,
            transaction_time: None,
        }
    }

    #[test]
    fn fills_every_gap() {
        let mut rng = StdRng::seed_from_u64(7);
        let tx = enrich(bare(Some(RiskLevel::High), None, false), &mut rng);

        assert!(tx.device_id.as_deref().unwrap().starts_with("DEV-"));
        assert!(tx.merchant_id.as_deref().unwrap().starts_with("MRC-"));
        assert_eq!(tx.ip_address.as_deref().unwrap().split('.').count(), 4);
        assert!(HIGH_RISK_REASONS.contains(&tx.fraud_reason.as_deref().unwrap()));
        assert!((70..=95).contains(&tx.fraud_score.unwrap()));
    }

    #[test]
    fn keeps_backend_values() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut input = bare(Some(RiskLevel::Medium), Some(50), false);
        input.device_id = Some("device-x".to_string());
        input.fraud_reason = Some("manual review".to_string());

        let tx = enrich(input, &mut rng);
        assert_eq!(tx.device_id.as_deref(), Some("device-x"));
        assert_eq!(tx.fraud_reason.as_deref(), Some("manual review"));
        assert_eq!(tx.fraud_score, Some(50));
    }

    #[test]
    fn zero_score_is_a_real_score() {
        let mut rng = StdRng::seed_from_u64(1);
        let tx = enrich(bare(Some(RiskLevel::Low), Some(0), false), &mut rng);
        assert_eq!(tx.fraud_score, Some(0));
    }

    #[test]
    fn clamps_score_into_band() {
        let mut rng = StdRng::seed_from_u64(3);
        let tx = enrich(bare(Some(RiskLevel::Low), Some(90), false), &mut rng);
        assert_eq!(tx.fraud_score, Some(34));
        let tx = enrich(bare(Some(RiskLevel::High), Some(10), false), &mut rng);
        assert_eq!(tx.fraud_score, Some(70));
    }

    #[test]
    fn fraud_flag_lifts_score() {
        let mut rng = StdRng::seed_from_u64(11);
        let tx = enrich(bare(Some(RiskLevel::Medium), Some(40), true), &mut rng);
        assert_eq!(tx.risk_level, Some(RiskLevel::Medium));
        assert!((65..=69).contains(&tx.fraud_score.unwrap()));

        let tx = enrich(bare(Some(RiskLevel::Low), Some(5), true), &mut rng);
        assert_ne!(tx.risk_level, Some(RiskLevel::Low));
        assert!(is_consistent(&tx));

        let tx = enrich(bare(None, None, true), &mut rng);
        assert!(tx.fraud_score.unwrap() >= FRAUD_SCORE_FLOOR);
        assert_eq!(tx.risk_level, None);
    }

    #[test]
    fn every_combination_ends_consistent() {
        let mut rng = StdRng::seed_from_u64(42);
        let levels = [None, Some(RiskLevel::Low), Some(RiskLevel::Medium), Some(RiskLevel::High)];
        for level in levels {
            for score in [None, Some(0), Some(34), Some(35), Some(64), Some(69), Some(70), Some(100)] {
                for is_fraud in [false, true] {
                    let tx = enrich(bare(level, score, is_fraud), &mut rng);
                    assert!(is_consistent(&tx), "{level:?} {score:?} {is_fraud} -> {tx:?}");
                }
            }
        }
    }
}
