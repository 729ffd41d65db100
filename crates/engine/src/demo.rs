//! Synthetic data shown when the backend is unreachable or empty.
//!
//! Every generated record already satisfies the score/risk/fraud invariant,
//! and the batch fraud rate stays in the healthy display band.
use api_types::transaction::{NewTransaction, TransactionId};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use rand::{Rng, seq::SliceRandom};

use crate::{
    ApprovalStatus, MetricsSnapshot, MoneyCents, RiskLevel, Transaction, TransactionType,
    enrichment::{display_range, fake_device_id, fake_fraud_reason, fake_ip, fake_merchant_id},
    metrics::{self, HEALTHY_FRAUD_RATE},
};

/// Records per demo batch.
pub const DEMO_BATCH_SIZE: usize = 50;

const FIRST_DEMO_ID: i64 = 1000;

const ACCOUNTS: [&str; 8] = [
    "ACC001", "ACC002", "ACC003", "ACC004", "ACC005", "ACC006", "ACC007", "ACC008",
];

/// (location, country, city)
const LOCATIONS: [(&str, &str, &str); 8] = [
    ("New York", "USA", "New York"),
    ("London", "UK", "London"),
    ("Tokyo", "Japan", "Tokyo"),
    ("Singapore", "Singapore", "Singapore"),
    ("Dubai", "UAE", "Dubai"),
    ("Sydney", "Australia", "Sydney"),
    ("Toronto", "Canada", "Toronto"),
    ("Berlin", "Germany", "Berlin"),
];

/// A demo batch and the snapshot computed from it.
#[derive(Clone, Debug)]
pub struct DemoData {
    pub transactions: Vec<Transaction>,
    pub metrics: MetricsSnapshot,
}

/// Generates [`DEMO_BATCH_SIZE`] transactions and their matching metrics.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>, tz: Tz) -> DemoData {
    let transactions = generate_batch(DEMO_BATCH_SIZE, rng, now);
    let metrics = metrics::compute(&transactions, tz);
    DemoData {
        transactions,
        metrics,
    }
}

/// Generates `count` independent, internally consistent transactions.
pub fn generate_batch<R: Rng + ?Sized>(
    count: usize,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<Transaction> {
    let mut batch: Vec<Transaction> = (0..count)
        .map(|i| demo_transaction(FIRST_DEMO_ID + i as i64, rng, now))
        .collect();
    cap_fraud_rate(&mut batch);
    batch
}

fn demo_transaction<R: Rng + ?Sized>(id: i64, rng: &mut R, now: DateTime<Utc>) -> Transaction {
    let risk_level = *RiskLevel::ALL.choose(rng).unwrap_or(&RiskLevel::Low);
    let is_fraud = risk_level == RiskLevel::High && rng.gen_bool(0.5);
    let fraud_score = rng.gen_range(display_range(Some(risk_level)));
    let approval_status = match risk_level {
        RiskLevel::High if is_fraud => ApprovalStatus::Blocked,
        RiskLevel::High => ApprovalStatus::Pending,
        _ if rng.gen_bool(0.5) => ApprovalStatus::Approved,
        _ => ApprovalStatus::Pending,
    };
    let (location, country, city) = *LOCATIONS.choose(rng).unwrap_or(&LOCATIONS[0]);
    let account = *ACCOUNTS.choose(rng).unwrap_or(&ACCOUNTS[0]);
    let transaction_type = *TransactionType::ALL
        .choose(rng)
        .unwrap_or(&TransactionType::Transfer);
    let age = Duration::milliseconds(rng.gen_range(0..=24 * 60 * 60 * 1000));

    Transaction {
        id: TransactionId::Number(id),
        account_number: Some(account.to_string()),
        transaction_type: Some(transaction_type),
        amount: MoneyCents::new(rng.gen_range(100..=10_000) * 100),
        location: Some(location.to_string()),
        country: Some(country.to_string()),
        city: Some(city.to_string()),
        risk_level: Some(risk_level),
        fraud_score: Some(fraud_score),
        is_fraud,
        fraud_reason: Some(fake_fraud_reason(Some(risk_level), rng)),
        approval_status: Some(approval_status),
        device_id: Some(fake_device_id(rng)),
        ip_address: Some(fake_ip(rng)),
        merchant_id: Some(fake_merchant_id(rng)),
        transaction_time: Some(now - age),
    }
}

/// Creation bodies drawn from the same pools, for seeding a backend.
pub fn generate_submissions<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<NewTransaction> {
    (0..count)
        .map(|_| {
            let (location, country, city) = *LOCATIONS.choose(rng).unwrap_or(&LOCATIONS[0]);
            let transaction_type = *TransactionType::ALL
                .choose(rng)
                .unwrap_or(&TransactionType::Transfer);
            NewTransaction {
                account_number: ACCOUNTS.choose(rng).unwrap_or(&ACCOUNTS[0]).to_string(),
                transaction_type: transaction_type.as_str().to_string(),
                amount: MoneyCents::new(rng.gen_range(100..=10_000) * 100).to_major(),
                location: location.to_string(),
                country: country.to_string(),
                city: city.to_string(),
            }
        })
        .collect()
}

/// Clears fraud flags past the healthy share, keeping the earliest ones.
fn cap_fraud_rate(batch: &mut [Transaction]) {
    let max_fraud = ((batch.len() as f64) * HEALTHY_FRAUD_RATE / 100.0).ceil() as usize;
    let max_fraud = max_fraud.saturating_sub(1);
    let mut seen = 0;
    for tx in batch.iter_mut().filter(|tx| tx.is_fraud) {
        seen += 1;
        if seen > max_fraud {
            tx.is_fraud = false;
            tx.approval_status = Some(ApprovalStatus::Pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        enrichment::is_consistent,
        metrics::{FraudRateBand, MetricsSource},
    };

    #[test]
    fn batch_has_fixed_shape() {
        let mut rng = StdRng::seed_from_u64(5);
        let now = Utc::now();
        let demo = generate(&mut rng, now, Tz::UTC);

        assert_eq!(demo.transactions.len(), DEMO_BATCH_SIZE);
        for tx in &demo.transactions {
            assert!(is_consistent(tx), "{tx:?}");
            assert!(tx.account_number.is_some());
            assert!(tx.location.is_some());
            assert!(tx.transaction_type.is_some());
            assert!(tx.device_id.is_some());
            assert!(tx.amount >= MoneyCents::new(100_00));
            assert!(tx.amount <= MoneyCents::new(10_000_00));
            let time = tx.transaction_time.unwrap();
            assert!(time <= now && time >= now - Duration::hours(24));
            if tx.is_fraud {
                assert_eq!(tx.risk_level, Some(RiskLevel::High));
            }
        }
    }

    #[test]
    fn ids_are_unique_and_sequential() {
        let mut rng = StdRng::seed_from_u64(9);
        let batch = generate_batch(10, &mut rng, Utc::now());
        let ids: Vec<_> = batch.iter().map(|tx| tx.id.clone()).collect();
        let expected: Vec<_> = (1000..1010).map(TransactionId::Number).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn metrics_match_batch_and_stay_healthy() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let demo = generate(&mut rng, Utc::now(), Tz::UTC);
            let fraud = demo.transactions.iter().filter(|tx| tx.is_fraud).count() as u64;

            assert_eq!(demo.metrics.total_transactions, DEMO_BATCH_SIZE as u64);
            assert_eq!(demo.metrics.fraud_transactions, fraud);
            assert_eq!(demo.metrics.source, MetricsSource::Computed);
            assert_eq!(demo.metrics.fraud_rate_band(), FraudRateBand::Healthy);
        }
    }

    #[test]
    fn submissions_use_known_pools() {
        let mut rng = StdRng::seed_from_u64(2);
        let bodies = generate_submissions(5, &mut rng);
        assert_eq!(bodies.len(), 5);
        for body in bodies {
            assert!(ACCOUNTS.contains(&body.account_number.as_str()));
            assert!(TransactionType::parse(&body.transaction_type).is_some());
            assert!(LOCATIONS.iter().any(|(location, ..)| *location == body.location));
            assert!((100.0..=10_000.0).contains(&body.amount));
        }
    }
}
