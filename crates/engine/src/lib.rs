//! Client-side transaction view pipeline of the fraud dashboard.
//!
//! Data flows one way: fetched records are converted and enriched
//! ([`enrichment`]), or replaced by a [`demo`] batch, then handed to the
//! [`store::TransactionStore`]. The [`view`] and [`metrics`] stages read the
//! store and produce new values; [`export`] writes a derived view out.
//!
//! Nothing here talks to the network. The `client` crate fetches, the
//! binaries decide when.
pub use error::EngineError;
pub use metrics::MetricsSnapshot;
pub use money::MoneyCents;
pub use transaction::{
    ApprovalStatus, Dialect, RiskLevel, Transaction, TransactionType, parse_timestamp,
};

pub mod demo;
pub mod enrichment;
mod error;
pub mod export;
pub mod metrics;
mod money;
pub mod store;
pub mod submission;
mod transaction;
pub mod view;

pub type ResultEngine<T> = Result<T, EngineError>;
