pub mod form;
pub mod metrics;
pub mod scenarios;
pub mod transactions;
