use std::io::Write;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::{ApprovalStatus, Dialect, EngineError, Transaction};

pub const EXPORT_HEADER: [&str; 10] = [
    "SL.No",
    "ID",
    "Account",
    "Amount",
    "Location",
    "Risk Level",
    "Score",
    "Status",
    "Fraud",
    "Time",
];

const TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Writes the derived view as CSV, one row per transaction after the
/// header. Returns the number of data rows.
///
/// An empty view produces the header line only.
pub fn export_csv<W: Write>(
    view: &[Transaction],
    dialect: Dialect,
    tz: Tz,
    writer: W,
) -> Result<usize, EngineError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(EXPORT_HEADER)?;
    for (idx, tx) in view.iter().enumerate() {
        let time = tx.transaction_time.map_or_else(
            || "N/A".to_string(),
            |time| time.with_timezone(&tz).format(TIME_FORMAT).to_string(),
        );
        let status = tx.approval_status.unwrap_or(ApprovalStatus::Pending);

        wtr.write_record([
            (idx + 1).to_string(),
            tx.id.to_string(),
            tx.account_number.clone().unwrap_or_default(),
            tx.amount.to_string(),
            tx.location.clone().unwrap_or_default(),
            tx.risk_level
                .map(|level| level.as_str().to_string())
                .unwrap_or_default(),
            tx.fraud_score.unwrap_or(0).to_string(),
            dialect.status_label(status).to_string(),
            if tx.is_fraud { "Yes" } else { "No" }.to_string(),
            time,
        ])?;
    }
    wtr.flush()?;

    tracing::info!(rows = view.len(), "view exported");
    Ok(view.len())
}

/// `fraud-report-<YYYY-MM-DD>.csv`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("fraud-report-{}.csv", date.format("%Y-%m-%d"))
}
