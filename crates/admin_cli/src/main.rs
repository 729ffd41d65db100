use std::{
    error::Error,
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    time::Duration,
};

use api_types::transaction::TransactionId;
use chrono::Utc;
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use client::Client;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{
    ApprovalStatus, Dialect, RiskLevel, Transaction, demo, export,
    store::{DataSource, StoreUpdate},
    view::{FilterSet, FraudStatus, SortKey, ViewQuery, derive_view},
};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "fraudwatch_admin")]
#[command(about = "Admin utilities for the fraud-detection backend")]
struct Cli {
    /// Backend base URL (also read from `FRAUDWATCH_BASE_URL`).
    #[arg(long, env = "FRAUDWATCH_BASE_URL", default_value = client::DEFAULT_BASE_URL)]
    base_url: String,

    /// Approval-status vocabulary of the backend: standard or legacy.
    #[arg(long, default_value = "standard", value_parser = parse_dialect)]
    dialect: Dialect,

    /// IANA time zone used for zone-less timestamps and printed times.
    #[arg(long, env = "FRAUDWATCH_TIMEZONE", default_value = "UTC", value_parser = parse_tz)]
    timezone: Tz,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask the backend whether it is up.
    Health,
    /// Print the transaction list, filtered and sorted.
    List(ViewArgs),
    /// Print one transaction.
    Get { id: String },
    /// Delete one transaction.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Post randomly generated transactions through the batch endpoint.
    Seed {
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// Run every backend fraud scenario.
    Scenarios,
    /// Print headline metrics, rule breakdown and effectiveness.
    Metrics,
    /// Write the filtered view as a CSV report.
    Export {
        /// Directory the report is written to.
        #[arg(long, default_value = ".")]
        out: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },
}

#[derive(Args, Debug)]
struct ViewArgs {
    #[arg(long, value_parser = parse_risk)]
    risk: Option<RiskLevel>,
    /// Either vocabulary is accepted (`blocked` or `failure`, ...).
    #[arg(long, value_parser = parse_status)]
    status: Option<ApprovalStatus>,
    /// `fraud` or `legit`.
    #[arg(long, value_parser = parse_fraud)]
    fraud: Option<FraudStatus>,
    /// Case-insensitive substring of account, location, type or id.
    #[arg(long, default_value = "")]
    search: String,
    /// latest, highest-score or highest-risk.
    #[arg(long, default_value = "latest", value_parser = parse_sort)]
    sort: SortKey,
}

impl ViewArgs {
    fn query(&self) -> ViewQuery {
        ViewQuery {
            filters: FilterSet {
                risk_level: self.risk,
                approval_status: self.status,
                fraud_status: self.fraud,
            },
            search: self.search.clone(),
            sort: self.sort,
        }
    }
}

fn parse_dialect(raw: &str) -> Result<Dialect, String> {
    Dialect::parse(raw).ok_or_else(|| format!("unknown dialect: {raw}"))
}

fn parse_tz(raw: &str) -> Result<Tz, String> {
    raw.parse::<Tz>()
        .map_err(|_| format!("unknown time zone: {raw}"))
}

fn parse_risk(raw: &str) -> Result<RiskLevel, String> {
    RiskLevel::parse(raw).ok_or_else(|| format!("unknown risk level: {raw}"))
}

fn parse_status(raw: &str) -> Result<ApprovalStatus, String> {
    ApprovalStatus::parse(raw).ok_or_else(|| format!("unknown approval status: {raw}"))
}

fn parse_fraud(raw: &str) -> Result<FraudStatus, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "fraud" | "yes" => Ok(FraudStatus::Fraud),
        "legit" | "legitimate" | "no" => Ok(FraudStatus::Legitimate),
        other => Err(format!("unknown fraud status: {other}")),
    }
}

fn parse_sort(raw: &str) -> Result<SortKey, String> {
    SortKey::parse(raw).ok_or_else(|| format!("unknown sort key: {raw}"))
}

/// Numeric ids are sent as numbers, anything else verbatim.
fn parse_id(raw: &str) -> TransactionId {
    raw.trim()
        .parse::<i64>()
        .map_or_else(|_| TransactionId::Text(raw.trim().to_string()), TransactionId::Number)
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Single-key y/N prompt on stderr.
fn confirm(prompt: &str) -> CliResult<bool> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        let answer = match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char('y' | 'Y') => true,
            KeyCode::Char(_) | KeyCode::Enter | KeyCode::Esc => false,
            _ => continue,
        };
        execute!(out, Print(if answer { "y\r\n" } else { "n\r\n" }))?;
        out.flush()?;
        return Ok(answer);
    }
}

/// Fetches the dashboard through the same pipeline as the TUI, so an
/// unreachable backend yields the demo batch here too.
async fn load(client: &Client, tz: Tz) -> StoreUpdate {
    let result = client.fetch_dashboard().await;
    let update = StoreUpdate::from_fetch(result, tz, &mut rand::thread_rng(), Utc::now());
    if let DataSource::Demo { reason } = &update.source {
        eprintln!("backend unavailable ({reason}), showing demo data");
    } else if update.source == DataSource::Fallback {
        eprintln!("backend returned no transactions, showing sample data");
    }
    update
}

fn print_row(tx: &Transaction, dialect: Dialect, tz: Tz) {
    let time = tx.transaction_time.map_or_else(
        || "N/A".to_string(),
        |time| time.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    println!(
        "{:>8}  {:<10} {:>13}  {:<6} {:>3}  {:<8} {:<3}  {}",
        tx.id.to_string(),
        tx.account_number.as_deref().unwrap_or("-"),
        tx.amount.to_string(),
        tx.risk_level.map_or("-", RiskLevel::as_str),
        tx.fraud_score.map_or_else(|| "-".to_string(), |s| s.to_string()),
        tx.approval_status
            .map_or("-", |status| dialect.status_label(status)),
        if tx.is_fraud { "Yes" } else { "No" },
        time,
    );
}

fn print_detail(tx: &Transaction, dialect: Dialect, tz: Tz) {
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    println!("id:        {}", tx.id);
    println!("account:   {}", text(&tx.account_number));
    println!(
        "type:      {}",
        tx.transaction_type.map_or("-", |kind| kind.as_str())
    );
    println!("amount:    {}", tx.amount);
    println!(
        "location:  {} ({}, {})",
        text(&tx.location),
        text(&tx.city),
        text(&tx.country)
    );
    println!("risk:      {}", tx.risk_level.map_or("-", RiskLevel::as_str));
    println!(
        "score:     {}",
        tx.fraud_score.map_or_else(|| "-".to_string(), |s| s.to_string())
    );
    println!(
        "status:    {}",
        tx.approval_status
            .map_or("-", |status| dialect.status_label(status))
    );
    println!("fraud:     {}", if tx.is_fraud { "yes" } else { "no" });
    println!("reason:    {}", text(&tx.fraud_reason));
    println!("device:    {}", text(&tx.device_id));
    println!("ip:        {}", text(&tx.ip_address));
    println!("merchant:  {}", text(&tx.merchant_id));
    println!(
        "time:      {}",
        tx.transaction_time.map_or_else(
            || "N/A".to_string(),
            |time| time.with_timezone(&tz).to_rfc3339()
        )
    );
}

#[tokio::main]
async fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = Client::new(&cli.base_url, Duration::from_secs(cli.timeout.max(1)))?;
    let (dialect, tz) = (cli.dialect, cli.timezone);
    tracing::debug!(base_url = client.base_url(), %dialect, %tz, "admin client ready");

    match cli.command {
        Command::Health => {
            let health = client.health().await?;
            println!(
                "{} {}",
                health.status.as_deref().unwrap_or("UP"),
                health.service.as_deref().unwrap_or("")
            );
        }
        Command::List(args) => {
            let update = load(&client, tz).await;
            let view = derive_view(&update.transactions, &args.query());
            for tx in &view {
                print_row(tx, dialect, tz);
            }
            eprintln!("{} of {} transactions", view.len(), update.transactions.len());
        }
        Command::Get { id } => {
            let record = client.get_transaction(&parse_id(&id)).await?;
            print_detail(&Transaction::from_record(record, tz), dialect, tz);
        }
        Command::Delete { id, yes } => {
            let id = parse_id(&id);
            if !yes && !confirm(&format!("Delete transaction {id}? [y/N] "))? {
                eprintln!("aborted");
                return Ok(());
            }
            client.delete_transaction(&id).await?;
            println!("deleted transaction: {id}");
        }
        Command::Seed { count } => {
            let submissions = demo::generate_submissions(count, &mut rand::thread_rng());
            let created = client.create_batch(&submissions).await?;
            println!(
                "submitted {} transactions, backend returned {}",
                submissions.len(),
                created.len()
            );
        }
        Command::Scenarios => {
            let report = client.run_scenarios().await?;
            for result in &report.scenarios {
                println!(
                    "{:<4} {:<28} {}",
                    if result.test_passed { "PASS" } else { "FAIL" },
                    result.scenario,
                    result.message.as_deref().unwrap_or("")
                );
            }
            println!(
                "{}: {}/{} passed ({:.1}%)",
                report.overall_status.as_deref().unwrap_or("-"),
                report.passed,
                report.total_scenarios,
                report.success_rate
            );
        }
        Command::Metrics => {
            let metrics = load(&client, tz).await.metrics;
            println!("transactions:   {}", metrics.total_transactions);
            println!(
                "fraud:          {} ({:.1}%, {})",
                metrics.fraud_transactions,
                metrics.fraud_rate,
                metrics.fraud_rate_band().label()
            );
            println!("high risk:      {}", metrics.high_risk_transactions);
            println!("blocked amount: {}", metrics.blocked_amount);
            println!("average score:  {:.1}", metrics.average_fraud_score);
            println!(
                "risk levels:    LOW {} / MEDIUM {} / HIGH {}",
                metrics.low_risk_count, metrics.medium_risk_count, metrics.high_risk_count
            );

            match client.rule_breakdown().await {
                Ok(rules) => {
                    println!();
                    for (rule, count) in &rules.rule_counts {
                        let percent = rules.rule_percentages.get(rule).copied().unwrap_or(0.0);
                        println!("{rule:<28} {count:>6} ({percent:.1}%)");
                    }
                }
                Err(err) => eprintln!("rule breakdown unavailable: {}", err.message()),
            }
            match client.effectiveness().await {
                Ok(effectiveness) => {
                    println!();
                    let pct = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.1}%"));
                    println!("detection rate: {}", pct(effectiveness.detection_rate));
                    println!("false positive: {}", pct(effectiveness.false_positive_rate));
                    println!("accuracy:       {}", pct(effectiveness.accuracy));
                    if let Some(rating) = &effectiveness.rating {
                        println!("rating:         {rating}");
                    }
                }
                Err(err) => eprintln!("effectiveness unavailable: {}", err.message()),
            }
        }
        Command::Export { out, view } => {
            let update = load(&client, tz).await;
            let rows = derive_view(&update.transactions, &view.query());
            let today = Utc::now().with_timezone(&tz).date_naive();
            let path = out.join(export::report_file_name(today));

            let mut writer = BufWriter::new(File::create(&path)?);
            let count = export::export_csv(&rows, dialect, tz, &mut writer)?;
            writer.flush()?;
            println!("exported {count} rows to {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ids_keep_their_wire_shape() {
        assert_eq!(parse_id("42"), TransactionId::Number(42));
        assert_eq!(parse_id(" tx-9 "), TransactionId::Text("tx-9".to_string()));
    }

    #[test]
    fn export_flags_build_a_view_query() {
        let cli = Cli::try_parse_from([
            "fraudwatch_admin",
            "--dialect",
            "legacy",
            "export",
            "--risk",
            "high",
            "--status",
            "failure",
            "--sort",
            "highest-score",
        ])
        .unwrap();

        assert_eq!(cli.dialect, Dialect::Legacy);
        let Command::Export { view, out } = cli.command else {
            panic!("expected export");
        };
        let query = view.query();
        assert_eq!(out, PathBuf::from("."));
        assert_eq!(query.filters.risk_level, Some(RiskLevel::High));
        assert_eq!(query.filters.approval_status, Some(ApprovalStatus::Blocked));
        assert_eq!(query.sort, SortKey::HighestScore);
    }
}
