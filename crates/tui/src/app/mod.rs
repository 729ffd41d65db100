pub mod form;

use std::{
    fs::File,
    future::Future,
    io::{BufWriter, Write},
    path::Path,
    time::{Duration, Instant},
};

use api_types::{
    health::Health,
    metrics::{Effectiveness, RuleBreakdown},
    scenario::ScenarioReport,
    transaction::{TransactionId, TransactionRecord},
};
use chrono::Utc;
use chrono_tz::Tz;
use client::{Client, ClientError};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use engine::{
    Dialect, Transaction, export,
    store::{Completion, FetchResult, FetchTicket, StoreUpdate, TransactionStore},
    view::{ViewQuery, derive_view},
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    poller::Poller,
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

pub use form::{FormField, FormState};

const TOAST_TTL: Duration = Duration::from_secs(4);

/// Results of background work, drained by the event loop.
#[derive(Debug)]
pub enum AppEvent {
    PollTick {
        generation: u64,
    },
    Fetched {
        ticket: FetchTicket,
        result: FetchResult,
    },
    Submitted(std::result::Result<Option<TransactionRecord>, ClientError>),
    Deleted {
        id: TransactionId,
        result: std::result::Result<(), ClientError>,
    },
    Insights {
        rules: std::result::Result<RuleBreakdown, ClientError>,
        effectiveness: std::result::Result<Effectiveness, ClientError>,
    },
    Scenarios(std::result::Result<ScenarioReport, ClientError>),
    Health(std::result::Result<Health, ClientError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Transactions,
    Metrics,
    Scenarios,
}

impl Section {
    pub const ALL: [Section; 3] = [Self::Transactions, Self::Metrics, Self::Scenarios];

    pub fn label(self) -> &'static str {
        match self {
            Self::Transactions => "Transactions",
            Self::Metrics => "Metrics",
            Self::Scenarios => "Scenarios",
        }
    }

    pub fn shortcut(self) -> char {
        match self {
            Self::Transactions => 't',
            Self::Metrics => 'm',
            Self::Scenarios => 's',
        }
    }

    fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransactionsMode {
    #[default]
    List,
    Search,
    ConfirmDelete(TransactionId),
}

#[derive(Debug, Default)]
pub struct TransactionsState {
    /// Derived view of the store under `query`.
    pub items: Vec<Transaction>,
    pub query: ViewQuery,
    pub selected: usize,
    pub detail_open: bool,
    pub mode: TransactionsMode,
}

impl TransactionsState {
    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1).min(self.items.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&Transaction> {
        self.items.get(self.selected)
    }

    fn rederive(&mut self, store: &TransactionStore) {
        self.items = derive_view(store.transactions(), &self.query);
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
        if self.items.is_empty() {
            self.detail_open = false;
        }
    }
}

#[derive(Debug, Default)]
pub struct InsightsState {
    pub rules: Option<RuleBreakdown>,
    pub effectiveness: Option<Effectiveness>,
    pub error: Option<String>,
    pub loading: bool,
}

#[derive(Debug, Default)]
pub struct ScenariosState {
    pub report: Option<ScenarioReport>,
    pub error: Option<String>,
    pub running: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HealthState {
    #[default]
    Unknown,
    Up(String),
    Down(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    pub expires_at: Instant,
}

#[derive(Debug)]
pub struct AppState {
    pub section: Section,
    pub store: TransactionStore,
    pub transactions: TransactionsState,
    pub form: Option<FormState>,
    pub insights: InsightsState,
    pub scenarios: ScenariosState,
    pub health: HealthState,
    pub live: bool,
    pub alerts: bool,
    pub dialect: Dialect,
    pub tz: Tz,
    pub base_url: String,
    pub toast: Option<ToastState>,
}

impl AppState {
    fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(ToastState {
            message: message.into(),
            level,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    fn expire_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|toast| toast.expires_at <= now) {
            self.toast = None;
        }
    }
}

pub struct App {
    config: AppConfig,
    client: Client,
    pub state: AppState,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    poller: Poller,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url, config.timeout())?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let poller = Poller::new(config.poll_interval(), events_tx.clone());
        let state = AppState {
            section: Section::Transactions,
            store: TransactionStore::new(),
            transactions: TransactionsState::default(),
            form: None,
            insights: InsightsState::default(),
            scenarios: ScenariosState::default(),
            health: HealthState::Unknown,
            live: config.live,
            alerts: config.alerts,
            dialect: config.dialect,
            tz: config.tz(),
            base_url: client.base_url().to_string(),
            toast: None,
        };

        Ok(Self {
            config,
            client,
            state,
            events_tx,
            events_rx,
            poller,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        tracing::info!(base_url = %self.state.base_url, "starting dashboard");
        self.refresh();
        self.check_health();
        self.sync_poller();

        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        self.poller.stop();
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            self.state.expire_toast(Instant::now());
            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            while let Ok(event) = self.events_rx.try_recv() {
                self.handle_event(event);
            }

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    _ => {}
                }
            }
            tokio::task::yield_now().await;
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::PollTick { generation } => {
                if !self.poller.is_current(generation) {
                    tracing::debug!(generation, "dropping tick from stopped timer");
                } else if self.state.store.is_fetching() {
                    tracing::debug!(generation, "fetch in flight, skipping tick");
                } else {
                    self.refresh();
                }
            }
            AppEvent::Fetched { ticket, result } => self.apply_fetch(ticket, result),
            AppEvent::Submitted(result) => match result {
                Ok(_) => {
                    self.state.form = None;
                    self.state
                        .show_toast(ToastLevel::Success, "Transaction submitted");
                    self.refresh();
                }
                Err(err) => {
                    tracing::warn!("submission rejected: {err}");
                    if let Some(form) = self.state.form.as_mut() {
                        form.submitting = false;
                        form.error = Some(err.message());
                    }
                }
            },
            AppEvent::Deleted { id, result } => match result {
                Ok(()) => {
                    self.state
                        .show_toast(ToastLevel::Success, format!("Transaction {id} deleted"));
                    self.refresh();
                }
                Err(err) => {
                    tracing::warn!(%id, "delete failed: {err}");
                    self.state.show_toast(ToastLevel::Error, err.message());
                }
            },
            AppEvent::Insights {
                rules,
                effectiveness,
            } => {
                let insights = &mut self.state.insights;
                insights.loading = false;
                insights.error = None;
                match rules {
                    Ok(rules) => insights.rules = Some(rules),
                    Err(err) => insights.error = Some(err.message()),
                }
                match effectiveness {
                    Ok(effectiveness) => insights.effectiveness = Some(effectiveness),
                    Err(err) => insights.error = Some(err.message()),
                }
            }
            AppEvent::Scenarios(result) => {
                self.state.scenarios.running = false;
                match result {
                    Ok(report) => {
                        self.state.show_toast(
                            ToastLevel::Info,
                            format!(
                                "Scenarios: {}/{} passed",
                                report.passed, report.total_scenarios
                            ),
                        );
                        self.state.scenarios.error = None;
                        self.state.scenarios.report = Some(report);
                    }
                    Err(err) => {
                        self.state.scenarios.error = Some(err.message());
                    }
                }
            }
            AppEvent::Health(result) => {
                self.state.health = match result {
                    Ok(health) => HealthState::Up(health.status.unwrap_or_else(|| "UP".to_string())),
                    Err(err) => HealthState::Down(err.message()),
                };
            }
        }
    }

    fn apply_fetch(&mut self, ticket: FetchTicket, result: FetchResult) {
        let update = StoreUpdate::from_fetch(result, self.state.tz, &mut rand::thread_rng(), Utc::now());
        match self.state.store.complete(ticket, update) {
            Completion::Stale => {}
            Completion::Applied { high_risk } => {
                self.state.transactions.rederive(&self.state.store);
                if high_risk && self.state.alerts {
                    self.alert();
                }
            }
        }
    }

    fn alert(&mut self) {
        let mut stdout = std::io::stdout();
        if let Err(err) = stdout.write_all(b"\x07").and_then(|()| stdout.flush()) {
            tracing::warn!("could not ring terminal bell: {err}");
        }
        self.state
            .show_toast(ToastLevel::Warning, "High risk transaction detected");
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }

        if self.state.form.is_some() {
            self.handle_form_key(action);
            return;
        }

        match self.state.transactions.mode.clone() {
            TransactionsMode::Search => self.handle_search_key(action),
            TransactionsMode::ConfirmDelete(id) => self.handle_confirm_key(action, id),
            TransactionsMode::List => self.handle_list_key(action),
        }
    }

    fn handle_form_key(&mut self, action: AppAction) {
        match action {
            AppAction::Submit => return self.submit(),
            AppAction::Cancel => {
                self.state.form = None;
                return;
            }
            _ => {}
        }
        let Some(form) = self.state.form.as_mut() else {
            return;
        };
        match action {
            AppAction::NextField | AppAction::Down => form.next_field(),
            AppAction::PrevField | AppAction::Up => form.prev_field(),
            AppAction::Backspace => form.backspace(),
            AppAction::Input(ch) => form.input(ch),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, action: AppAction) {
        let transactions = &mut self.state.transactions;
        match action {
            AppAction::Submit => transactions.mode = TransactionsMode::List,
            AppAction::Cancel => {
                transactions.mode = TransactionsMode::List;
                transactions.query.search.clear();
            }
            AppAction::Backspace => {
                transactions.query.search.pop();
            }
            AppAction::Input(ch) => transactions.query.search.push(ch),
            _ => return,
        }
        transactions.rederive(&self.state.store);
    }

    fn handle_confirm_key(&mut self, action: AppAction, id: TransactionId) {
        self.state.transactions.mode = TransactionsMode::List;
        if matches!(action, AppAction::Input('y' | 'Y')) {
            self.delete(id);
        }
    }

    fn handle_list_key(&mut self, action: AppAction) {
        match action {
            AppAction::NextField => self.set_section(self.state.section.next()),
            AppAction::Up if self.on_transactions() => self.state.transactions.select_prev(),
            AppAction::Down if self.on_transactions() => self.state.transactions.select_next(),
            AppAction::Submit if self.on_transactions() => {
                let transactions = &mut self.state.transactions;
                transactions.detail_open =
                    !transactions.detail_open && transactions.selected_item().is_some();
            }
            AppAction::Cancel => self.state.transactions.detail_open = false,
            AppAction::Input(ch) => self.handle_command(ch),
            _ => {}
        }
    }

    fn handle_command(&mut self, ch: char) {
        match ch {
            'q' | 'Q' => self.should_quit = true,
            't' | 'T' => self.set_section(Section::Transactions),
            'm' | 'M' => self.set_section(Section::Metrics),
            's' | 'S' => self.set_section(Section::Scenarios),
            'r' | 'R' => {
                self.refresh();
                self.check_health();
                if self.state.section == Section::Metrics {
                    self.load_insights();
                }
            }
            'l' | 'L' => {
                self.state.live = !self.state.live;
                let label = if self.state.live { "on" } else { "off" };
                self.state
                    .show_toast(ToastLevel::Info, format!("Live updates {label}"));
                self.sync_poller();
            }
            'b' | 'B' => {
                self.state.alerts = !self.state.alerts;
                let label = if self.state.alerts { "on" } else { "off" };
                self.state
                    .show_toast(ToastLevel::Info, format!("Alerts {label}"));
            }
            'x' | 'X' => {
                self.set_section(Section::Scenarios);
                self.run_scenarios();
            }
            _ if self.on_transactions() => self.handle_transactions_command(ch),
            _ => {}
        }
    }

    fn handle_transactions_command(&mut self, ch: char) {
        let transactions = &mut self.state.transactions;
        match ch {
            'j' | 'J' => transactions.select_next(),
            'k' | 'K' => transactions.select_prev(),
            '/' => transactions.mode = TransactionsMode::Search,
            '1' => transactions.query.filters.cycle_risk_level(),
            '2' => transactions.query.filters.cycle_approval_status(),
            '3' => transactions.query.filters.cycle_fraud_status(),
            'o' | 'O' => transactions.query.sort = transactions.query.sort.next(),
            'c' | 'C' => transactions.query = ViewQuery::default(),
            'n' | 'N' => {
                self.state.form = Some(FormState::default());
                return;
            }
            'd' | 'D' => {
                if let Some(id) = transactions.selected_item().map(|tx| tx.id.clone()) {
                    transactions.mode = TransactionsMode::ConfirmDelete(id);
                }
                return;
            }
            'e' | 'E' => {
                self.export();
                return;
            }
            _ => return,
        }
        transactions.rederive(&self.state.store);
    }

    fn on_transactions(&self) -> bool {
        self.state.section == Section::Transactions
    }

    fn set_section(&mut self, section: Section) {
        self.state.section = section;
        self.state.transactions.mode = TransactionsMode::List;
        if section == Section::Metrics
            && self.state.insights.rules.is_none()
            && !self.state.insights.loading
        {
            self.load_insights();
        }
        self.sync_poller();
    }

    fn sync_poller(&mut self) {
        self.poller.sync(self.state.live, self.on_transactions());
    }

    fn spawn_request<F>(&self, request: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            if events.send(request.await).is_err() {
                tracing::debug!("event loop gone, dropping result");
            }
        });
    }

    fn refresh(&mut self) {
        let ticket = self.state.store.begin_fetch();
        tracing::debug!(ticket = ticket.seq(), "refreshing");
        let client = self.client.clone();
        self.spawn_request(async move {
            let result = client.fetch_dashboard().await;
            AppEvent::Fetched { ticket, result }
        });
    }

    fn check_health(&self) {
        let client = self.client.clone();
        self.spawn_request(async move { AppEvent::Health(client.health().await) });
    }

    fn load_insights(&mut self) {
        self.state.insights.loading = true;
        let client = self.client.clone();
        self.spawn_request(async move {
            let (rules, effectiveness) =
                tokio::join!(client.rule_breakdown(), client.effectiveness());
            AppEvent::Insights {
                rules,
                effectiveness,
            }
        });
    }

    fn run_scenarios(&mut self) {
        if self.state.scenarios.running {
            return;
        }
        self.state.scenarios.running = true;
        let client = self.client.clone();
        self.spawn_request(async move { AppEvent::Scenarios(client.run_scenarios().await) });
    }

    fn submit(&mut self) {
        let Some(form) = self.state.form.as_mut() else {
            return;
        };
        if form.submitting {
            return;
        }
        let payload = match form.form.validate() {
            Ok(payload) => payload,
            Err(err) => {
                form.error = Some(err.to_string());
                return;
            }
        };
        form.error = None;
        form.submitting = true;

        let client = self.client.clone();
        self.spawn_request(async move {
            AppEvent::Submitted(client.create_transaction(&payload).await)
        });
    }

    fn delete(&mut self, id: TransactionId) {
        let client = self.client.clone();
        self.spawn_request(async move {
            let result = client.delete_transaction(&id).await;
            AppEvent::Deleted { id, result }
        });
    }

    fn export(&mut self) {
        let today = Utc::now().with_timezone(&self.state.tz).date_naive();
        let path = self
            .config
            .export_dir
            .join(export::report_file_name(today));
        match write_report(
            &path,
            &self.state.transactions.items,
            self.state.dialect,
            self.state.tz,
        ) {
            Ok(rows) => self.state.show_toast(
                ToastLevel::Success,
                format!("Exported {rows} rows to {}", path.display()),
            ),
            Err(err) => {
                tracing::warn!(path = %path.display(), "export failed: {err}");
                self.state.show_toast(ToastLevel::Error, err.to_string());
            }
        }
    }
}

fn write_report(path: &Path, view: &[Transaction], dialect: Dialect, tz: Tz) -> Result<usize> {
    let mut writer = BufWriter::new(File::create(path)?);
    let rows = export::export_csv(view, dialect, tz, &mut writer)?;
    writer.flush()?;
    Ok(rows)
}
