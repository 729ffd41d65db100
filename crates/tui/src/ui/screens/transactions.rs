use chrono_tz::Tz;
use engine::{Dialect, Transaction};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState, Wrap},
};

use crate::{
    app::{AppState, TransactionsMode},
    ui::{components::card::Card, theme::Theme},
};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_header(frame, layout[0], state, theme);

    let selected = state.transactions.selected_item();
    match selected {
        Some(tx) if state.transactions.detail_open => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
                .split(layout[1]);
            render_table(frame, body[0], state, theme);
            render_detail(frame, body[1], tx, state.dialect, state.tz, theme);
        }
        _ => render_table(frame, layout[1], state, theme),
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let transactions = &state.transactions;
    let line = match &transactions.mode {
        TransactionsMode::ConfirmDelete(id) => Line::from(Span::styled(
            format!("Delete transaction {id}? (y to confirm)"),
            Style::default()
                .fg(theme.warning)
                .add_modifier(Modifier::BOLD),
        )),
        mode => {
            let cursor = if *mode == TransactionsMode::Search { "_" } else { "" };
            Line::from(vec![
                Span::raw(transactions.query.filters.describe(state.dialect)),
                Span::styled("  │  ", Style::default().fg(theme.border)),
                Span::styled("Sort", Style::default().fg(theme.dim)),
                Span::raw(format!(": {}", transactions.query.sort.as_str())),
                Span::styled("  │  ", Style::default().fg(theme.border)),
                Span::styled("Search", Style::default().fg(theme.dim)),
                Span::raw(": "),
                Span::styled(
                    format!("{}{cursor}", transactions.query.search),
                    Style::default().fg(theme.accent),
                ),
                Span::styled("  │  ", Style::default().fg(theme.border)),
                Span::styled(
                    format!(
                        "{} of {}",
                        transactions.items.len(),
                        state.store.transactions().len()
                    ),
                    Style::default().fg(theme.dim),
                ),
            ])
        }
    };

    Card::new("Filters", theme)
        .focused(transactions.mode == TransactionsMode::Search)
        .render_with(frame, area, Paragraph::new(line));
}

fn render_table(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let card = Card::new("Transactions", theme);
    let items = &state.transactions.items;
    if items.is_empty() {
        let message = if state.store.transactions().is_empty() {
            "Waiting for data..."
        } else {
            "No transactions match the current filters"
        };
        card.render_with(
            frame,
            area,
            Paragraph::new(Line::from(Span::styled(
                message,
                Style::default().fg(theme.dim),
            )))
            .alignment(Alignment::Center),
        );
        return;
    }

    let header = Row::new(
        [
            "ID", "Account", "Amount", "Type", "Location", "Risk", "Score", "Status", "Fraud",
            "Time",
        ]
        .map(Cell::from),
    )
    .style(Style::default().fg(theme.dim).add_modifier(Modifier::BOLD));

    let rows = items.iter().map(|tx| {
        let status = tx.approval_status;
        Row::new(vec![
            Cell::from(tx.id.to_string()),
            Cell::from(tx.account_number.clone().unwrap_or_default()),
            Cell::from(tx.amount.to_string()),
            Cell::from(tx.transaction_type.map(|kind| kind.as_str()).unwrap_or("-")),
            Cell::from(tx.location.clone().unwrap_or_default()),
            Cell::from(tx.risk_level.map(|level| level.as_str()).unwrap_or("-"))
                .style(Style::default().fg(theme.risk(tx.risk_level))),
            Cell::from(tx.fraud_score.map(|score| score.to_string()).unwrap_or_default()),
            Cell::from(status.map(|s| state.dialect.status_label(s)).unwrap_or("-"))
                .style(Style::default().fg(theme.status(status))),
            Cell::from(if tx.is_fraud { "Yes" } else { "No" }).style(if tx.is_fraud {
                Style::default().fg(theme.error)
            } else {
                Style::default().fg(theme.dim)
            }),
            Cell::from(format_time(tx, state.tz)),
        ])
    });

    let widths = [
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(13),
        Constraint::Length(10),
        Constraint::Min(10),
        Constraint::Length(6),
        Constraint::Length(5),
        Constraint::Length(8),
        Constraint::Length(5),
        Constraint::Length(19),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(card.block())
        .style(Style::default().fg(theme.text))
        .row_highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    let mut table_state = TableState::default();
    table_state.select(Some(state.transactions.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_detail(
    frame: &mut Frame<'_>,
    area: Rect,
    tx: &Transaction,
    dialect: Dialect,
    tz: Tz,
    theme: &Theme,
) {
    let field = |name: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{name:<10}"), Style::default().fg(theme.dim)),
            Span::raw(value),
        ])
    };
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let lines = vec![
        field("ID", tx.id.to_string()),
        field("Account", text(&tx.account_number)),
        field(
            "Type",
            tx.transaction_type
                .map(|kind| kind.as_str().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        field("Amount", tx.amount.to_string()),
        field("Location", text(&tx.location)),
        field(
            "Place",
            format!("{}, {}", text(&tx.city), text(&tx.country)),
        ),
        Line::from(""),
        field(
            "Risk",
            format!(
                "{} ({})",
                tx.risk_level.map(|level| level.as_str()).unwrap_or("-"),
                tx.fraud_score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
            ),
        ),
        field(
            "Status",
            tx.approval_status
                .map(|status| dialect.status_label(status).to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        field("Fraud", if tx.is_fraud { "Yes" } else { "No" }.to_string()),
        field("Reason", text(&tx.fraud_reason)),
        Line::from(""),
        field("Device", text(&tx.device_id)),
        field("IP", text(&tx.ip_address)),
        field("Merchant", text(&tx.merchant_id)),
        field("Time", format_time(tx, tz)),
    ];

    Card::new("Detail", theme)
        .focused(true)
        .render_with(frame, area, Paragraph::new(lines).wrap(Wrap { trim: true }));
}

fn format_time(tx: &Transaction, tz: Tz) -> String {
    tx.transaction_time
        .map(|time| time.with_timezone(&tz).format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
