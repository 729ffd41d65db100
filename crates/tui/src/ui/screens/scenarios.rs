use api_types::scenario::ScenarioReport;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
};

use crate::{
    app::{AppState, ScenariosState},
    ui::{components::card::Card, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let scenarios = &state.scenarios;
    let Some(report) = &scenarios.report else {
        Card::new("Scenarios", theme).render_with(
            frame,
            area,
            Paragraph::new(status_line(scenarios, theme)).alignment(Alignment::Center),
        );
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    Card::new("Summary", theme).render_with(
        frame,
        layout[0],
        Paragraph::new(summary_line(report, scenarios, theme)),
    );
    render_results(frame, layout[1], report, theme);
}

fn status_line(scenarios: &ScenariosState, theme: &Theme) -> Line<'static> {
    match (&scenarios.error, scenarios.running) {
        (_, true) => Line::from(Span::styled(
            "Running scenarios...",
            Style::default().fg(theme.accent),
        )),
        (Some(err), false) => Line::from(Span::styled(
            err.clone(),
            Style::default().fg(theme.error),
        )),
        (None, false) => Line::from(Span::styled(
            "No scenario run yet. Press x to run every scenario.",
            Style::default().fg(theme.dim),
        )),
    }
}

fn summary_line(report: &ScenarioReport, scenarios: &ScenariosState, theme: &Theme) -> Line<'static> {
    let overall = report.overall_status.as_deref().unwrap_or("-");
    let color = if report.failed == 0 && report.total_scenarios > 0 {
        theme.positive
    } else if report.passed == 0 {
        theme.error
    } else {
        theme.warning
    };
    let mut spans = vec![
        Span::styled(
            overall.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "  {}/{} passed, {} failed ({:.1}%)",
            report.passed, report.total_scenarios, report.failed, report.success_rate
        )),
    ];
    if scenarios.running {
        spans.push(Span::styled("  running...", Style::default().fg(theme.accent)));
    }
    if let Some(err) = &scenarios.error {
        spans.push(Span::styled(
            format!("  last run failed: {err}"),
            Style::default().fg(theme.error),
        ));
    }
    Line::from(spans)
}

fn render_results(frame: &mut Frame<'_>, area: Rect, report: &ScenarioReport, theme: &Theme) {
    let header = Row::new(["Scenario", "Result", "Score", "Risk", "Message"].map(Cell::from))
        .style(Style::default().fg(theme.dim).add_modifier(Modifier::BOLD));

    let rows = report.scenarios.iter().map(|result| {
        let (label, color) = if result.test_passed {
            ("PASS", theme.positive)
        } else {
            ("FAIL", theme.error)
        };
        Row::new(vec![
            Cell::from(result.scenario.clone()),
            Cell::from(label).style(Style::default().fg(color)),
            Cell::from(
                result
                    .score
                    .map(|score| format!("{score:.0}"))
                    .unwrap_or_default(),
            ),
            Cell::from(result.risk.clone().unwrap_or_default()),
            Cell::from(result.message.clone().unwrap_or_default()),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(28),
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .style(Style::default().fg(theme.text))
    .block(Card::new("Results", theme).block());

    frame.render_widget(table, area);
}
