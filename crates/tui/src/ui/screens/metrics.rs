use api_types::metrics::{Effectiveness, RuleBreakdown};
use engine::metrics::{FraudRateBand, MetricsSnapshot, MetricsSource, SCORE_BUCKET_LABELS};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::{AppState, InsightsState},
    ui::{
        components::{
            card::{Card, StatCard},
            charts::{ascii_bar, render_bar_chart, render_sparkline},
        },
        theme::Theme,
    },
};

const BAR_WIDTH: usize = 20;

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let metrics = state.store.metrics();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(5),
            Constraint::Min(8),
        ])
        .split(area);

    render_headline(frame, rows[0], metrics, theme);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);
    let distribution: Vec<(&str, u64)> = SCORE_BUCKET_LABELS
        .iter()
        .copied()
        .zip(metrics.score_distribution)
        .collect();
    render_bar_chart(frame, charts[0], "Score distribution", &distribution, theme);
    render_risk_levels(frame, charts[1], metrics, theme);

    render_sparkline(
        frame,
        rows[2],
        "Fraud by hour (00-23)",
        &metrics.fraud_by_hour,
        theme,
    );

    let insights = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[3]);
    render_rules(frame, insights[0], &state.insights, theme);
    render_effectiveness(frame, insights[1], &state.insights, theme);
}

fn render_headline(frame: &mut Frame<'_>, area: Rect, metrics: &MetricsSnapshot, theme: &Theme) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    let band = metrics.fraud_rate_band();
    let band_color = match band {
        FraudRateBand::Healthy => theme.positive,
        FraudRateBand::Moderate => theme.warning,
        FraudRateBand::Critical => theme.error,
    };
    let source = match metrics.source {
        MetricsSource::Backend => "from backend",
        MetricsSource::Computed => "computed locally",
        MetricsSource::Mixed => "backend + local",
    };

    StatCard::new("Transactions", metrics.total_transactions.to_string(), theme)
        .subtitle(source)
        .render(frame, cards[0]);
    StatCard::new("Fraud rate", format!("{:.1}%", metrics.fraud_rate), theme)
        .subtitle(format!(
            "{} flagged, {}",
            metrics.fraud_transactions,
            band.label()
        ))
        .value_color(band_color)
        .render(frame, cards[1]);
    StatCard::new(
        "High risk",
        metrics.high_risk_transactions.to_string(),
        theme,
    )
    .subtitle(format!("avg score {:.1}", metrics.average_fraud_score))
    .value_color(theme.error)
    .render(frame, cards[2]);
    StatCard::new("Blocked", metrics.blocked_amount.to_string(), theme)
        .render(frame, cards[3]);
}

fn render_risk_levels(frame: &mut Frame<'_>, area: Rect, metrics: &MetricsSnapshot, theme: &Theme) {
    let total = (metrics.low_risk_count + metrics.medium_risk_count + metrics.high_risk_count) as f64;
    let row = |label: &'static str, count: u64, color: Color| {
        Line::from(vec![
            Span::styled(format!("{label:<8}"), Style::default().fg(theme.dim)),
            Span::styled(
                ascii_bar(count as f64, total, BAR_WIDTH),
                Style::default().fg(color),
            ),
            Span::raw(format!(" {count}")),
        ])
    };
    let lines = vec![
        row("LOW", metrics.low_risk_count, theme.positive),
        row("MEDIUM", metrics.medium_risk_count, theme.warning),
        row("HIGH", metrics.high_risk_count, theme.error),
    ];

    Card::new("Risk levels", theme).render_with(frame, area, Paragraph::new(lines));
}

fn render_rules(frame: &mut Frame<'_>, area: Rect, insights: &InsightsState, theme: &Theme) {
    let card = Card::new("Rule breakdown", theme);
    let Some(rules) = &insights.rules else {
        card.render_with(frame, area, placeholder(insights, theme));
        return;
    };

    card.render_with(frame, area, Paragraph::new(rule_lines(rules, theme)));
}

fn rule_lines(rules: &RuleBreakdown, theme: &Theme) -> Vec<Line<'static>> {
    let mut ranked: Vec<(&String, &u64)> = rules.rule_counts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let mut lines: Vec<Line<'static>> = ranked
        .into_iter()
        .map(|(rule, count)| {
            let percent = rules.rule_percentages.get(rule).copied().unwrap_or(0.0);
            Line::from(vec![
                Span::styled(format!("{rule:<24}"), Style::default().fg(theme.text)),
                Span::styled(
                    ascii_bar(percent, 100.0, 12),
                    Style::default().fg(theme.accent),
                ),
                Span::raw(format!(" {count} ({percent:.1}%)")),
            ])
        })
        .collect();

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No rule triggered yet",
            Style::default().fg(theme.dim),
        )));
    }
    if let Some(total) = rules.total_rule_triggers {
        lines.push(Line::from(Span::styled(
            format!("{total} triggers in total"),
            Style::default().fg(theme.dim),
        )));
    }
    lines
}

fn render_effectiveness(
    frame: &mut Frame<'_>,
    area: Rect,
    insights: &InsightsState,
    theme: &Theme,
) {
    let card = Card::new("Detection effectiveness", theme);
    let Some(effectiveness) = &insights.effectiveness else {
        card.render_with(frame, area, placeholder(insights, theme));
        return;
    };

    card.render_with(
        frame,
        area,
        Paragraph::new(effectiveness_lines(effectiveness, theme)),
    );
}

fn effectiveness_lines(effectiveness: &Effectiveness, theme: &Theme) -> Vec<Line<'static>> {
    let rate = |name: &'static str, value: Option<f64>| {
        let value = value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}%"));
        Line::from(vec![
            Span::styled(format!("{name:<16}"), Style::default().fg(theme.dim)),
            Span::raw(value),
        ])
    };

    let mut lines = vec![
        rate("Detection rate", effectiveness.detection_rate),
        rate("False positives", effectiveness.false_positive_rate),
        rate("Accuracy", effectiveness.accuracy),
        rate("Precision", effectiveness.precision),
        rate("Recall", effectiveness.recall),
        rate("F1", effectiveness.f1_score),
    ];
    if let Some(rating) = &effectiveness.rating {
        let score = effectiveness
            .effectiveness_score
            .map(|s| format!(" ({s:.1})"))
            .unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!("Rating: {rating}{score}"),
            Style::default().fg(theme.accent),
        )));
    }
    lines.extend(effectiveness.recommendations.iter().map(|tip| {
        Line::from(Span::styled(
            format!("- {tip}"),
            Style::default().fg(theme.text_muted),
        ))
    }));
    lines
}

fn placeholder(insights: &InsightsState, theme: &Theme) -> Paragraph<'static> {
    let line = match (&insights.error, insights.loading) {
        (Some(err), _) => Line::from(Span::styled(err.clone(), Style::default().fg(theme.error))),
        (None, true) => Line::from(Span::styled("Loading...", Style::default().fg(theme.dim))),
        (None, false) => Line::from(Span::styled(
            "Press r to load",
            Style::default().fg(theme.dim),
        )),
    };
    Paragraph::new(line)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn rules_are_ranked_by_count() {
        let rules = RuleBreakdown {
            rule_counts: BTreeMap::from([
                ("HIGH_AMOUNT".to_string(), 3),
                ("NEW_DEVICE".to_string(), 9),
            ]),
            rule_percentages: BTreeMap::from([
                ("HIGH_AMOUNT".to_string(), 25.0),
                ("NEW_DEVICE".to_string(), 75.0),
            ]),
            total_rule_triggers: Some(12),
            ..RuleBreakdown::default()
        };
        let lines = text(&rule_lines(&rules, &Theme::default()));

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("NEW_DEVICE"));
        assert!(lines[0].ends_with("9 (75.0%)"));
        assert!(lines[1].starts_with("HIGH_AMOUNT"));
        assert_eq!(lines[2], "12 triggers in total");
    }

    #[test]
    fn missing_rates_show_a_dash() {
        let effectiveness = Effectiveness {
            detection_rate: Some(91.0),
            rating: Some("GOOD".to_string()),
            ..Effectiveness::default()
        };
        let lines = text(&effectiveness_lines(&effectiveness, &Theme::default()));

        assert_eq!(lines[0], "Detection rate  91.0%");
        assert_eq!(lines[1], "False positives -");
        assert_eq!(lines[6], "Rating: GOOD");
    }
}
