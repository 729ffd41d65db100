use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{BarChart, Sparkline},
};

use crate::ui::{components::card::Card, theme::Theme};

/// Vertical bar chart inside a card.
pub fn render_bar_chart(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    data: &[(&str, u64)],
    theme: &Theme,
) {
    let card = Card::new(title, theme);
    let inner = card.inner(area);
    let slots = data.len().max(1) as u16;
    let bar_width = (inner.width / slots).saturating_sub(1).clamp(3, 9);

    let chart = BarChart::default()
        .data(data)
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme.accent))
        .value_style(Style::default().fg(theme.text).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(theme.dim));

    card.render_with(frame, area, chart);
}

/// Sparkline inside a card, for per-hour series.
pub fn render_sparkline(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    data: &[u64],
    theme: &Theme,
) {
    let sparkline = Sparkline::default()
        .data(data)
        .style(Style::default().fg(theme.error));
    Card::new(title, theme).render_with(frame, area, sparkline);
}

/// `████░░░░` showing `value / max` over `width` cells.
#[must_use]
pub fn ascii_bar(value: f64, max: f64, width: usize) -> String {
    if max.is_nan() || max <= 0.0 || !value.is_finite() {
        return "░".repeat(width);
    }

    let ratio = (value / max).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_bar_fills_proportionally() {
        assert_eq!(ascii_bar(5.0, 10.0, 4), "██░░");
        assert_eq!(ascii_bar(20.0, 10.0, 3), "███");
        assert_eq!(ascii_bar(1.0, 0.0, 2), "░░");
        assert_eq!(ascii_bar(f64::NAN, 10.0, 2), "░░");
    }
}
