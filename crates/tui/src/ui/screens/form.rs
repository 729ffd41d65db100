use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
};

use crate::{
    app::{FormField, FormState},
    ui::{
        components::{card::Card, centered_rect},
        theme::Theme,
    },
};

/// "New transaction" overlay.
pub fn render(frame: &mut Frame<'_>, area: Rect, form: &FormState, theme: &Theme) {
    let rect = centered_rect(area, 60, 14);

    let mut lines: Vec<Line<'_>> = FormField::ALL
        .iter()
        .map(|&field| {
            let focused = field == form.focus;
            let label_style = if focused {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.dim)
            };
            let value = match field {
                FormField::Type => format!("< {} >", form.value(field)),
                _ if focused => format!("{}_", form.value(field)),
                _ => form.value(field).to_string(),
            };
            let marker = if focused { "› " } else { "  " };
            Line::from(vec![
                Span::styled(format!("{marker}{:<10}", field.label()), label_style),
                Span::styled(value, Style::default().fg(theme.text)),
            ])
        })
        .collect();

    lines.push(Line::from(""));
    if form.submitting {
        lines.push(Line::from(Span::styled(
            "Submitting...",
            Style::default().fg(theme.accent),
        )));
    } else if let Some(err) = &form.error {
        lines.push(Line::from(Span::styled(
            err.as_str(),
            Style::default().fg(theme.error),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Account, Amount and Location are required. Any key cycles Type.",
            Style::default().fg(theme.text_muted),
        )));
    }

    frame.render_widget(Clear, rect);
    Card::new("New transaction", theme)
        .focused(true)
        .render_with(frame, rect, Paragraph::new(lines).wrap(Wrap { trim: true }));
}
