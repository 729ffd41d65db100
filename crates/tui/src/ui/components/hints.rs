use ratatui::{style::Style, text::Span};

use crate::{
    app::{AppState, Section, TransactionsMode},
    ui::theme::Theme,
};

/// A keyboard hint consisting of a key and its action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {}", hint.action)));
    }

    spans
}

pub fn hint_separator(theme: &Theme) -> Span<'static> {
    Span::styled("  │  ", Style::default().fg(theme.border))
}

/// Hints for whatever currently has the keyboard.
pub fn context_hints(state: &AppState) -> Vec<KeyHint> {
    if state.form.is_some() {
        return vec![
            KeyHint::new("Tab", "next"),
            KeyHint::new("Enter", "submit"),
            KeyHint::new("Esc", "cancel"),
        ];
    }

    match state.section {
        Section::Transactions => match state.transactions.mode {
            TransactionsMode::List => vec![
                KeyHint::new("/", "search"),
                KeyHint::new("1/2/3", "risk/status/fraud"),
                KeyHint::new("o", "sort"),
                KeyHint::new("c", "clear"),
                KeyHint::new("Enter", "detail"),
                KeyHint::new("n", "new"),
                KeyHint::new("d", "delete"),
                KeyHint::new("e", "export"),
                KeyHint::new("r", "refresh"),
                KeyHint::new("l", "live"),
                KeyHint::new("b", "alerts"),
            ],
            TransactionsMode::Search => vec![
                KeyHint::new("Enter", "keep"),
                KeyHint::new("Esc", "clear"),
            ],
            TransactionsMode::ConfirmDelete(_) => vec![
                KeyHint::new("y", "delete"),
                KeyHint::new("any", "cancel"),
            ],
        },
        Section::Metrics => vec![KeyHint::new("r", "refresh")],
        Section::Scenarios => vec![KeyHint::new("x", "run all")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_alternate_key_and_action() {
        let theme = Theme::default();
        let spans = hints_to_spans(
            &[KeyHint::new("q", "quit"), KeyHint::new("r", "refresh")],
            &theme,
        );
        let text: String = spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(text, "q quit  r refresh");
    }
}
