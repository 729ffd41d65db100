pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use engine::store::DataSource;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, HealthState, Section};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::default();
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(1), // Data source banner
            Constraint::Length(2), // Tab bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    render_source_banner(frame, layout[1], state, &theme);
    components::tabs::render_tabs(frame, layout[2], state.section, &theme);

    match state.section {
        Section::Transactions => screens::transactions::render(frame, layout[3], state, &theme),
        Section::Metrics => screens::metrics::render(frame, layout[3], state, &theme),
        Section::Scenarios => screens::scenarios::render(frame, layout[3], state, &theme),
    }

    render_bottom_bar(frame, layout[4], state, &theme);
    if let Some(form) = &state.form {
        screens::form::render(frame, area, form, &theme);
    }
    components::toast::render(frame, area, state.toast.as_ref(), &theme);
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let label = |text: &'static str| Span::styled(text, Style::default().fg(theme.text_muted));
    let on_off = |flag: bool| if flag { "on" } else { "off" };

    let updated = state
        .store
        .last_updated()
        .map(|at| at.with_timezone(&state.tz).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let (health, health_style) = match &state.health {
        HealthState::Unknown => ("?".to_string(), Style::default().fg(theme.dim)),
        HealthState::Up(status) => (status.clone(), Style::default().fg(theme.positive)),
        HealthState::Down(_) => ("DOWN".to_string(), Style::default().fg(theme.error)),
    };
    let fetching = if state.store.is_fetching() { "  ⟳" } else { "" };

    let line = Line::from(vec![
        label("Backend"),
        Span::raw(format!(": {}  ", state.base_url)),
        label("Health"),
        Span::raw(": "),
        Span::styled(health, health_style),
        Span::raw("  "),
        label("Updated"),
        Span::raw(format!(": {updated}  ")),
        label("Live"),
        Span::raw(format!(": {}  ", on_off(state.live))),
        label("Alerts"),
        Span::raw(format!(": {}", on_off(state.alerts))),
        Span::styled(fetching, Style::default().fg(theme.accent)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_source_banner(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let source = state.store.source();
    let style = match source {
        DataSource::Empty => Style::default().fg(theme.dim),
        DataSource::Live => Style::default().fg(theme.positive),
        DataSource::Fallback => Style::default().fg(theme.warning),
        DataSource::Demo { .. } => Style::default()
            .fg(theme.error)
            .add_modifier(Modifier::BOLD),
    };
    let mut spans = vec![Span::styled(format!(" {} ", source.label()), style)];
    if let DataSource::Demo { reason } = source {
        spans.push(Span::styled(
            format!("({reason})"),
            Style::default().fg(theme.dim),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut parts = components::tabs::tab_shortcuts(theme);

    let context = components::hints::context_hints(state);
    if !context.is_empty() {
        parts.push(components::hints::hint_separator(theme));
        parts.extend(components::hints::hints_to_spans(&context, theme));
    }

    parts.push(components::hints::hint_separator(theme));
    parts.push(Span::styled("q", Style::default().fg(theme.accent)));
    parts.push(Span::raw(" quit"));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::{app::App, config::AppConfig};

    fn screen_text(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal.draw(|frame| render(frame, state)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn renders_every_section() {
        let mut app = App::new(AppConfig::default()).unwrap();
        let text = screen_text(&app.state);
        assert!(text.contains("Transactions"));
        assert!(text.contains("Loading"));

        app.state.section = Section::Metrics;
        assert!(screen_text(&app.state).contains("Fraud rate"));

        app.state.section = Section::Scenarios;
        assert!(screen_text(&app.state).contains("No scenario run yet"));
    }
}
