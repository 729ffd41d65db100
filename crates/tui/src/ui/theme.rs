use engine::{ApprovalStatus, RiskLevel};
use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub surface: Color,
    pub surface_bright: Color,
    pub text: Color,
    pub dim: Color,
    pub text_muted: Color,
    pub accent: Color,
    pub border: Color,
    pub border_focused: Color,
    pub positive: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            surface: Color::Rgb(8, 12, 16),
            surface_bright: Color::Rgb(20, 26, 32),
            text: Color::Rgb(220, 220, 220),
            dim: Color::Rgb(140, 140, 140),
            text_muted: Color::Rgb(110, 118, 126),
            accent: Color::Rgb(80, 160, 160),
            border: Color::Rgb(52, 60, 68),
            border_focused: Color::Rgb(80, 160, 160),
            positive: Color::Rgb(90, 180, 110),
            warning: Color::Rgb(220, 170, 60),
            error: Color::Rgb(200, 80, 80),
        }
    }
}

impl Theme {
    pub fn risk(&self, level: Option<RiskLevel>) -> Color {
        match level {
            Some(RiskLevel::Low) => self.positive,
            Some(RiskLevel::Medium) => self.warning,
            Some(RiskLevel::High) => self.error,
            None => self.dim,
        }
    }

    pub fn status(&self, status: Option<ApprovalStatus>) -> Color {
        match status {
            Some(ApprovalStatus::Approved) => self.positive,
            Some(ApprovalStatus::Pending) | None => self.warning,
            Some(ApprovalStatus::Blocked) => self.error,
        }
    }
}
