pub mod card;
pub mod charts;
pub mod hints;
pub mod tabs;
pub mod toast;

use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};

/// A `width` x `height` rectangle centered in `area`, clipped to it.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    rect
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_clipped_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect(area, 20, 4);
        assert_eq!(rect, Rect::new(10, 3, 20, 4));

        let clipped = centered_rect(area, 80, 40);
        assert_eq!(clipped, area);
    }
}
