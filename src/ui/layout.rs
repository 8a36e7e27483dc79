//! Screen chrome shared by every view

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::catalog::Product;
use crate::navigation::Route;

/// Split the screen into (body, status line, bottom navigation)
pub fn app_chunks(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

/// Bottom navigation with the active tab highlighted
pub fn render_nav_bar(frame: &mut Frame, area: Rect, current: &Route) {
    let mut spans = Vec::new();
    for (i, tab) in Route::tabs().iter().enumerate() {
        let style = if tab == current {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" F{} {} ", i + 1, tab.tab_label()), style));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled("Ctrl+C quit", Style::default().fg(Color::DarkGray)));

    let nav = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(nav, area);
}

pub fn render_status(frame: &mut Frame, area: Rect, message: Option<&str>) {
    if let Some(message) = message {
        let status =
            Paragraph::new(Span::styled(message.to_string(), Style::default().fg(Color::Yellow)));
        frame.render_widget(status, area);
    }
}

/// Header block with a title and a subtitle line
pub fn page_block(title: &str) -> Block<'static> {
    Block::default()
        .title(Span::styled(
            format!(" {title} "),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
}

/// Product accent as a terminal color
pub fn accent_color(product: &Product) -> Color {
    product
        .accent()
        .map_or(Color::White, |(r, g, b)| Color::Rgb(r, g, b))
}

/// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Trim `text` to `max` characters, ending with an ellipsis when cut
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(60, 50, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 20);
        assert_eq!(inner.y, 10);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Hospital Management", 10), "Hospita...");
    }

    #[test]
    fn test_app_chunks_reserve_nav() {
        let (body, status, nav) = app_chunks(Rect::new(0, 0, 80, 24));
        assert_eq!(nav.height, 3);
        assert_eq!(status.height, 1);
        assert_eq!(body.height, 20);
    }
}
