//! Profile (about us plus account) and contact screens

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::layout::page_block;

const ABOUT_SECTIONS: &[(&str, &str)] = &[
    (
        "Our Mission",
        "To empower enterprises with scalable, secure, and intuitive software solutions that drive growth and efficiency.",
    ),
    (
        "Our Vision",
        "A world where technology seamlessly integrates with business processes, eliminating friction and maximizing potential.",
    ),
    (
        "The Team",
        "We are a diverse group of engineers, designers, and strategists passionate about solving complex problems.",
    ),
];

/// (label, value) pairs of the contact screen
pub const CONTACT_CHANNELS: &[(&str, &str)] = &[
    ("Call Us", "+1 (555) 123-4567"),
    ("Email Us", "hello@techhub.com"),
    ("WhatsApp", "https://wa.me/15551234567"),
];

const OFFICE_ADDRESS: &[&str] = &["123 Innovation Drive", "Tech Valley, CA 94043"];

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

pub fn render_profile(frame: &mut Frame, area: Rect, signed_in: bool) {
    let block = page_block("Profile");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(inner);

    let (name, detail, hint) = if signed_in {
        ("John Doe", "john@company.com", "o sign out")
    } else {
        ("Guest User", "Not signed in", "s sign in")
    };
    let account = Paragraph::new(vec![
        Line::from(Span::styled(name, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(detail, Style::default().fg(Color::Gray))),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ])
    .block(Block::default().title(" Account ").borders(Borders::ALL));
    frame.render_widget(account, chunks[0]);

    let mut lines = vec![heading("About Us"), Line::from("Building trust through quality")];
    for (title, body) in ABOUT_SECTIONS {
        lines.push(Line::from(""));
        lines.push(heading(title));
        lines.push(Line::from(*body));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), chunks[1]);
}

pub fn render_contact(frame: &mut Frame, area: Rect) {
    let block = page_block("Contact Us · We're here to help");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    for (label, value) in CONTACT_CHANNELS {
        lines.push(Line::from(vec![
            Span::styled(format!("{label:<10}"), Style::default().fg(Color::Gray)),
            Span::styled(*value, Style::default().add_modifier(Modifier::BOLD)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(heading("Visit Our Office"));
    lines.extend(OFFICE_ADDRESS.iter().map(|l| Line::from(*l)));

    frame.render_widget(Paragraph::new(lines), inner);
}
