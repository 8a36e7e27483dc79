//! Tracking screen: submitted requests with their status timelines

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::layout::page_block;
use crate::tracking::{RequestStatus, TrackedRequest};

fn status_color(status: RequestStatus) -> Color {
    match status {
        RequestStatus::Pending => Color::Yellow,
        RequestStatus::Accepted => Color::Blue,
        RequestStatus::InProgress => Color::Magenta,
        RequestStatus::Completed => Color::Green,
    }
}

pub struct TrackView {
    requests: Vec<TrackedRequest>,
    state: ListState,
}

impl TrackView {
    pub fn new(requests: Vec<TrackedRequest>) -> Self {
        let mut view = Self {
            requests: Vec::new(),
            state: ListState::default(),
        };
        view.set_requests(requests);
        view
    }

    /// Replace the list, keeping the selection when possible
    pub fn set_requests(&mut self, requests: Vec<TrackedRequest>) {
        let selected = match self.state.selected() {
            _ if requests.is_empty() => None,
            Some(i) => Some(i.min(requests.len() - 1)),
            None => Some(0),
        };
        self.requests = requests;
        self.state.select(selected);
    }

    pub fn selected(&self) -> Option<&TrackedRequest> {
        self.requests.get(self.state.selected()?)
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        if self.requests.is_empty() {
            return;
        }
        let current = self.state.selected().unwrap_or(0);
        let last = self.requests.len() - 1;
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.state.select(Some(current.saturating_sub(1))),
            KeyCode::Down | KeyCode::Char('j') => self.state.select(Some((current + 1).min(last))),
            KeyCode::Home => self.state.select(Some(0)),
            KeyCode::End => self.state.select(Some(last)),
            _ => {}
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = page_block("Track Requests · Monitor your project status");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(inner);

        let items: Vec<ListItem> = self
            .requests
            .iter()
            .map(|r| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            format!("{} ", r.title),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("[{}]", r.status),
                            Style::default().fg(status_color(r.status)),
                        ),
                    ]),
                    Line::from(Span::styled(
                        format!("  #{} · {}", r.id, r.date),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!(" Requests ({}) ", self.requests.len()))
                    .borders(Borders::ALL),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, chunks[0], &mut self.state);

        let detail = match self.selected() {
            Some(request) => timeline_lines(request),
            None => vec![Line::from("No requests yet.")],
        };
        let detail = Paragraph::new(detail).block(
            Block::default()
                .title(" Timeline ")
                .borders(Borders::ALL),
        );
        frame.render_widget(detail, chunks[1]);
    }
}

fn timeline_lines(request: &TrackedRequest) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Est. cost: ", Style::default().fg(Color::Gray)),
            Span::raw(request.cost.clone()),
            Span::styled("   Duration: ", Style::default().fg(Color::Gray)),
            Span::raw(request.duration.clone()),
        ]),
        Line::from(""),
    ];
    for entry in &request.timeline {
        let (mark, style) = if entry.completed {
            ("●", Style::default().fg(Color::Green))
        } else {
            ("○", Style::default().fg(Color::DarkGray))
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {mark} "), style),
            Span::raw(format!("{:<20}", entry.state)),
            Span::styled(entry.date.clone(), Style::default().fg(Color::Gray)),
        ]));
    }
    lines
}
