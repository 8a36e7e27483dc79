//! Home screen: the product catalog with category chips and search

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::input::TextInput;
use super::layout::{accent_color, centered_rect, page_block, truncate};
use crate::catalog::{Catalog, Product, FILTER_CATEGORIES};

/// What the app should do after a catalog key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    None,
    /// Start a service request
    NewRequest,
}

pub struct Dashboard {
    catalog: Catalog,
    category: usize,
    search: TextInput,
    searching: bool,
    list_state: ListState,
    /// Product shown in the detail popup
    detail: Option<u32>,
}

impl Dashboard {
    pub fn new(catalog: Catalog) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            catalog,
            category: 0,
            search: TextInput::new("Search software..."),
            searching: false,
            list_state,
            detail: None,
        }
    }

    pub fn category(&self) -> &'static str {
        FILTER_CATEGORIES[self.category]
    }

    pub fn visible(&self) -> Vec<&Product> {
        self.catalog.filter(self.category(), self.search.value())
    }

    pub fn selected(&self) -> Option<&Product> {
        let index = self.list_state.selected()?;
        self.visible().get(index).copied()
    }

    pub fn is_capturing_input(&self) -> bool {
        self.searching
    }

    fn reset_selection(&mut self) {
        let select = if self.visible().is_empty() { None } else { Some(0) };
        self.list_state.select(select);
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        self.list_state.select(Some(next));
    }

    fn cycle_category(&mut self, forward: bool) {
        let count = FILTER_CATEGORIES.len();
        self.category = if forward {
            (self.category + 1) % count
        } else {
            (self.category + count - 1) % count
        };
        self.reset_selection();
    }

    pub fn handle_key(&mut self, key: KeyCode) -> DashboardAction {
        if self.searching {
            match key {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Down => self.searching = false,
                other => {
                    if self.search.handle_key(other) {
                        self.reset_selection();
                    }
                }
            }
            return DashboardAction::None;
        }

        if self.detail.is_some() {
            match key {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace => self.detail = None,
                KeyCode::Char('n') => {
                    self.detail = None;
                    return DashboardAction::NewRequest;
                }
                _ => {}
            }
            return DashboardAction::None;
        }

        match key {
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Left | KeyCode::Char('h') => self.cycle_category(false),
            KeyCode::Right | KeyCode::Char('l') => self.cycle_category(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Enter => self.detail = self.selected().map(|p| p.id),
            KeyCode::Char('n') => return DashboardAction::NewRequest,
            KeyCode::Esc => {
                self.search.clear();
                self.reset_selection();
            }
            _ => {}
        }
        DashboardAction::None
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = page_block("idea2code · Explore software");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Search
                Constraint::Length(1), // Categories
                Constraint::Min(3),    // Products
                Constraint::Length(1), // Hints
            ])
            .split(inner);

        let search = Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::Cyan)),
            self.search.line(self.searching).spans[0].clone(),
        ]);
        frame.render_widget(Paragraph::new(search), chunks[0]);

        let chips: Vec<Span> = FILTER_CATEGORIES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if i == self.category {
                    Span::styled(
                        format!(" {name} "),
                        Style::default().fg(Color::Black).bg(Color::White),
                    )
                } else {
                    Span::styled(format!(" {name} "), Style::default().fg(Color::Gray))
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(chips)), chunks[1]);

        let width = chunks[2].width as usize;
        let items: Vec<ListItem> = self
            .visible()
            .iter()
            .map(|p| {
                ListItem::new(Line::from(vec![
                    Span::styled("■ ", Style::default().fg(accent_color(p))),
                    Span::styled(
                        p.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {}", truncate(&p.subtitle, width.saturating_sub(p.title.len() + 8))),
                        Style::default().fg(Color::Gray),
                    ),
                ]))
            })
            .collect();

        if items.is_empty() {
            let empty = Paragraph::new("No products match your search.")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, chunks[2]);
        } else {
            let list = List::new(items)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, chunks[2], &mut self.list_state);
        }

        let hints = Paragraph::new(
            "/ search  ←/→ category  ↑/↓ select  Enter details  n new request",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hints, chunks[3]);

        if let Some(product) = self.detail.and_then(|id| self.catalog.get(id)) {
            render_detail(frame, product);
        }
    }
}

fn render_detail(frame: &mut Frame, product: &Product) {
    let area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            product.subtitle.clone(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            product.category.clone(),
            Style::default().fg(accent_color(product)),
        )),
        Line::from(""),
        Line::from(product.description.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "Key features",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    lines.extend(product.features.iter().map(|f| Line::from(format!("  ✓ {f}"))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "n request this software  Esc close",
        Style::default().fg(Color::DarkGray),
    )));

    let detail = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(format!(" {} ", product.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent_color(product))),
    );
    frame.render_widget(detail, area);
}
