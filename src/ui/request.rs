//! Request wizard screen.
//!
//! The view owns a [`RequestWizard`] and mirrors its draft into editable
//! widgets. Every edit is pushed straight back into the wizard, which
//! persists it. Submission needs the auth gate and the navigator, so it
//! is handed to the app as [`RequestAction::Submit`].

use std::collections::BTreeMap;
use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use tracing::debug;
use tui_textarea::TextArea;

use super::input::TextInput;
use super::layout::page_block;
use crate::request::fields::{INDIVIDUAL_TEXT_FIELDS, ORGANISATION_TEXT_FIELDS};
use crate::request::{ClientType, FieldKey, Step, SOFTWARE_CATEGORIES};
use crate::wizard::{RequestWizard, Transition, WizardState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    None,
    /// The final step is valid; the app should run the submission
    Submit,
    /// Leave the wizard (draft is kept)
    Leave,
}

/// A focusable element of the current step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Choice(FieldKey),
    /// Index into [`RequestView::category_options`]
    Category(usize),
    Text(FieldKey),
    Summary,
    AttachPath,
    Attachment(usize),
}

impl Focus {
    fn field(self) -> Option<FieldKey> {
        match self {
            Focus::Choice(key) | Focus::Text(key) => Some(key),
            Focus::Category(_) => Some(FieldKey::SoftwareCategories),
            Focus::Summary => Some(FieldKey::Summary),
            Focus::AttachPath | Focus::Attachment(_) => Some(FieldKey::Attachments),
        }
    }
}

pub struct RequestView {
    wizard: RequestWizard,
    focus: usize,
    inputs: BTreeMap<FieldKey, TextInput>,
    summary: TextArea<'static>,
    attach_path: TextInput,
    notice: Option<String>,
}

impl RequestView {
    pub fn new(wizard: RequestWizard) -> Self {
        let draft = wizard.draft();
        let inputs = INDIVIDUAL_TEXT_FIELDS
            .iter()
            .chain(ORGANISATION_TEXT_FIELDS)
            .map(|key| {
                let value = key.read(draft).unwrap_or_default();
                (*key, TextInput::new(key.label()).with_value(&value))
            })
            .collect();
        let summary = TextArea::from(draft.summary.split('\n'));

        Self {
            wizard,
            focus: 0,
            inputs,
            summary,
            attach_path: TextInput::new("path/to/brief.pdf"),
            notice: None,
        }
    }

    pub fn wizard(&self) -> &RequestWizard {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut RequestWizard {
        &mut self.wizard
    }

    /// Short-lived message shown under the form
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// Whether the view consumes plain character keys
    pub fn is_capturing_input(&self) -> bool {
        matches!(
            self.current_focus(),
            Some(Focus::Text(_) | Focus::Summary | Focus::AttachPath)
        )
    }

    /// Preset categories followed by any custom ones already chosen
    fn category_options(&self) -> Vec<String> {
        let mut options: Vec<String> =
            SOFTWARE_CATEGORIES.iter().map(|c| (*c).to_string()).collect();
        for chosen in &self.wizard.draft().software_categories {
            if !options.contains(chosen) {
                options.push(chosen.clone());
            }
        }
        options
    }

    fn focus_items(&self) -> Vec<Focus> {
        let Some(step) = self.wizard.current_step() else {
            return Vec::new();
        };
        let draft = self.wizard.draft();

        match step {
            Step::ProjectInfo => std::iter::once(Focus::Choice(FieldKey::ProjectStage))
                .chain((0..self.category_options().len()).map(Focus::Category))
                .collect(),
            Step::Details => [
                Focus::Choice(FieldKey::Priority),
                Focus::Summary,
                Focus::AttachPath,
            ]
            .into_iter()
            .chain((0..draft.attachments.len()).map(Focus::Attachment))
            .collect(),
            Step::ClientInfo => {
                let mut items = vec![Focus::Choice(FieldKey::ClientType)];
                match draft.client_type {
                    Some(ClientType::Individual) => {
                        items.extend(INDIVIDUAL_TEXT_FIELDS.iter().map(|k| Focus::Text(*k)));
                        items.push(Focus::Choice(FieldKey::PreferredCommunication));
                    }
                    Some(ClientType::Organisation) => {
                        items.extend(ORGANISATION_TEXT_FIELDS.iter().map(|k| Focus::Text(*k)));
                        items.push(Focus::Choice(FieldKey::OrgPreferredCommunication));
                    }
                    None => {}
                }
                items
            }
        }
    }

    fn current_focus(&self) -> Option<Focus> {
        let items = self.focus_items();
        let last = items.len().checked_sub(1)?;
        items.get(self.focus.min(last)).copied()
    }

    fn move_focus(&mut self, forward: bool) {
        let len = self.focus_items().len();
        if len == 0 {
            return;
        }
        let current = self.focus.min(len - 1);
        self.focus = if forward {
            (current + 1).min(len - 1)
        } else {
            current.saturating_sub(1)
        };
    }

    /// Put focus on the first field that has an error
    fn focus_first_error(&mut self) {
        let errors = self.wizard.errors();
        if let Some(index) = self
            .focus_items()
            .iter()
            .position(|f| f.field().is_some_and(|k| errors.contains(k)))
        {
            self.focus = index;
        }
    }

    fn advance(&mut self) -> RequestAction {
        match self.wizard.next() {
            Transition::Moved(step) => {
                debug!(step = step.number(), "Moved to step");
                self.focus = 0;
                self.notice = None;
                RequestAction::None
            }
            Transition::Blocked(_) => {
                self.focus_first_error();
                RequestAction::None
            }
            Transition::ReadyToSubmit => RequestAction::Submit,
            Transition::Unchanged(_) => RequestAction::None,
        }
    }

    fn retreat(&mut self) -> RequestAction {
        match self.wizard.back() {
            Transition::Moved(_) => {
                self.focus = 0;
                self.notice = None;
                RequestAction::None
            }
            _ => RequestAction::Leave,
        }
    }

    /// Select the next or previous option of a choice field
    fn cycle_choice(&mut self, key: FieldKey, forward: bool) {
        let Some(options) = key.options() else {
            return;
        };
        let current = key.read(self.wizard.draft()).unwrap_or_default();
        let position = options.iter().position(|(wire, _)| *wire == current);
        let next = match (position, forward) {
            (None, true) => 0,
            (None, false) => options.len() - 1,
            (Some(i), true) => (i + 1) % options.len(),
            (Some(i), false) => (i + options.len() - 1) % options.len(),
        };
        self.apply(key, options[next].0);
    }

    fn apply(&mut self, key: FieldKey, value: &str) {
        if let Err(err) = self.wizard.update_field(key, value) {
            self.notice = Some(err.to_string());
        }
    }

    fn attach_from_path(&mut self) {
        let raw = self.attach_path.value().trim().to_string();
        if raw.is_empty() {
            return;
        }
        let path = Path::new(&raw);
        let name = path
            .file_name()
            .map_or_else(|| raw.clone(), |n| n.to_string_lossy().into_owned());

        let size = match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => {
                self.notice = Some(format!("File not found: {raw}"));
                return;
            }
        };

        match self.wizard.attach(&name, size) {
            Ok(attachment) => {
                self.notice = Some(format!(
                    "Attached {} ({})",
                    attachment.name, attachment.size_label
                ));
                self.attach_path.clear();
            }
            Err(err) => self.notice = Some(err.to_string()),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> RequestAction {
        if self.wizard.current_step().is_none() {
            return match key.code {
                KeyCode::Esc => RequestAction::Leave,
                _ => RequestAction::None,
            };
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            return self.advance();
        }

        let focus = self.current_focus();
        match key.code {
            KeyCode::Esc => return self.retreat(),
            KeyCode::Tab => {
                self.move_focus(true);
                return RequestAction::None;
            }
            KeyCode::BackTab => {
                self.move_focus(false);
                return RequestAction::None;
            }
            KeyCode::Down if focus != Some(Focus::Summary) => {
                self.move_focus(true);
                return RequestAction::None;
            }
            KeyCode::Up if focus != Some(Focus::Summary) => {
                self.move_focus(false);
                return RequestAction::None;
            }
            _ => {}
        }

        match focus {
            Some(Focus::Choice(field)) => match key.code {
                KeyCode::Left => self.cycle_choice(field, false),
                KeyCode::Right | KeyCode::Char(' ') => self.cycle_choice(field, true),
                KeyCode::Enter => return self.advance(),
                _ => {}
            },
            Some(Focus::Category(index)) => match key.code {
                KeyCode::Char(' ') => {
                    if let Some(category) = self.category_options().get(index).cloned() {
                        if let Err(err) = self.wizard.toggle_category(&category) {
                            self.notice = Some(err.to_string());
                        }
                    }
                }
                KeyCode::Enter => return self.advance(),
                _ => {}
            },
            Some(Focus::Text(field)) => match key.code {
                KeyCode::Enter => return self.advance(),
                code => {
                    let Some(input) = self.inputs.get_mut(&field) else {
                        return RequestAction::None;
                    };
                    if input.handle_key(code) {
                        let value = input.value().to_string();
                        self.apply(field, &value);
                    }
                }
            },
            Some(Focus::Summary) => {
                if self.summary.input(key) {
                    let value = self.summary.lines().join("\n");
                    self.apply(FieldKey::Summary, &value);
                }
            }
            Some(Focus::AttachPath) => match key.code {
                KeyCode::Enter => self.attach_from_path(),
                code => {
                    self.attach_path.handle_key(code);
                }
            },
            Some(Focus::Attachment(index)) => match key.code {
                KeyCode::Delete | KeyCode::Backspace | KeyCode::Char('x') => {
                    match self.wizard.remove_attachment(index) {
                        Ok(Some(removed)) => {
                            self.notice = Some(format!("Removed {}", removed.name));
                            self.move_focus(false);
                        }
                        Ok(None) => {}
                        Err(err) => self.notice = Some(err.to_string()),
                    }
                }
                KeyCode::Enter => return self.advance(),
                _ => {}
            },
            None => {}
        }
        RequestAction::None
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = page_block("New Request");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Progress
                Constraint::Length(1), // Step titles
                Constraint::Length(1),
                Constraint::Min(5),    // Form
                Constraint::Length(2), // Notice + hints
            ])
            .split(inner);

        let (current, total) = self.wizard.progress();
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(f64::from(current) / f64::from(total))
            .label(format!("Step {current} of {total}"));
        frame.render_widget(gauge, chunks[0]);

        let titles: Vec<Span> = Step::all()
            .iter()
            .map(|step| {
                let style = if Some(*step) == self.wizard.current_step() {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                Span::styled(format!(" {step}  "), style)
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(titles)), chunks[1]);

        match self.wizard.state() {
            WizardState::Editing(Step::Details) => self.render_details(frame, chunks[3]),
            WizardState::Editing(_) => self.render_lines(frame, chunks[3]),
            WizardState::Submitting => {
                let waiting = Paragraph::new("Submitting your request...")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Yellow));
                frame.render_widget(waiting, chunks[3]);
            }
            WizardState::Done => {
                let done = Paragraph::new("Request submitted. Track it from the Track tab.")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Green));
                frame.render_widget(done, chunks[3]);
            }
        }

        let mut footer = Vec::new();
        if let Some(err) = self.wizard.last_error() {
            footer.push(Line::from(Span::styled(
                format!("Submission failed: {err}. Press Ctrl+S to try again."),
                Style::default().fg(Color::Red),
            )));
        } else if let Some(notice) = &self.notice {
            footer.push(Line::from(Span::styled(
                notice.clone(),
                Style::default().fg(Color::Yellow),
            )));
        } else {
            footer.push(Line::from(""));
        }
        let action = if self.wizard.current_step().is_some_and(Step::is_last) {
            "submit"
        } else {
            "next"
        };
        footer.push(Line::from(Span::styled(
            format!("Tab/↑↓ move  ←/→/Space choose  Enter or Ctrl+S {action}  Esc back"),
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(Paragraph::new(footer), chunks[4]);
    }

    fn choice_line(&self, key: FieldKey, focused: bool) -> Line<'static> {
        let current = key.read(self.wizard.draft()).unwrap_or_default();
        let mut spans = vec![label_span(key.label(), focused)];
        for (wire, label) in key.options().unwrap_or_default() {
            let selected = wire == current;
            let marker = if selected { "(•)" } else { "( )" };
            let style = if selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!("{marker} {label}  "), style));
        }
        Line::from(spans)
    }

    fn error_line(&self, key: FieldKey) -> Option<Line<'static>> {
        self.wizard.errors().get(key).map(|message| {
            Line::from(Span::styled(
                format!("    ⚠ {message}"),
                Style::default().fg(Color::Red),
            ))
        })
    }

    /// Steps one and three: a scrolling list of lines
    fn render_lines(&self, frame: &mut Frame, area: Rect) {
        let focus = self.current_focus();
        let categories = self.category_options();
        let mut lines = Vec::new();
        let mut focus_line = 0usize;

        for item in self.focus_items() {
            let focused = Some(item) == focus;
            if focused {
                focus_line = lines.len();
            }
            match item {
                Focus::Choice(key) => {
                    lines.push(self.choice_line(key, focused));
                    lines.extend(self.error_line(key));
                }
                Focus::Category(index) => {
                    if index == 0 {
                        lines.push(Line::from(""));
                        lines.push(Line::from(label_span("Software categories", false)));
                    }
                    let name = &categories[index];
                    let checked = self.wizard.draft().software_categories.contains(name);
                    let style = if focused {
                        Style::default().add_modifier(Modifier::REVERSED)
                    } else if checked {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    let mark = if checked { "[x]" } else { "[ ]" };
                    lines.push(Line::from(Span::styled(format!("    {mark} {name}"), style)));
                    if index + 1 == categories.len() {
                        lines.extend(self.error_line(FieldKey::SoftwareCategories));
                    }
                }
                Focus::Text(key) => {
                    let mut spans = vec![label_span(key.label(), focused)];
                    if let Some(input) = self.inputs.get(&key) {
                        spans.extend(input.line(focused).spans);
                    }
                    lines.push(Line::from(spans));
                    lines.extend(self.error_line(key));
                }
                Focus::Summary | Focus::AttachPath | Focus::Attachment(_) => {}
            }
        }

        let visible = area.height as usize;
        let offset = focus_line.saturating_sub(visible.saturating_sub(2));
        let form = Paragraph::new(lines).scroll((offset as u16, 0));
        frame.render_widget(form, area);
    }

    /// Step two: priority, multi-line summary and attachments
    fn render_details(&mut self, frame: &mut Frame, area: Rect) {
        let focus = self.current_focus();
        let attachments = &self.wizard.draft().attachments;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(attachments.len() as u16 + 3),
            ])
            .split(area);

        let priority_focused = focus == Some(Focus::Choice(FieldKey::Priority));
        let mut priority = vec![self.choice_line(FieldKey::Priority, priority_focused)];
        priority.extend(self.error_line(FieldKey::Priority));
        frame.render_widget(Paragraph::new(priority), chunks[0]);

        let summary_focused = focus == Some(Focus::Summary);
        let summary_title = match self.wizard.errors().get(FieldKey::Summary) {
            Some(message) => format!(" Summary ⚠ {message} "),
            None => " Summary ".to_string(),
        };
        let border = if summary_focused { Color::Cyan } else { Color::Gray };
        self.summary.set_cursor_line_style(Style::default());
        self.summary.set_cursor_style(if summary_focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        });
        self.summary.set_placeholder_text("Describe your project idea...");
        self.summary.set_placeholder_style(Style::default().fg(Color::DarkGray));
        self.summary.set_block(
            Block::default()
                .title(summary_title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
        frame.render_widget(&self.summary, chunks[1]);

        let attach_focused = focus == Some(Focus::AttachPath);
        let mut lines = vec![Line::from(
            std::iter::once(label_span("Attach file", attach_focused))
                .chain(self.attach_path.line(attach_focused).spans)
                .collect::<Vec<_>>(),
        )];
        lines.push(Line::from(Span::styled(
            "    PDF or image, metadata only",
            Style::default().fg(Color::DarkGray),
        )));
        for (index, attachment) in self.wizard.draft().attachments.iter().enumerate() {
            let style = if focus == Some(Focus::Attachment(index)) {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(Color::Gray)
            };
            lines.push(Line::from(Span::styled(
                format!(
                    "    {} {}  {}",
                    attachment.kind.label(),
                    attachment.name,
                    attachment.size_label
                ),
                style,
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[2]);
    }
}

fn label_span(label: &str, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let marker = if focused { "> " } else { "  " };
    Span::styled(format!("{marker}{label}: "), style)
}
