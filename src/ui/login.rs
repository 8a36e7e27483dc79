//! Sign-in screen. Credentials are not checked; signing in only takes a
//! moment and then sets the session flag.

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::input::TextInput;
use super::layout::centered_rect;
use crate::navigation::Route;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    None,
    /// Abandon sign-in
    Cancel,
    /// Sign-in finished; continue to the return target
    SignedIn(Route),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginFocus {
    Email,
    Password,
}

pub struct LoginView {
    return_to: Route,
    email: TextInput,
    password: TextInput,
    focus: LoginFocus,
    delay: Duration,
    /// Set while the simulated sign-in is in progress
    pending_until: Option<Instant>,
}

impl LoginView {
    pub fn new(return_to: Route, delay: Duration) -> Self {
        Self {
            return_to,
            email: TextInput::new("you@company.com"),
            password: TextInput::new("••••••••").masked(),
            focus: LoginFocus::Email,
            delay,
            pending_until: None,
        }
    }

    pub fn return_to(&self) -> &Route {
        &self.return_to
    }

    pub fn is_pending(&self) -> bool {
        self.pending_until.is_some()
    }

    pub fn handle_key(&mut self, key: KeyCode, now: Instant) -> LoginAction {
        if self.is_pending() {
            return LoginAction::None;
        }

        match key {
            KeyCode::Esc => return LoginAction::Cancel,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    LoginFocus::Email => LoginFocus::Password,
                    LoginFocus::Password => LoginFocus::Email,
                };
            }
            KeyCode::Enter => self.pending_until = Some(now + self.delay),
            other => {
                let input = match self.focus {
                    LoginFocus::Email => &mut self.email,
                    LoginFocus::Password => &mut self.password,
                };
                input.handle_key(other);
            }
        }
        LoginAction::None
    }

    /// Finish a pending sign-in once its delay has elapsed
    pub fn poll(&mut self, now: Instant) -> LoginAction {
        match self.pending_until {
            Some(deadline) if now >= deadline => {
                self.pending_until = None;
                LoginAction::SignedIn(self.return_to.clone())
            }
            _ => LoginAction::None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 60, area);
        frame.render_widget(Clear, popup);

        let subtitle = if self.return_to == Route::Request {
            "Sign in to submit your request"
        } else {
            "Sign in to your account"
        };

        let field_style = |focused: bool| {
            if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            }
        };
        let email_focused = self.focus == LoginFocus::Email && !self.is_pending();
        let password_focused = self.focus == LoginFocus::Password && !self.is_pending();

        let mut lines = vec![
            Line::from(Span::styled(subtitle, Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(Span::styled("Email Address", field_style(email_focused))),
            self.email.line(email_focused),
            Line::from(""),
            Line::from(Span::styled("Password", field_style(password_focused))),
            self.password.line(password_focused),
            Line::from(""),
        ];
        if self.is_pending() {
            lines.push(Line::from(Span::styled(
                "Signing in...",
                Style::default().fg(Color::Yellow),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter sign in  Tab switch field  Esc cancel",
                Style::default().fg(Color::DarkGray),
            )));
        }

        let form = Paragraph::new(lines).block(
            Block::default()
                .title(" Welcome Back ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(form, popup);
    }
}
