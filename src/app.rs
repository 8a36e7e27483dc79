use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::auth::AuthGate;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::draft::DraftStore;
use crate::navigation::{NavigationHistory, Navigator, Route};
use crate::request::Validator;
use crate::storage::{FileStore, KeyValueStore};
use crate::submission::{
    SimulatedSubmitter, SubmissionCoordinator, SubmissionError, SubmissionReceipt,
};
use crate::tracking::RequestHistory;
use crate::ui::dashboard::{Dashboard, DashboardAction};
use crate::ui::info::{render_contact, render_profile};
use crate::ui::layout::{app_chunks, render_nav_bar, render_status};
use crate::ui::login::{LoginAction, LoginView};
use crate::ui::request::{RequestAction, RequestView};
use crate::ui::terminal_guard::{install_panic_hook, TerminalGuard};
use crate::ui::track::TrackView;
use crate::wizard::{RequestWizard, SubmitOutcome, SubmitStart};

type SubmissionResult = Result<SubmissionReceipt, SubmissionError>;

pub struct App {
    config: Config,
    gate: AuthGate,
    drafts: DraftStore,
    history: RequestHistory,
    coordinator: Arc<SubmissionCoordinator>,
    nav: NavigationHistory,
    /// Route seen by the last [`Self::sync_route`]
    last_route: Route,
    dashboard: Dashboard,
    track: TrackView,
    /// Created when the request screen is first shown
    request: Option<RequestView>,
    login: Option<LoginView>,
    /// Result of the submission task in flight, if any
    pending_submission: Option<oneshot::Receiver<SubmissionResult>>,
    status: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(config.storage_path()));
        Self::with_store(config, store)
    }

    /// Build the app over an explicit store
    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let history = RequestHistory::new(store.clone());
        let submitter = Arc::new(SimulatedSubmitter::new(
            history.clone(),
            &config.submission,
        ));
        let coordinator = Arc::new(SubmissionCoordinator::new(submitter, &config.submission));

        let track = TrackView::new(history.all_with_samples());
        let dashboard = Dashboard::new(Catalog::builtin()?);
        let nav = NavigationHistory::default();

        Ok(Self {
            gate: AuthGate::new(store.clone()),
            drafts: DraftStore::new(store),
            history,
            coordinator,
            last_route: nav.current().clone(),
            nav,
            dashboard,
            track,
            request: None,
            login: None,
            pending_submission: None,
            status: None,
            should_quit: false,
            config,
        })
    }

    pub fn route(&self) -> &Route {
        self.nav.current()
    }

    pub async fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let guard = TerminalGuard::new()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(self.config.ui.tick_rate_ms);
        info!(storage = %self.config.storage_path().display(), "Starting TUI");

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            self.tick(Instant::now());
        }

        drop(guard);
        Ok(())
    }

    /// Periodic work: finish sign-in and collect submission results
    pub fn tick(&mut self, now: Instant) {
        if let Some(login) = self.login.as_mut() {
            if let LoginAction::SignedIn(route) = login.poll(now) {
                self.complete_login(route);
            }
        }
        self.poll_submission();
        self.sync_route();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if !self.login.as_ref().is_some_and(LoginView::is_pending) {
            let tab = match key.code {
                KeyCode::F(n @ 1..=5) => Route::tabs().get(usize::from(n) - 1).cloned(),
                _ => None,
            };
            if let Some(route) = tab {
                self.status = None;
                self.nav.switch_tab(route);
                self.sync_route();
                return;
            }
        }

        match self.nav.current().clone() {
            Route::Dashboard => match self.dashboard.handle_key(key.code) {
                DashboardAction::NewRequest => self.nav.navigate(Route::Request),
                DashboardAction::None => {
                    if key.code == KeyCode::Char('q') && !self.dashboard.is_capturing_input() {
                        self.should_quit = true;
                    }
                }
            },
            Route::Request => self.handle_request_key(key),
            Route::Track => match key.code {
                KeyCode::Esc => {
                    self.nav.back();
                }
                KeyCode::Char('q') => self.should_quit = true,
                code => self.track.handle_key(code),
            },
            Route::About => match key.code {
                KeyCode::Char('s') if !self.gate.is_authenticated() => {
                    self.nav.navigate(Route::login_then(Route::About));
                }
                KeyCode::Char('o') if self.gate.is_authenticated() => self.sign_out(),
                KeyCode::Esc => {
                    self.nav.back();
                }
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            Route::Contact => match key.code {
                KeyCode::Esc => {
                    self.nav.back();
                }
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            Route::Login { .. } => {
                let action = match self.login.as_mut() {
                    Some(login) => login.handle_key(key.code, Instant::now()),
                    None => LoginAction::Cancel,
                };
                match action {
                    LoginAction::Cancel => {
                        self.nav.back();
                    }
                    LoginAction::SignedIn(route) => self.complete_login(route),
                    LoginAction::None => {}
                }
            }
        }

        self.sync_route();
    }

    fn handle_request_key(&mut self, key: KeyEvent) {
        self.ensure_request_view();
        let Some(view) = self.request.as_mut() else {
            return;
        };
        match view.handle_key(key) {
            RequestAction::Submit => self.start_submission(),
            RequestAction::Leave => {
                if !self.nav.back() {
                    self.nav.navigate(Route::Dashboard);
                }
            }
            RequestAction::None => {}
        }
    }

    fn ensure_request_view(&mut self) {
        let stale = self
            .request
            .as_ref()
            .map_or(true, |view| view.wizard().is_done());
        if stale && self.pending_submission.is_none() {
            self.open_request_view();
        }
    }

    /// Rebuild the wizard from the persisted draft and step
    fn open_request_view(&mut self) {
        let wizard = RequestWizard::open(
            self.drafts.clone(),
            Validator::new(&self.config.validation),
        );
        self.request = Some(RequestView::new(wizard));
    }

    /// React to a route change made by a key handler, the wizard or login
    fn sync_route(&mut self) {
        let current = self.nav.current().clone();
        if current == self.last_route {
            return;
        }
        let previous = std::mem::replace(&mut self.last_route, current.clone());

        match &current {
            Route::Request => {
                let from_login = matches!(previous, Route::Login { .. });
                if from_login && self.pending_submission.is_none() {
                    self.open_request_view();
                } else {
                    self.ensure_request_view();
                }
            }
            Route::Track => self.track.set_requests(self.history.all_with_samples()),
            Route::Login { return_to } => {
                let delay = Duration::from_millis(self.config.auth.login_delay_ms);
                self.login = Some(LoginView::new((**return_to).clone(), delay));
            }
            _ => {}
        }
        if !matches!(current, Route::Login { .. }) {
            self.login = None;
        }
    }

    fn complete_login(&mut self, route: Route) {
        match self.gate.login() {
            Ok(()) => {
                info!(to = %route, "Signed in");
                self.status = Some("Signed in".to_string());
                self.nav.return_from_login(route);
            }
            Err(err) => {
                warn!(error = %err, "Failed to persist sign-in");
                self.status = Some(format!("Sign-in failed: {err}"));
            }
        }
        self.sync_route();
    }

    fn sign_out(&mut self) {
        match self.gate.logout() {
            Ok(()) => {
                self.status = Some("Signed out".to_string());
                self.nav.switch_tab(Route::Dashboard);
            }
            Err(err) => {
                warn!(error = %err, "Failed to clear session");
                self.status = Some(format!("Sign-out failed: {err}"));
            }
        }
    }

    fn start_submission(&mut self) {
        let Some(view) = self.request.as_mut() else {
            return;
        };
        match view.wizard_mut().begin_submit(&self.gate, &mut self.nav) {
            SubmitStart::Ready(draft) => {
                let coordinator = Arc::clone(&self.coordinator);
                let (tx, rx) = oneshot::channel();
                tokio::spawn(async move {
                    let result = coordinator.submit(&draft).await;
                    let _ = tx.send(result);
                });
                self.pending_submission = Some(rx);
                view.set_notice("Submitting your request...");
            }
            SubmitStart::Blocked(errors) => {
                view.set_notice(format!("{} field(s) need attention", errors.len()));
            }
            SubmitStart::AwaitingLogin => {
                self.status = Some("Sign in to submit your request".to_string());
            }
            SubmitStart::NotReady(_) => {}
        }
    }

    fn poll_submission(&mut self) {
        let Some(rx) = self.pending_submission.as_mut() else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => Err(SubmissionError::Unavailable(
                "submission task ended unexpectedly".to_string(),
            )),
        };
        self.pending_submission = None;

        let Some(view) = self.request.as_mut() else {
            return;
        };
        match view.wizard_mut().finish_submit(result, &mut self.nav) {
            SubmitOutcome::Submitted(receipt) => {
                self.status = Some(format!("Request {} submitted", receipt.request_id));
                self.request = None;
            }
            SubmitOutcome::Failed(err) => {
                view.set_notice(format!("Submission failed: {err}. Your draft is saved."));
            }
            _ => {}
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let (body, status, nav) = app_chunks(frame.area());
        let route = self.nav.current().clone();

        match &route {
            Route::Dashboard => self.dashboard.render(frame, body),
            Route::Request => {
                if let Some(view) = self.request.as_mut() {
                    view.render(frame, body);
                }
            }
            Route::Track => self.track.render(frame, body),
            Route::About => render_profile(frame, body, self.gate.is_authenticated()),
            Route::Contact => render_contact(frame, body),
            Route::Login { .. } => {
                if let Some(login) = &self.login {
                    login.render(frame, body);
                }
            }
        }

        render_status(frame, status, self.status.as_deref());
        render_nav_bar(frame, nav, &route);
    }
}
