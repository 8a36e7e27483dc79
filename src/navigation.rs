//! Application routes and the navigation seam used by the request wizard

use tracing::debug;

/// Screens the application can show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Product catalog (home)
    Dashboard,
    /// Multi-step service request
    Request,
    /// Submitted requests and their timelines
    Track,
    About,
    Contact,
    /// Sign-in screen that returns to `return_to` on success
    Login { return_to: Box<Route> },
}

impl Route {
    pub fn login_then(return_to: Route) -> Route {
        Route::Login {
            return_to: Box::new(return_to),
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/app",
            Route::Request => "/app/request",
            Route::Track => "/app/track",
            Route::About => "/app/about",
            Route::Contact => "/app/contact",
            Route::Login { .. } => "/login",
        }
    }

    /// Entries of the bottom navigation bar, in display order
    pub fn tabs() -> [Route; 5] {
        [
            Route::Dashboard,
            Route::Track,
            Route::Request,
            Route::About,
            Route::Contact,
        ]
    }

    pub fn tab_label(&self) -> &'static str {
        match self {
            Route::Dashboard => "Home",
            Route::Track => "Track",
            Route::Request => "New",
            Route::About => "Profile",
            Route::Contact => "Chat",
            Route::Login { .. } => "Sign in",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Moves the user between screens
pub trait Navigator {
    fn navigate(&mut self, route: Route);
}

/// Navigator that keeps a back stack
#[derive(Debug, Clone)]
pub struct NavigationHistory {
    stack: Vec<Route>,
}

impl Default for NavigationHistory {
    fn default() -> Self {
        Self::new(Route::Dashboard)
    }
}

impl NavigationHistory {
    pub fn new(start: Route) -> Self {
        Self { stack: vec![start] }
    }

    pub fn current(&self) -> &Route {
        // The stack never becomes empty: `back` keeps the root entry
        &self.stack[self.stack.len() - 1]
    }

    /// Return to the previous screen; returns false at the root
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// Replace the current entry instead of pushing a new one
    pub fn replace(&mut self, route: Route) {
        debug!(to = %route, "Replacing route");
        let last = self.stack.len() - 1;
        self.stack[last] = route;
    }

    /// Leave the login screen for its return target.
    ///
    /// When the screen under the login entry is already the target, the
    /// login entry is popped so the target is not stacked twice.
    pub fn return_from_login(&mut self, target: Route) {
        let depth = self.stack.len();
        if depth > 1 && self.stack[depth - 2] == target {
            debug!(to = %target, "Returning from login");
            self.stack.pop();
        } else {
            self.replace(target);
        }
    }

    /// Switch to a top-level tab: the stack becomes the root plus the tab
    pub fn switch_tab(&mut self, tab: Route) {
        debug!(to = %tab, "Switching tab");
        self.stack.truncate(1);
        if self.stack[0] != tab {
            self.stack.push(tab);
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.stack
    }
}

impl Navigator for NavigationHistory {
    fn navigate(&mut self, route: Route) {
        debug!(from = %self.current(), to = %route, "Navigating");
        if *self.current() != route {
            self.stack.push(route);
        }
    }
}
