//! Step controller for the multi-step service request.
//!
//! The wizard owns the in-progress [`RequestDraft`] and writes it back to
//! the [`DraftStore`] after every mutation. Advancing is gated on the
//! current step's validation; final submission is gated on the session
//! through the [`AuthGate`].
//!
//! ```text
//! Editing(1) --next--> Editing(2) --next--> Editing(3) --submit--> Submitting --ok--> Done
//!     ^                    |  ^                 |                      |
//!     +-------back---------+  +------back-------+ <------failure-------+
//! ```

use tracing::{debug, info, warn};

use crate::auth::{AuthGate, AuthOutcome};
use crate::draft::DraftStore;
use crate::navigation::{Navigator, Route};
use crate::request::{
    set_field, Attachment, ErrorMap, FieldError, FieldKey, RequestDraft, Step, Validator,
};
use crate::submission::{SubmissionCoordinator, SubmissionError, SubmissionReceipt};

#[cfg(test)]
mod tests;

/// Where the wizard is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Editing(Step),
    /// A submission is in flight; the draft is read-only
    Submitting,
    /// Terminal: the request was accepted and the draft cleared
    Done,
}

/// Result of [`RequestWizard::next`] and [`RequestWizard::back`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Moved(Step),
    /// The current step has errors; the wizard stays put
    Blocked(ErrorMap),
    /// The final step is valid and can be submitted
    ReadyToSubmit,
    /// Nothing to do from this state
    Unchanged(WizardState),
}

/// Result of [`RequestWizard::begin_submit`]
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStart {
    /// The wizard is now `Submitting`; hand this draft to the coordinator
    Ready(RequestDraft),
    Blocked(ErrorMap),
    /// The user was sent to sign in; the wizard resumes at the final step
    AwaitingLogin,
    NotReady(WizardState),
}

/// Result of a complete submission attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted(SubmissionReceipt),
    Blocked(ErrorMap),
    AwaitingLogin,
    NotReady(WizardState),
    Failed(SubmissionError),
}

pub struct RequestWizard {
    state: WizardState,
    draft: RequestDraft,
    errors: ErrorMap,
    drafts: DraftStore,
    validator: Validator,
    last_error: Option<SubmissionError>,
}

impl RequestWizard {
    /// Hydrate from the draft store, resuming at the saved step
    pub fn open(drafts: DraftStore, validator: Validator) -> Self {
        let draft = drafts.load();
        let step = drafts.load_step().map_or(Step::FIRST, Step::clamped);
        debug!(step = step.number(), "Opening request wizard");

        Self {
            state: WizardState::Editing(step),
            draft,
            errors: ErrorMap::new(),
            drafts,
            validator,
            last_error: None,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    /// The step being edited, if any
    pub fn current_step(&self) -> Option<Step> {
        match self.state {
            WizardState::Editing(step) => Some(step),
            _ => None,
        }
    }

    pub fn draft(&self) -> &RequestDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.state == WizardState::Submitting
    }

    pub fn is_done(&self) -> bool {
        self.state == WizardState::Done
    }

    /// Failure of the most recent submission attempt
    pub fn last_error(&self) -> Option<&SubmissionError> {
        self.last_error.as_ref()
    }

    /// (current step number, step count) for the progress bar
    pub fn progress(&self) -> (u8, u8) {
        let current = match self.state {
            WizardState::Editing(step) => step.number(),
            WizardState::Submitting | WizardState::Done => Step::COUNT,
        };
        (current, Step::COUNT)
    }

    fn ensure_editable(&self) -> Result<(), FieldError> {
        match self.state {
            WizardState::Editing(_) => Ok(()),
            _ => Err(FieldError::Locked),
        }
    }

    fn persist(&self) {
        self.drafts.save(&self.draft);
    }

    /// Set one field from its raw value and clear its error
    pub fn update_field(&mut self, key: FieldKey, value: &str) -> Result<(), FieldError> {
        self.ensure_editable()?;
        set_field(&mut self.draft, key, value)?;
        self.errors.remove(key);
        self.persist();
        Ok(())
    }

    /// Add or remove a software category; returns whether it is now selected
    pub fn toggle_category(&mut self, category: &str) -> Result<bool, FieldError> {
        self.ensure_editable()?;
        let selected = self.draft.toggle_category_in_place(category);
        self.errors.remove(FieldKey::SoftwareCategories);
        self.persist();
        Ok(selected)
    }

    /// Attach a file by name and size
    pub fn attach(&mut self, name: &str, size_bytes: u64) -> Result<&Attachment, FieldError> {
        self.ensure_editable()?;
        let attachment = Attachment::from_file(name, size_bytes)?;
        self.draft.attachments.push(attachment);
        self.persist();
        let index = self.draft.attachments.len() - 1;
        Ok(&self.draft.attachments[index])
    }

    pub fn remove_attachment(&mut self, index: usize) -> Result<Option<Attachment>, FieldError> {
        self.ensure_editable()?;
        if index >= self.draft.attachments.len() {
            return Ok(None);
        }
        let removed = self.draft.attachments.remove(index);
        self.persist();
        Ok(Some(removed))
    }

    /// Validate the current step and advance when it is clean
    pub fn next(&mut self) -> Transition {
        let WizardState::Editing(step) = self.state else {
            return Transition::Unchanged(self.state);
        };

        let errors = self.validator.validate_step(&self.draft, step);
        if !errors.is_empty() {
            debug!(step = step.number(), count = errors.len(), "Step has errors");
            self.errors = errors.clone();
            return Transition::Blocked(errors);
        }
        self.errors.clear();

        match step.next() {
            Some(next) => {
                self.state = WizardState::Editing(next);
                self.drafts.save_step(next.number());
                Transition::Moved(next)
            }
            None => Transition::ReadyToSubmit,
        }
    }

    /// Return to the previous step without validating
    pub fn back(&mut self) -> Transition {
        let WizardState::Editing(step) = self.state else {
            return Transition::Unchanged(self.state);
        };
        let Some(prev) = step.prev() else {
            return Transition::Unchanged(self.state);
        };

        self.errors.clear();
        self.state = WizardState::Editing(prev);
        self.drafts.save_step(prev.number());
        Transition::Moved(prev)
    }

    /// Validate the final step and pass the auth gate.
    ///
    /// On `Ready` the wizard is `Submitting` until [`Self::finish_submit`]
    /// is called with the coordinator's result.
    pub fn begin_submit(&mut self, gate: &AuthGate, navigator: &mut dyn Navigator) -> SubmitStart {
        if self.state != WizardState::Editing(Step::LAST) {
            return SubmitStart::NotReady(self.state);
        }

        let errors = self.validator.validate_step(&self.draft, Step::LAST);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return SubmitStart::Blocked(errors);
        }
        self.errors.clear();

        match gate.ensure_authenticated(navigator, || self.draft.clone()) {
            AuthOutcome::Proceeded(draft) => {
                info!("Submitting request");
                self.state = WizardState::Submitting;
                self.last_error = None;
                SubmitStart::Ready(draft)
            }
            AuthOutcome::Redirected => SubmitStart::AwaitingLogin,
        }
    }

    /// Apply the coordinator's result to a submission in flight
    pub fn finish_submit(
        &mut self,
        result: Result<SubmissionReceipt, SubmissionError>,
        navigator: &mut dyn Navigator,
    ) -> SubmitOutcome {
        if self.state != WizardState::Submitting {
            return SubmitOutcome::NotReady(self.state);
        }

        match result {
            Ok(receipt) => {
                info!(request_id = %receipt.request_id, "Request submitted, clearing draft");
                self.drafts.clear();
                self.drafts.clear_step();
                self.draft = RequestDraft::default();
                self.state = WizardState::Done;
                navigator.navigate(Route::Track);
                SubmitOutcome::Submitted(receipt)
            }
            Err(err) => {
                warn!(error = %err, "Request submission failed, keeping draft");
                self.state = WizardState::Editing(Step::LAST);
                self.last_error = Some(err.clone());
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Validate, authenticate and submit in one call
    pub async fn submit(
        &mut self,
        gate: &AuthGate,
        coordinator: &SubmissionCoordinator,
        navigator: &mut dyn Navigator,
    ) -> SubmitOutcome {
        match self.begin_submit(gate, navigator) {
            SubmitStart::Ready(draft) => {
                let result = coordinator.submit(&draft).await;
                self.finish_submit(result, navigator)
            }
            SubmitStart::Blocked(errors) => SubmitOutcome::Blocked(errors),
            SubmitStart::AwaitingLogin => SubmitOutcome::AwaitingLogin,
            SubmitStart::NotReady(state) => SubmitOutcome::NotReady(state),
        }
    }
}
