use std::sync::Arc;

use super::*;
use crate::auth::AUTH_KEY;
use crate::config::SubmissionConfig;
use crate::draft::{DRAFT_KEY, STEP_KEY};
use crate::request::{ClientType, Priority, ProjectStage};
use crate::storage::{KeyValueStore, MemoryStore};
use crate::submission::SimulatedSubmitter;
use crate::tracking::RequestHistory;
use crate::navigation::NavigationHistory;

struct Harness {
    store: Arc<MemoryStore>,
    gate: AuthGate,
    nav: NavigationHistory,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            gate: AuthGate::new(store.clone()),
            store,
            nav: NavigationHistory::new(Route::Request),
        }
    }

    fn signed_in() -> Self {
        let harness = Self::new();
        harness.gate.login().unwrap();
        harness
    }

    fn drafts(&self) -> DraftStore {
        DraftStore::new(self.store.clone())
    }

    fn open(&self) -> RequestWizard {
        RequestWizard::open(self.drafts(), Validator::default())
    }

    fn coordinator(&self, failures: u32) -> (Arc<SimulatedSubmitter>, SubmissionCoordinator) {
        let config = SubmissionConfig {
            delay_ms: 0,
            max_retries: 2,
            retry_base_delay_ms: 1,
            retry_max_delay_ms: 2,
            simulate_failures: failures,
        };
        let history = RequestHistory::new(self.store.clone());
        let submitter = Arc::new(SimulatedSubmitter::new(history, &config));
        let coordinator = SubmissionCoordinator::new(submitter.clone(), &config);
        (submitter, coordinator)
    }
}

fn fill_step_one(wizard: &mut RequestWizard) {
    wizard.update_field(FieldKey::ProjectStage, "new").unwrap();
    wizard.toggle_category("Website").unwrap();
}

fn fill_step_two(wizard: &mut RequestWizard) {
    wizard.update_field(FieldKey::Priority, "high").unwrap();
    wizard
        .update_field(FieldKey::Summary, "A booking site for our clinic")
        .unwrap();
}

fn fill_step_three(wizard: &mut RequestWizard) {
    for (key, value) in [
        (FieldKey::ClientType, "individual"),
        (FieldKey::FullName, "Ravi Kumar"),
        (FieldKey::PhoneNumber, "9876543210"),
        (FieldKey::EmailId, "ravi@example.com"),
        (FieldKey::Address, "4 Park Street"),
        (FieldKey::State, "West Bengal"),
        (FieldKey::Pincode, "700016"),
        (FieldKey::PreferredCommunication, "videoMeeting"),
    ] {
        wizard.update_field(key, value).unwrap();
    }
}

fn wizard_at_final_step(harness: &Harness) -> RequestWizard {
    let mut wizard = harness.open();
    fill_step_one(&mut wizard);
    assert_eq!(wizard.next(), Transition::Moved(Step::Details));
    fill_step_two(&mut wizard);
    assert_eq!(wizard.next(), Transition::Moved(Step::ClientInfo));
    fill_step_three(&mut wizard);
    wizard
}

#[test]
fn test_empty_draft_blocks_step_one() {
    let harness = Harness::new();
    let mut wizard = harness.open();

    let Transition::Blocked(errors) = wizard.next() else {
        panic!("expected step one to be blocked");
    };
    assert_eq!(
        errors.keys().collect::<Vec<_>>(),
        vec![FieldKey::ProjectStage, FieldKey::SoftwareCategories]
    );
    assert_eq!(wizard.state(), WizardState::Editing(Step::ProjectInfo));
    assert_eq!(wizard.errors(), &errors);
    assert!(!harness.store.contains(STEP_KEY));
}

#[test]
fn test_valid_step_one_advances_and_persists() {
    let harness = Harness::new();
    let mut wizard = harness.open();
    fill_step_one(&mut wizard);

    assert_eq!(wizard.next(), Transition::Moved(Step::Details));
    assert_eq!(wizard.current_step(), Some(Step::Details));
    assert_eq!(harness.store.get(STEP_KEY).as_deref(), Some("2"));
    assert!(wizard.errors().is_empty());
}

#[test]
fn test_every_mutation_is_persisted() {
    let harness = Harness::new();
    let mut wizard = harness.open();

    wizard.update_field(FieldKey::ProjectStage, "existing").unwrap();
    assert_eq!(harness.drafts().load().project_stage, Some(ProjectStage::Existing));

    wizard.toggle_category("Consulting").unwrap();
    assert!(harness
        .drafts()
        .load()
        .software_categories
        .contains("Consulting"));

    wizard.attach("wireframes.png", 2_400_000).unwrap();
    assert_eq!(harness.drafts().load().attachments.len(), 1);

    assert_eq!(harness.drafts().load(), *wizard.draft());
}

#[test]
fn test_update_clears_only_that_error() {
    let harness = Harness::new();
    let mut wizard = harness.open();
    wizard.next();

    wizard.update_field(FieldKey::ProjectStage, "new").unwrap();
    assert!(!wizard.errors().contains(FieldKey::ProjectStage));
    assert!(wizard.errors().contains(FieldKey::SoftwareCategories));

    wizard.toggle_category("Website").unwrap();
    assert!(wizard.errors().is_empty());
}

#[test]
fn test_invalid_choice_leaves_draft_untouched() {
    let harness = Harness::new();
    let mut wizard = harness.open();
    wizard.update_field(FieldKey::Priority, "low").unwrap();

    let err = wizard.update_field(FieldKey::Priority, "urgent").unwrap_err();
    assert!(matches!(err, FieldError::InvalidChoice { .. }));
    assert_eq!(wizard.draft().priority, Some(Priority::Low));
    assert_eq!(harness.drafts().load().priority, Some(Priority::Low));
}

#[test]
fn test_blank_category_leaves_step_one_blocked() {
    let harness = Harness::new();
    let mut wizard = harness.open();
    wizard.update_field(FieldKey::ProjectStage, "new").unwrap();

    assert!(!wizard.toggle_category("   ").unwrap());
    assert!(wizard.draft().software_categories.is_empty());

    let Transition::Blocked(errors) = wizard.next() else {
        panic!("expected step one to stay blocked");
    };
    assert!(errors.contains(FieldKey::SoftwareCategories));
    assert_eq!(wizard.current_step(), Some(Step::ProjectInfo));
}

#[test]
fn test_toggle_category_twice_restores_draft() {
    let harness = Harness::new();
    let mut wizard = harness.open();
    let before = wizard.draft().clone();

    assert!(wizard.toggle_category("Mobile App").unwrap());
    assert!(!wizard.toggle_category("Mobile App").unwrap());
    assert_eq!(wizard.draft(), &before);
}

#[test]
fn test_unsupported_attachment_is_rejected() {
    let harness = Harness::new();
    let mut wizard = harness.open();

    let err = wizard.attach("notes.docx", 1_000).unwrap_err();
    assert!(matches!(err, FieldError::Attachment(_)));
    assert!(wizard.draft().attachments.is_empty());

    wizard.attach("brief.pdf", 512).unwrap();
    assert_eq!(wizard.remove_attachment(3).unwrap(), None);
    let removed = wizard.remove_attachment(0).unwrap().unwrap();
    assert_eq!(removed.name, "brief.pdf");
    assert!(harness.drafts().load().attachments.is_empty());
}

#[test]
fn test_back_skips_validation_and_stops_at_first_step() {
    let harness = Harness::new();
    let mut wizard = harness.open();
    fill_step_one(&mut wizard);
    wizard.next();

    assert_eq!(wizard.next(), Transition::Blocked(wizard.errors().clone()));
    assert_eq!(wizard.back(), Transition::Moved(Step::ProjectInfo));
    assert!(wizard.errors().is_empty());
    assert_eq!(harness.store.get(STEP_KEY).as_deref(), Some("1"));

    assert_eq!(
        wizard.back(),
        Transition::Unchanged(WizardState::Editing(Step::ProjectInfo))
    );
}

#[test]
fn test_next_on_valid_final_step_reports_ready() {
    let harness = Harness::new();
    let mut wizard = wizard_at_final_step(&harness);

    assert_eq!(wizard.next(), Transition::ReadyToSubmit);
    assert_eq!(wizard.state(), WizardState::Editing(Step::ClientInfo));
}

#[test]
fn test_open_resumes_saved_step_and_draft() {
    let harness = Harness::new();
    let wizard = wizard_at_final_step(&harness);
    let saved = wizard.draft().clone();
    drop(wizard);

    let reopened = harness.open();
    assert_eq!(reopened.current_step(), Some(Step::ClientInfo));
    assert_eq!(reopened.draft(), &saved);
}

#[test]
fn test_open_clamps_out_of_range_step() {
    for (raw, expected) in [("0", Step::ProjectInfo), ("-4", Step::ProjectInfo), ("9", Step::ClientInfo)] {
        let store = Arc::new(MemoryStore::with_entries([(STEP_KEY, raw)]));
        let wizard = RequestWizard::open(DraftStore::new(store), Validator::default());
        assert_eq!(wizard.current_step(), Some(expected), "saved step {raw}");
    }
}

#[test]
fn test_submit_requires_final_step() {
    let mut harness = Harness::signed_in();
    let mut wizard = harness.open();

    let start = wizard.begin_submit(&harness.gate, &mut harness.nav);
    assert_eq!(
        start,
        SubmitStart::NotReady(WizardState::Editing(Step::ProjectInfo))
    );
}

#[test]
fn test_submit_with_errors_is_blocked() {
    let mut harness = Harness::signed_in();
    let mut wizard = wizard_at_final_step(&harness);
    wizard.update_field(FieldKey::EmailId, "ravi at example").unwrap();

    let SubmitStart::Blocked(errors) = wizard.begin_submit(&harness.gate, &mut harness.nav) else {
        panic!("expected submission to be blocked");
    };
    assert_eq!(errors.get(FieldKey::EmailId), Some("Invalid email address"));
    assert_eq!(wizard.state(), WizardState::Editing(Step::ClientInfo));
}

#[tokio::test]
async fn test_unauthenticated_submit_redirects_to_login() {
    let mut harness = Harness::new();
    let (submitter, coordinator) = harness.coordinator(0);
    let mut wizard = wizard_at_final_step(&harness);
    // Saved step may lag behind; the gate must persist the final step itself
    harness.drafts().save_step(1);

    let outcome = wizard
        .submit(&harness.gate, &coordinator, &mut harness.nav)
        .await;

    assert_eq!(outcome, SubmitOutcome::AwaitingLogin);
    assert_eq!(submitter.attempts(), 0);
    assert_eq!(harness.store.get(STEP_KEY).as_deref(), Some("3"));
    assert!(harness.store.contains(DRAFT_KEY));
    assert_eq!(harness.nav.current(), &Route::login_then(Route::Request));

    // Sign in elsewhere, then come back to the wizard
    harness.store.set(AUTH_KEY, "true").unwrap();
    let resumed = harness.open();
    assert_eq!(resumed.current_step(), Some(Step::ClientInfo));
    assert_eq!(resumed.draft(), wizard.draft());
}

#[tokio::test]
async fn test_authenticated_submit_clears_draft() {
    let mut harness = Harness::signed_in();
    let (submitter, coordinator) = harness.coordinator(0);
    let mut wizard = wizard_at_final_step(&harness);

    let outcome = wizard
        .submit(&harness.gate, &coordinator, &mut harness.nav)
        .await;

    let SubmitOutcome::Submitted(receipt) = outcome else {
        panic!("expected submission to succeed, got {outcome:?}");
    };
    assert!(receipt.request_id.starts_with("REQ-"));
    assert_eq!(submitter.attempts(), 1);
    assert_eq!(wizard.state(), WizardState::Done);
    assert!(!harness.store.contains(DRAFT_KEY));
    assert!(!harness.store.contains(STEP_KEY));
    assert_eq!(harness.nav.current(), &Route::Track);
    assert!(wizard.draft().is_empty());
}

#[tokio::test]
async fn test_done_is_terminal() {
    let mut harness = Harness::signed_in();
    let (_, coordinator) = harness.coordinator(0);
    let mut wizard = wizard_at_final_step(&harness);
    wizard
        .submit(&harness.gate, &coordinator, &mut harness.nav)
        .await;

    assert_eq!(wizard.next(), Transition::Unchanged(WizardState::Done));
    assert_eq!(wizard.back(), Transition::Unchanged(WizardState::Done));
    assert_eq!(
        wizard.update_field(FieldKey::Summary, "more"),
        Err(FieldError::Locked)
    );
    assert_eq!(
        wizard
            .submit(&harness.gate, &coordinator, &mut harness.nav)
            .await,
        SubmitOutcome::NotReady(WizardState::Done)
    );
    assert!(!harness.store.contains(DRAFT_KEY));
}

#[tokio::test]
async fn test_failed_submission_keeps_draft_and_returns_to_final_step() {
    let mut harness = Harness::signed_in();
    let (submitter, coordinator) = harness.coordinator(5);
    let mut wizard = wizard_at_final_step(&harness);
    let draft = wizard.draft().clone();

    let outcome = wizard
        .submit(&harness.gate, &coordinator, &mut harness.nav)
        .await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(SubmissionError::Unavailable(_))
    ));
    assert_eq!(submitter.attempts(), 3);
    assert_eq!(wizard.state(), WizardState::Editing(Step::ClientInfo));
    assert!(wizard.last_error().is_some());
    assert_eq!(harness.drafts().load(), draft);
    assert_eq!(harness.store.get(STEP_KEY).as_deref(), Some("3"));
    assert_eq!(harness.nav.current(), &Route::Request);

    // The user may retry once the back end recovers
    submitter.fail_next(0);
    let retried = wizard
        .submit(&harness.gate, &coordinator, &mut harness.nav)
        .await;
    assert!(matches!(retried, SubmitOutcome::Submitted(_)));
    assert!(wizard.last_error().is_none());
}

#[tokio::test]
async fn test_transient_failures_within_budget_succeed() {
    let mut harness = Harness::signed_in();
    let (submitter, coordinator) = harness.coordinator(2);
    let mut wizard = wizard_at_final_step(&harness);

    let outcome = wizard
        .submit(&harness.gate, &coordinator, &mut harness.nav)
        .await;

    assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
    assert_eq!(submitter.attempts(), 3);
}

#[test]
fn test_two_phase_submit_locks_editing() {
    let mut harness = Harness::signed_in();
    let mut wizard = wizard_at_final_step(&harness);

    let SubmitStart::Ready(draft) = wizard.begin_submit(&harness.gate, &mut harness.nav) else {
        panic!("expected submission to start");
    };
    assert_eq!(&draft, wizard.draft());
    assert!(wizard.is_submitting());
    assert_eq!(wizard.progress(), (3, 3));
    assert_eq!(wizard.toggle_category("Website"), Err(FieldError::Locked));
    assert_eq!(
        wizard.begin_submit(&harness.gate, &mut harness.nav),
        SubmitStart::NotReady(WizardState::Submitting)
    );

    let outcome = wizard.finish_submit(
        Err(SubmissionError::Rejected("budget too low".into())),
        &mut harness.nav,
    );
    assert_eq!(
        outcome,
        SubmitOutcome::Failed(SubmissionError::Rejected("budget too low".into()))
    );
    assert_eq!(wizard.progress(), (3, 3));
    assert!(!wizard.is_submitting());
}

#[test]
fn test_switching_client_type_keeps_other_details() {
    let harness = Harness::new();
    let mut wizard = wizard_at_final_step(&harness);

    wizard.update_field(FieldKey::ClientType, "organisation").unwrap();
    assert_eq!(wizard.draft().client_type, Some(ClientType::Organisation));
    assert_eq!(wizard.draft().individual.full_name, "Ravi Kumar");

    let Transition::Blocked(errors) = wizard.next() else {
        panic!("organisation details are empty");
    };
    assert!(errors.contains(FieldKey::OrganizationName));
    assert!(!errors.contains(FieldKey::FullName));

    wizard.update_field(FieldKey::ClientType, "individual").unwrap();
    assert_eq!(wizard.next(), Transition::ReadyToSubmit);
}
