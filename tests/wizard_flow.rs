//! End-to-end request flows over a file-backed store.
//!
//! Each "session" opens a fresh `FileStore` on the same file, the way the
//! binary does on every start.

use std::path::Path;
use std::sync::Arc;

use idea2code::auth::{AuthGate, AUTH_KEY};
use idea2code::config::SubmissionConfig;
use idea2code::draft::{DraftStore, DRAFT_KEY, STEP_KEY};
use idea2code::navigation::{NavigationHistory, Route};
use idea2code::request::{FieldKey, Step, Validator};
use idea2code::storage::{FileStore, KeyValueStore};
use idea2code::submission::{SimulatedSubmitter, SubmissionCoordinator};
use idea2code::tracking::{RequestHistory, RequestStatus};
use idea2code::wizard::{RequestWizard, SubmitOutcome, Transition, WizardState};

fn session(path: &Path) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::open(path))
}

fn open_wizard(store: &Arc<dyn KeyValueStore>) -> RequestWizard {
    RequestWizard::open(DraftStore::new(store.clone()), Validator::default())
}

fn coordinator(store: &Arc<dyn KeyValueStore>, failures: u32) -> SubmissionCoordinator {
    let config = SubmissionConfig {
        delay_ms: 0,
        max_retries: 1,
        retry_base_delay_ms: 1,
        retry_max_delay_ms: 2,
        simulate_failures: failures,
    };
    let submitter = SimulatedSubmitter::new(RequestHistory::new(store.clone()), &config);
    SubmissionCoordinator::new(Arc::new(submitter), &config)
}

fn complete_form(wizard: &mut RequestWizard) {
    wizard.update_field(FieldKey::ProjectStage, "existing").unwrap();
    wizard.toggle_category("Mobile App").unwrap();
    wizard.toggle_category("UI/UX Design").unwrap();
    assert_eq!(wizard.next(), Transition::Moved(Step::Details));

    wizard.update_field(FieldKey::Priority, "medium").unwrap();
    wizard
        .update_field(FieldKey::Summary, "Redesign our field-service app")
        .unwrap();
    assert_eq!(wizard.next(), Transition::Moved(Step::ClientInfo));

    for (key, value) in [
        (FieldKey::ClientType, "organisation"),
        (FieldKey::OrganizationName, "Acme Services"),
        (FieldKey::ContactPerson, "Priya Shah"),
        (FieldKey::ContactNumber, "9123456780"),
        (FieldKey::OrgEmailId, "ops@acme.io"),
        (FieldKey::OrganizationAddress, "12 Harbour Road"),
        (FieldKey::OrgState, "Maharashtra"),
        (FieldKey::OrgPincode, "400001"),
        (FieldKey::OrgPreferredCommunication, "call"),
    ] {
        wizard.update_field(key, value).unwrap();
    }
}

#[test]
fn test_empty_first_step_is_blocked() {
    let dir = tempfile::tempdir().unwrap();
    let store = session(&dir.path().join("storage.json"));
    let mut wizard = open_wizard(&store);

    let Transition::Blocked(errors) = wizard.next() else {
        panic!("expected an empty draft to be blocked");
    };
    assert!(errors.contains(FieldKey::ProjectStage));
    assert!(errors.contains(FieldKey::SoftwareCategories));
    assert_eq!(errors.len(), 2);
    assert_eq!(wizard.current_step(), Some(Step::ProjectInfo));
}

#[test]
fn test_progress_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    {
        let store = session(&path);
        let mut wizard = open_wizard(&store);
        wizard.update_field(FieldKey::ProjectStage, "new").unwrap();
        wizard.toggle_category("Website").unwrap();
        assert_eq!(wizard.next(), Transition::Moved(Step::Details));
        assert_eq!(store.get(STEP_KEY).as_deref(), Some("2"));
    }

    let store = session(&path);
    let wizard = open_wizard(&store);
    assert_eq!(wizard.current_step(), Some(Step::Details));
    assert!(wizard.draft().software_categories.contains("Website"));
}

#[tokio::test]
async fn test_guest_submission_resumes_after_sign_in() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let draft = {
        let store = session(&path);
        let gate = AuthGate::new(store.clone());
        let mut nav = NavigationHistory::new(Route::Request);
        let mut wizard = open_wizard(&store);
        complete_form(&mut wizard);

        let outcome = wizard
            .submit(&gate, &coordinator(&store, 0), &mut nav)
            .await;
        assert_eq!(outcome, SubmitOutcome::AwaitingLogin);
        assert_eq!(nav.current(), &Route::login_then(Route::Request));
        assert!(RequestHistory::new(store.clone()).list().is_empty());

        // The login screen sets the session flag, then returns to the wizard
        gate.login().unwrap();
        wizard.draft().clone()
    };

    let store = session(&path);
    assert_eq!(store.get(AUTH_KEY).as_deref(), Some("true"));
    assert_eq!(store.get(STEP_KEY).as_deref(), Some("3"));

    let gate = AuthGate::new(store.clone());
    let mut nav = NavigationHistory::new(Route::Request);
    let mut wizard = open_wizard(&store);
    assert_eq!(wizard.current_step(), Some(Step::ClientInfo));
    assert_eq!(wizard.draft(), &draft);

    let outcome = wizard
        .submit(&gate, &coordinator(&store, 0), &mut nav)
        .await;
    assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
    assert_eq!(wizard.state(), WizardState::Done);
}

#[tokio::test]
async fn test_signed_in_submission_clears_draft_and_tracks_request() {
    let dir = tempfile::tempdir().unwrap();
    let store = session(&dir.path().join("storage.json"));
    let gate = AuthGate::new(store.clone());
    gate.login().unwrap();
    let mut nav = NavigationHistory::new(Route::Request);
    let mut wizard = open_wizard(&store);
    complete_form(&mut wizard);

    let outcome = wizard
        .submit(&gate, &coordinator(&store, 0), &mut nav)
        .await;
    let SubmitOutcome::Submitted(receipt) = outcome else {
        panic!("expected submission to succeed, got {outcome:?}");
    };

    assert_eq!(wizard.state(), WizardState::Done);
    assert!(store.get(DRAFT_KEY).is_none());
    assert!(store.get(STEP_KEY).is_none());
    assert_eq!(nav.current(), &Route::Track);

    let tracked = RequestHistory::new(store.clone()).list();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].id, receipt.request_id);
    assert_eq!(tracked[0].title, "Mobile App + UI/UX Design");
    assert_eq!(tracked[0].status, RequestStatus::Pending);

    // A fresh wizard starts over
    let reopened = open_wizard(&store);
    assert_eq!(reopened.current_step(), Some(Step::ProjectInfo));
    assert!(reopened.draft().is_empty());
}

#[tokio::test]
async fn test_exhausted_retries_keep_draft_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let store = session(&path);
    let gate = AuthGate::new(store.clone());
    gate.login().unwrap();
    let mut nav = NavigationHistory::new(Route::Request);
    let mut wizard = open_wizard(&store);
    complete_form(&mut wizard);

    let outcome = wizard
        .submit(&gate, &coordinator(&store, 10), &mut nav)
        .await;
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(wizard.state(), WizardState::Editing(Step::ClientInfo));

    let after_restart = open_wizard(&session(&path));
    assert_eq!(after_restart.current_step(), Some(Step::ClientInfo));
    assert_eq!(after_restart.draft(), wizard.draft());
}
