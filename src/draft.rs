//! Persistence of the in-progress request and its current step

use std::sync::Arc;

use tracing::{debug, warn};

use crate::request::RequestDraft;
use crate::storage::KeyValueStore;

/// Storage key of the JSON-encoded draft
pub const DRAFT_KEY: &str = "idea2code_request_draft";
/// Storage key of the current step number
pub const STEP_KEY: &str = "idea2code_request_step";

/// Draft persistence on top of local storage.
///
/// Reads never fail: absent or corrupt entries yield defaults. Write
/// failures are logged and swallowed so they never interrupt form entry.
#[derive(Clone)]
pub struct DraftStore {
    store: Arc<dyn KeyValueStore>,
}

impl DraftStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The saved draft, or an empty one
    pub fn load(&self) -> RequestDraft {
        let Some(raw) = self.store.get(DRAFT_KEY) else {
            return RequestDraft::default();
        };

        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(error = %err, "Saved request draft is malformed, starting over");
            RequestDraft::default()
        })
    }

    pub fn has_draft(&self) -> bool {
        self.store.get(DRAFT_KEY).is_some()
    }

    /// Overwrite the saved draft
    pub fn save(&self, draft: &RequestDraft) {
        let encoded = match serde_json::to_string(draft) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error = %err, "Failed to encode request draft");
                return;
            }
        };
        if let Err(err) = self.store.set(DRAFT_KEY, &encoded) {
            warn!(error = %err, "Failed to save request draft");
        }
    }

    pub fn clear(&self) {
        if let Err(err) = self.store.remove(DRAFT_KEY) {
            warn!(error = %err, "Failed to clear request draft");
        }
    }

    /// The saved step number, unvalidated
    pub fn load_step(&self) -> Option<i64> {
        let raw = self.store.get(STEP_KEY)?;
        match raw.trim().parse() {
            Ok(step) => Some(step),
            Err(_) => {
                warn!(value = %raw, "Ignoring malformed saved step");
                None
            }
        }
    }

    pub fn save_step(&self, step: u8) {
        debug!(step, "Saving request step");
        if let Err(err) = self.store.set(STEP_KEY, &step.to_string()) {
            warn!(error = %err, "Failed to save request step");
        }
    }

    pub fn clear_step(&self) {
        if let Err(err) = self.store.remove(STEP_KEY) {
            warn!(error = %err, "Failed to clear request step");
        }
    }
}
