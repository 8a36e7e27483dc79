//! Per-step validation of a request draft

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::fields::{FieldKey, INDIVIDUAL_TEXT_FIELDS, ORGANISATION_TEXT_FIELDS};
use super::step::Step;
use super::types::{ClientDetails, RequestDraft};
use crate::config::ValidationConfig;

/// Email pattern of the single-page request form
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("valid email regex")
});

/// Field name to human-readable message; empty when the step is valid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap(BTreeMap<FieldKey, String>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: FieldKey, message: impl Into<String>) {
        self.0.insert(key, message.into());
    }

    pub fn remove(&mut self, key: FieldKey) -> Option<String> {
        self.0.remove(&key)
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn required_message(key: FieldKey) -> String {
    format!("{} is required", key.label())
}

/// Presence checks for one step. No format checks are applied.
pub fn validate_step(draft: &RequestDraft, step: Step) -> ErrorMap {
    let mut errors = ErrorMap::new();

    match step {
        Step::ProjectInfo => {
            if draft.project_stage.is_none() {
                errors.insert(FieldKey::ProjectStage, "Please select a project stage");
            }
            if draft.software_categories.is_empty() {
                errors.insert(
                    FieldKey::SoftwareCategories,
                    "Select at least one software category",
                );
            }
        }
        Step::Details => {
            if draft.priority.is_none() {
                errors.insert(FieldKey::Priority, "Select priority");
            }
            if is_blank(&draft.summary) {
                errors.insert(FieldKey::Summary, required_message(FieldKey::Summary));
            }
        }
        Step::ClientInfo => match draft.client() {
            None => errors.insert(FieldKey::ClientType, "Please select a client type"),
            Some(client) => {
                let (text_fields, comm_key, comm_set) = match client {
                    ClientDetails::Individual(d) => (
                        INDIVIDUAL_TEXT_FIELDS,
                        FieldKey::PreferredCommunication,
                        d.preferred_communication.is_some(),
                    ),
                    ClientDetails::Organisation(d) => (
                        ORGANISATION_TEXT_FIELDS,
                        FieldKey::OrgPreferredCommunication,
                        d.org_preferred_communication.is_some(),
                    ),
                };

                for key in text_fields {
                    if key.read(draft).as_deref().map_or(true, is_blank) {
                        errors.insert(*key, required_message(*key));
                    }
                }
                if !comm_set {
                    errors.insert(comm_key, "Select a preferred mode of communication");
                }
            }
        },
    }

    errors
}

/// Step validation with the configured format checks on top of presence checks
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    email_format: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self { email_format: true }
    }
}

impl Validator {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            email_format: config.email_format,
        }
    }

    /// Validator equivalent to [`validate_step`]
    pub fn presence_only() -> Self {
        Self {
            email_format: false,
        }
    }

    pub fn validate_step(&self, draft: &RequestDraft, step: Step) -> ErrorMap {
        let mut errors = validate_step(draft, step);

        if self.email_format && step == Step::ClientInfo {
            let email = match draft.client() {
                Some(ClientDetails::Individual(d)) => Some((FieldKey::EmailId, &d.email_id)),
                Some(ClientDetails::Organisation(d)) => {
                    Some((FieldKey::OrgEmailId, &d.org_email_id))
                }
                None => None,
            };
            if let Some((key, value)) = email {
                if !errors.contains(key) && !is_valid_email(value) {
                    errors.insert(key, "Invalid email address");
                }
            }
        }

        errors
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value.trim())
}
