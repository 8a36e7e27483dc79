//! Service request model: draft shape, field updates and step validation

pub mod attachment;
pub mod fields;
pub mod step;
pub mod types;
pub mod validate;

pub use attachment::{Attachment, AttachmentError, AttachmentKind};
pub use fields::{set_field, update_field, FieldError, FieldKey};
pub use step::Step;
pub use types::*;
pub use validate::{validate_step, ErrorMap, Validator};

/// Consuming category toggle, mirroring [`update_field`]
pub fn toggle_category(draft: RequestDraft, category: &str) -> RequestDraft {
    draft.toggle_category(category)
}
