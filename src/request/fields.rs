//! Field keys and pure field updates

use thiserror::Error;

use super::attachment::AttachmentError;
use super::step::Step;
use super::types::{Choice, ClientType, PreferredCommunication, Priority, ProjectStage, RequestDraft};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("'{value}' is not a valid option for {field}")]
    InvalidChoice { field: FieldKey, value: String },

    #[error("{0} cannot be set directly")]
    NotScalar(FieldKey),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("the request can no longer be edited")]
    Locked,

    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}

/// Every field of a request, named as in the stored draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    ProjectStage,
    SoftwareCategories,
    Priority,
    Summary,
    Attachments,
    ClientType,
    FullName,
    PhoneNumber,
    EmailId,
    Address,
    State,
    Pincode,
    PreferredCommunication,
    OrganizationName,
    ContactPerson,
    ContactNumber,
    OrgEmailId,
    OrganizationAddress,
    OrgState,
    OrgPincode,
    OrgPreferredCommunication,
}

/// Text fields of the individual sub-record, in form order
pub const INDIVIDUAL_TEXT_FIELDS: &[FieldKey] = &[
    FieldKey::FullName,
    FieldKey::PhoneNumber,
    FieldKey::EmailId,
    FieldKey::Address,
    FieldKey::State,
    FieldKey::Pincode,
];

/// Text fields of the organisation sub-record, in form order
pub const ORGANISATION_TEXT_FIELDS: &[FieldKey] = &[
    FieldKey::OrganizationName,
    FieldKey::ContactPerson,
    FieldKey::ContactNumber,
    FieldKey::OrgEmailId,
    FieldKey::OrganizationAddress,
    FieldKey::OrgState,
    FieldKey::OrgPincode,
];

impl FieldKey {
    pub fn all() -> &'static [FieldKey] {
        &[
            FieldKey::ProjectStage,
            FieldKey::SoftwareCategories,
            FieldKey::Priority,
            FieldKey::Summary,
            FieldKey::Attachments,
            FieldKey::ClientType,
            FieldKey::FullName,
            FieldKey::PhoneNumber,
            FieldKey::EmailId,
            FieldKey::Address,
            FieldKey::State,
            FieldKey::Pincode,
            FieldKey::PreferredCommunication,
            FieldKey::OrganizationName,
            FieldKey::ContactPerson,
            FieldKey::ContactNumber,
            FieldKey::OrgEmailId,
            FieldKey::OrganizationAddress,
            FieldKey::OrgState,
            FieldKey::OrgPincode,
            FieldKey::OrgPreferredCommunication,
        ]
    }

    /// Stored field name
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::ProjectStage => "projectStage",
            FieldKey::SoftwareCategories => "softwareCategories",
            FieldKey::Priority => "priority",
            FieldKey::Summary => "summary",
            FieldKey::Attachments => "attachments",
            FieldKey::ClientType => "clientType",
            FieldKey::FullName => "fullName",
            FieldKey::PhoneNumber => "phoneNumber",
            FieldKey::EmailId => "emailId",
            FieldKey::Address => "address",
            FieldKey::State => "state",
            FieldKey::Pincode => "pincode",
            FieldKey::PreferredCommunication => "preferredCommunication",
            FieldKey::OrganizationName => "organizationName",
            FieldKey::ContactPerson => "contactPerson",
            FieldKey::ContactNumber => "contactNumber",
            FieldKey::OrgEmailId => "orgEmailId",
            FieldKey::OrganizationAddress => "organizationAddress",
            FieldKey::OrgState => "orgState",
            FieldKey::OrgPincode => "orgPincode",
            FieldKey::OrgPreferredCommunication => "orgPreferredCommunication",
        }
    }

    pub fn from_name(name: &str) -> Result<FieldKey, FieldError> {
        FieldKey::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldKey::ProjectStage => "Project stage",
            FieldKey::SoftwareCategories => "Software categories",
            FieldKey::Priority => "Priority",
            FieldKey::Summary => "Summary",
            FieldKey::Attachments => "Attachments",
            FieldKey::ClientType => "Client type",
            FieldKey::FullName => "Full name",
            FieldKey::PhoneNumber => "Phone number",
            FieldKey::EmailId => "Email",
            FieldKey::Address => "Address",
            FieldKey::State => "State",
            FieldKey::Pincode => "Pincode",
            FieldKey::PreferredCommunication => "Preferred communication",
            FieldKey::OrganizationName => "Organization name",
            FieldKey::ContactPerson => "Contact person",
            FieldKey::ContactNumber => "Contact number",
            FieldKey::OrgEmailId => "Organization email",
            FieldKey::OrganizationAddress => "Organization address",
            FieldKey::OrgState => "State",
            FieldKey::OrgPincode => "Pincode",
            FieldKey::OrgPreferredCommunication => "Preferred communication",
        }
    }

    /// The step on which the field is collected
    pub fn step(self) -> Step {
        match self {
            FieldKey::ProjectStage | FieldKey::SoftwareCategories => Step::ProjectInfo,
            FieldKey::Priority | FieldKey::Summary | FieldKey::Attachments => Step::Details,
            _ => Step::ClientInfo,
        }
    }

    /// Options for choice fields, as (stored name, label) pairs
    pub fn options(self) -> Option<Vec<(&'static str, &'static str)>> {
        fn pairs<T: Choice>() -> Vec<(&'static str, &'static str)> {
            T::all().iter().map(|c| (c.wire_name(), c.label())).collect()
        }

        match self {
            FieldKey::ProjectStage => Some(pairs::<ProjectStage>()),
            FieldKey::Priority => Some(pairs::<Priority>()),
            FieldKey::ClientType => Some(pairs::<ClientType>()),
            FieldKey::PreferredCommunication | FieldKey::OrgPreferredCommunication => {
                Some(pairs::<PreferredCommunication>())
            }
            _ => None,
        }
    }

    /// Current value of a scalar field as its stored string ("" when unset)
    pub fn read(self, draft: &RequestDraft) -> Option<String> {
        fn choice<T: Choice>(value: Option<T>) -> String {
            value.map(|c| c.wire_name().to_string()).unwrap_or_default()
        }

        let ind = &draft.individual;
        let org = &draft.organisation;
        let value = match self {
            FieldKey::ProjectStage => choice(draft.project_stage),
            FieldKey::Priority => choice(draft.priority),
            FieldKey::ClientType => choice(draft.client_type),
            FieldKey::PreferredCommunication => choice(ind.preferred_communication),
            FieldKey::OrgPreferredCommunication => choice(org.org_preferred_communication),
            FieldKey::SoftwareCategories | FieldKey::Attachments => return None,
            _ => self.text_slot(draft)?.clone(),
        };
        Some(value)
    }

    fn text_slot(self, draft: &RequestDraft) -> Option<&String> {
        let ind = &draft.individual;
        let org = &draft.organisation;
        Some(match self {
            FieldKey::Summary => &draft.summary,
            FieldKey::FullName => &ind.full_name,
            FieldKey::PhoneNumber => &ind.phone_number,
            FieldKey::EmailId => &ind.email_id,
            FieldKey::Address => &ind.address,
            FieldKey::State => &ind.state,
            FieldKey::Pincode => &ind.pincode,
            FieldKey::OrganizationName => &org.organization_name,
            FieldKey::ContactPerson => &org.contact_person,
            FieldKey::ContactNumber => &org.contact_number,
            FieldKey::OrgEmailId => &org.org_email_id,
            FieldKey::OrganizationAddress => &org.organization_address,
            FieldKey::OrgState => &org.org_state,
            FieldKey::OrgPincode => &org.org_pincode,
            _ => return None,
        })
    }

    fn text_slot_mut(self, draft: &mut RequestDraft) -> Option<&mut String> {
        let ind = &mut draft.individual;
        let org = &mut draft.organisation;
        Some(match self {
            FieldKey::Summary => &mut draft.summary,
            FieldKey::FullName => &mut ind.full_name,
            FieldKey::PhoneNumber => &mut ind.phone_number,
            FieldKey::EmailId => &mut ind.email_id,
            FieldKey::Address => &mut ind.address,
            FieldKey::State => &mut ind.state,
            FieldKey::Pincode => &mut ind.pincode,
            FieldKey::OrganizationName => &mut org.organization_name,
            FieldKey::ContactPerson => &mut org.contact_person,
            FieldKey::ContactNumber => &mut org.contact_number,
            FieldKey::OrgEmailId => &mut org.org_email_id,
            FieldKey::OrganizationAddress => &mut org.organization_address,
            FieldKey::OrgState => &mut org.org_state,
            FieldKey::OrgPincode => &mut org.org_pincode,
            _ => return None,
        })
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_choice<T: Choice>(field: FieldKey, value: &str) -> Result<Option<T>, FieldError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    T::parse(value).map(Some).ok_or_else(|| FieldError::InvalidChoice {
        field,
        value: value.to_string(),
    })
}

/// Set one scalar field from its string form.
///
/// Choice fields take their stored name (`"new"`, `"videoMeeting"`);
/// an empty string resets them to unset. Text is stored as typed.
pub fn set_field(draft: &mut RequestDraft, key: FieldKey, value: &str) -> Result<(), FieldError> {
    match key {
        FieldKey::ProjectStage => draft.project_stage = parse_choice(key, value)?,
        FieldKey::Priority => draft.priority = parse_choice(key, value)?,
        FieldKey::ClientType => draft.client_type = parse_choice(key, value)?,
        FieldKey::PreferredCommunication => {
            draft.individual.preferred_communication = parse_choice(key, value)?;
        }
        FieldKey::OrgPreferredCommunication => {
            draft.organisation.org_preferred_communication = parse_choice(key, value)?;
        }
        FieldKey::SoftwareCategories | FieldKey::Attachments => {
            return Err(FieldError::NotScalar(key));
        }
        _ => {
            let slot = key.text_slot_mut(draft).ok_or(FieldError::NotScalar(key))?;
            *slot = value.to_string();
        }
    }
    Ok(())
}

/// Consuming form of [`set_field`] that returns the updated draft
pub fn update_field(
    mut draft: RequestDraft,
    key: FieldKey,
    value: &str,
) -> Result<RequestDraft, FieldError> {
    set_field(&mut draft, key, value)?;
    Ok(draft)
}
