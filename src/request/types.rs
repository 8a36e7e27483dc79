//! Type definitions for a service request draft

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use super::attachment::Attachment;

/// Software categories offered on the first step of the request form
pub const SOFTWARE_CATEGORIES: &[&str] = &[
    "Website",
    "Mobile App",
    "Web Application",
    "E-Commerce",
    "CRM / ERP",
    "Custom Software",
    "UI/UX Design",
    "Consulting",
];

/// A fixed set of options with a stable stored name
pub trait Choice: Copy + Sized + 'static {
    fn all() -> &'static [Self];

    /// Name used in stored drafts and on the command line
    fn wire_name(self) -> &'static str;

    /// Name shown to users
    fn label(self) -> &'static str;

    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.wire_name().eq_ignore_ascii_case(raw))
    }
}

/// Reads an optional choice, treating `null` and `""` as unset.
///
/// Older drafts stored unset selections as empty strings.
fn optional_choice<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Choice,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => T::parse(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown option `{value}`"))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectStage {
    New,
    Existing,
}

impl Choice for ProjectStage {
    fn all() -> &'static [Self] {
        &[ProjectStage::New, ProjectStage::Existing]
    }

    fn wire_name(self) -> &'static str {
        match self {
            ProjectStage::New => "new",
            ProjectStage::Existing => "existing",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ProjectStage::New => "New project",
            ProjectStage::Existing => "Existing project",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Choice for Priority {
    fn all() -> &'static [Self] {
        &[Priority::Low, Priority::Medium, Priority::High]
    }

    fn wire_name(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientType {
    Individual,
    Organisation,
}

impl Choice for ClientType {
    fn all() -> &'static [Self] {
        &[ClientType::Individual, ClientType::Organisation]
    }

    fn wire_name(self) -> &'static str {
        match self {
            ClientType::Individual => "individual",
            ClientType::Organisation => "organisation",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ClientType::Individual => "Individual",
            ClientType::Organisation => "Organisation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PreferredCommunication {
    Call,
    VideoMeeting,
    InPerson,
}

impl Choice for PreferredCommunication {
    fn all() -> &'static [Self] {
        &[
            PreferredCommunication::Call,
            PreferredCommunication::VideoMeeting,
            PreferredCommunication::InPerson,
        ]
    }

    fn wire_name(self) -> &'static str {
        match self {
            PreferredCommunication::Call => "call",
            PreferredCommunication::VideoMeeting => "videoMeeting",
            PreferredCommunication::InPerson => "inPerson",
        }
    }

    fn label(self) -> &'static str {
        match self {
            PreferredCommunication::Call => "Phone call",
            PreferredCommunication::VideoMeeting => "Video meeting",
            PreferredCommunication::InPerson => "In person",
        }
    }
}

/// Contact details when the client is a private person
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndividualDetails {
    pub full_name: String,
    pub phone_number: String,
    pub email_id: String,
    pub address: String,
    pub state: String,
    pub pincode: String,
    #[serde(deserialize_with = "optional_choice")]
    pub preferred_communication: Option<PreferredCommunication>,
}

/// Contact details when the client is a company or institution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganisationDetails {
    pub organization_name: String,
    pub contact_person: String,
    pub contact_number: String,
    pub org_email_id: String,
    pub organization_address: String,
    pub org_state: String,
    pub org_pincode: String,
    #[serde(deserialize_with = "optional_choice")]
    pub org_preferred_communication: Option<PreferredCommunication>,
}

/// Borrowed view of the sub-record selected by `client_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientDetails<'a> {
    Individual(&'a IndividualDetails),
    Organisation(&'a OrganisationDetails),
}

/// The in-progress service request, persisted after every change.
///
/// Both client sub-records are kept even though only the one selected by
/// `client_type` is validated; switching type does not discard the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestDraft {
    #[serde(deserialize_with = "optional_choice")]
    pub project_stage: Option<ProjectStage>,
    pub software_categories: BTreeSet<String>,
    #[serde(deserialize_with = "optional_choice")]
    pub priority: Option<Priority>,
    pub summary: String,
    pub attachments: Vec<Attachment>,
    #[serde(deserialize_with = "optional_choice")]
    pub client_type: Option<ClientType>,
    pub individual: IndividualDetails,
    pub organisation: OrganisationDetails,
}

impl RequestDraft {
    /// The active client sub-record, if a client type is chosen
    pub fn client(&self) -> Option<ClientDetails<'_>> {
        self.client_type.map(|client_type| match client_type {
            ClientType::Individual => ClientDetails::Individual(&self.individual),
            ClientType::Organisation => ClientDetails::Organisation(&self.organisation),
        })
    }

    /// Add the category if absent, remove it if present
    pub fn toggle_category(mut self, category: &str) -> Self {
        self.toggle_category_in_place(category);
        self
    }

    /// In-place form of [`RequestDraft::toggle_category`]; returns whether the category is now selected.
    /// A blank label is ignored.
    pub fn toggle_category_in_place(&mut self, category: &str) -> bool {
        let category = category.trim();
        if category.is_empty() {
            return false;
        }
        if self.software_categories.remove(category) {
            false
        } else {
            self.software_categories.insert(category.to_string());
            true
        }
    }

    /// Whether nothing has been filled in yet
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Contact email of the active client, for receipts
    pub fn contact_email(&self) -> Option<&str> {
        match self.client()? {
            ClientDetails::Individual(d) => Some(d.email_id.as_str()),
            ClientDetails::Organisation(d) => Some(d.org_email_id.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_parse_is_case_insensitive() {
        assert_eq!(ProjectStage::parse("NEW"), Some(ProjectStage::New));
        assert_eq!(
            PreferredCommunication::parse("videomeeting"),
            Some(PreferredCommunication::VideoMeeting)
        );
        assert_eq!(Priority::parse("urgent"), None);
    }

    #[test]
    fn test_wire_names_match_serde() {
        for stage in ProjectStage::all() {
            let json = serde_json::to_string(stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.wire_name()));
        }
        for comm in PreferredCommunication::all() {
            let json = serde_json::to_string(comm).unwrap();
            assert_eq!(json, format!("\"{}\"", comm.wire_name()));
        }
        for client in ClientType::all() {
            let json = serde_json::to_string(client).unwrap();
            assert_eq!(json, format!("\"{}\"", client.wire_name()));
        }
    }

    #[test]
    fn test_draft_serializes_camel_case() {
        let mut draft = RequestDraft {
            project_stage: Some(ProjectStage::Existing),
            ..RequestDraft::default()
        };
        draft.organisation.org_email_id = "ops@acme.io".to_string();

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["projectStage"], "existing");
        assert_eq!(json["organisation"]["orgEmailId"], "ops@acme.io");
        assert!(json["priority"].is_null());
    }

    #[test]
    fn test_draft_reads_empty_strings_as_unset() {
        let json = r#"{"projectStage":"","priority":"high","clientType":"",
            "individual":{"preferredCommunication":""}}"#;
        let draft: RequestDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.project_stage, None);
        assert_eq!(draft.priority, Some(Priority::High));
        assert_eq!(draft.client_type, None);
        assert_eq!(draft.individual.preferred_communication, None);
    }

    #[test]
    fn test_draft_missing_keys_default() {
        let draft: RequestDraft = serde_json::from_str(r#"{"summary":"hi"}"#).unwrap();
        assert_eq!(draft.summary, "hi");
        assert!(draft.software_categories.is_empty());
        assert!(draft.attachments.is_empty());
    }

    #[test]
    fn test_draft_rejects_unknown_choice() {
        let result: Result<RequestDraft, _> = serde_json::from_str(r#"{"priority":"urgent"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_toggle_category_roundtrip() {
        let original = RequestDraft::default().toggle_category("Mobile App");
        let toggled = original
            .clone()
            .toggle_category("Website")
            .toggle_category("Website");
        assert_eq!(toggled.software_categories, original.software_categories);
    }

    #[test]
    fn test_client_view_follows_client_type() {
        let mut draft = RequestDraft::default();
        assert!(draft.client().is_none());

        draft.individual.full_name = "Asha".to_string();
        draft.organisation.organization_name = "Acme".to_string();

        draft.client_type = Some(ClientType::Organisation);
        match draft.client() {
            Some(ClientDetails::Organisation(org)) => assert_eq!(org.organization_name, "Acme"),
            other => panic!("unexpected client view: {other:?}"),
        }

        // Switching back keeps the individual details intact
        draft.client_type = Some(ClientType::Individual);
        match draft.client() {
            Some(ClientDetails::Individual(person)) => assert_eq!(person.full_name, "Asha"),
            other => panic!("unexpected client view: {other:?}"),
        }
    }

    #[test]
    fn test_is_empty() {
        assert!(RequestDraft::default().is_empty());
        assert!(!RequestDraft::default().toggle_category("Website").is_empty());
    }
}
