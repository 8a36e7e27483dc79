//! Steps of the request form

/// Ordered steps of the request form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    /// Project stage and software categories
    ProjectInfo,
    /// Priority, summary and attachments
    Details,
    /// Client type and contact details
    ClientInfo,
}

impl Step {
    pub const FIRST: Step = Step::ProjectInfo;
    pub const LAST: Step = Step::ClientInfo;
    pub const COUNT: u8 = 3;

    pub fn all() -> &'static [Step] {
        &[Step::ProjectInfo, Step::Details, Step::ClientInfo]
    }

    /// 1-based step number, as persisted
    pub fn number(self) -> u8 {
        match self {
            Step::ProjectInfo => 1,
            Step::Details => 2,
            Step::ClientInfo => 3,
        }
    }

    /// Exact lookup by step number
    pub fn from_number(n: u8) -> Option<Step> {
        match n {
            1 => Some(Step::ProjectInfo),
            2 => Some(Step::Details),
            3 => Some(Step::ClientInfo),
            _ => None,
        }
    }

    /// Lookup that clamps out-of-range numbers into 1..=3
    pub fn clamped(n: i64) -> Step {
        match n {
            i64::MIN..=1 => Step::ProjectInfo,
            2 => Step::Details,
            _ => Step::ClientInfo,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::ProjectInfo => "Project Info",
            Step::Details => "Details",
            Step::ClientInfo => "Client Info",
        }
    }

    pub fn next(self) -> Option<Step> {
        Step::from_number(self.number() + 1)
    }

    pub fn prev(self) -> Option<Step> {
        Step::from_number(self.number().saturating_sub(1))
    }

    pub fn is_last(self) -> bool {
        self == Step::LAST
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.number(), self.title())
    }
}
