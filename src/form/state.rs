//! Step state machine tracking which stage of the form the applicant is on.

use serde::{Deserialize, Serialize};

use super::model::Section;

/// Field names validated on the basic details step.
pub const BASIC_DETAILS_FIELDS: &[&str] = &[
    "firstName",
    "lastName",
    "email",
    "phone",
    "dateOfBirth",
    "address",
];

/// Field names validated on the academic details step.
pub const ACADEMIC_DETAILS_FIELDS: &[&str] = &[
    "highSchoolName",
    "highSchoolGrade",
    "previousDegree",
    "previousInstitute",
    "gpa",
];

/// Document slot names validated on the documents step.
pub const DOCUMENT_FIELDS: &[&str] = &["idProof", "transcripts", "recommendations"];

/// Step → field membership, indexed by [`FormStep::index`].
static STEP_FIELDS: [&[&str]; 5] = [
    &[],
    BASIC_DETAILS_FIELDS,
    ACADEMIC_DETAILS_FIELDS,
    DOCUMENT_FIELDS,
    &[],
];

/// The stages of the application form.
///
/// Progresses linearly: Welcome → BasicDetails → AcademicDetails →
/// Documents → Confirmation. Serialized as its integer index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum FormStep {
    #[default]
    Welcome,
    BasicDetails,
    AcademicDetails,
    Documents,
    Confirmation,
}

impl FormStep {
    /// All steps in order.
    pub const ALL: [FormStep; 5] = [
        FormStep::Welcome,
        FormStep::BasicDetails,
        FormStep::AcademicDetails,
        FormStep::Documents,
        FormStep::Confirmation,
    ];

    /// Dense index of this step, `0..=4`.
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<FormStep> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Only moves of exactly one step, in either direction, are legal.
    pub fn can_transition_to(self, target: FormStep) -> bool {
        self.index().abs_diff(target.index()) == 1
    }

    /// The step after this one, if any.
    pub fn next(self) -> Option<FormStep> {
        Self::from_index(self.index() + 1)
    }

    /// The step before this one, if any.
    pub fn previous(self) -> Option<FormStep> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn is_last(self) -> bool {
        self == FormStep::Confirmation
    }

    /// Field names that belong to this step.
    pub fn fields(self) -> &'static [&'static str] {
        STEP_FIELDS[usize::from(self.index())]
    }

    /// Whether `field` is one of this step's fields.
    pub fn owns_field(self, field: &str) -> bool {
        self.fields().contains(&field)
    }

    /// The data section edited on this step, if any.
    pub fn section(self) -> Option<Section> {
        match self {
            Self::BasicDetails => Some(Section::BasicDetails),
            Self::AcademicDetails => Some(Section::AcademicDetails),
            Self::Documents => Some(Section::Documents),
            Self::Welcome | Self::Confirmation => None,
        }
    }

    /// Progress bar label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::BasicDetails => "Basic Details",
            Self::AcademicDetails => "Academic Details",
            Self::Documents => "Documents",
            Self::Confirmation => "Review",
        }
    }
}

impl From<FormStep> for u8 {
    fn from(step: FormStep) -> Self {
        step.index()
    }
}

impl TryFrom<u8> for FormStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        FormStep::from_index(value).ok_or_else(|| format!("step index {value} out of range 0..=4"))
    }
}

impl std::fmt::Display for FormStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::BasicDetails => "basic_details",
            Self::AcademicDetails => "academic_details",
            Self::Documents => "documents",
            Self::Confirmation => "confirmation",
        };
        write!(f, "{s}")
    }
}

/// Outcome of a navigation or submission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Validation failed; the step is unchanged.
    Blocked,
    /// Validation passed and the form moved to the given step.
    Advanced(FormStep),
    /// Validation passed on the confirmation step; there is nowhere to move.
    ReadyToSubmit,
    /// The application was marked complete and its draft discarded.
    Submitted,
}

impl StepOutcome {
    /// Whether validation passed.
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use FormStep::*;
        let transitions = [
            (Welcome, BasicDetails),
            (BasicDetails, AcademicDetails),
            (AcademicDetails, Documents),
            (Documents, Confirmation),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should advance to {to}");
            assert!(to.can_transition_to(from), "{to} should retreat to {from}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use FormStep::*;
        // Skip ahead
        assert!(!Welcome.can_transition_to(AcademicDetails));
        assert!(!BasicDetails.can_transition_to(Confirmation));
        // Self-transition
        assert!(!Documents.can_transition_to(Documents));
    }

    #[test]
    fn next_walks_all_steps() {
        let mut current = FormStep::Welcome;
        for expected in &FormStep::ALL[1..] {
            let next = current.next().unwrap();
            assert_eq!(next, *expected);
            current = next;
        }
        assert!(current.next().is_none());
        assert!(FormStep::Welcome.previous().is_none());
        assert_eq!(FormStep::Documents.previous(), Some(FormStep::AcademicDetails));
    }

    #[test]
    fn index_round_trips_through_serde() {
        for step in FormStep::ALL {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(json, step.index().to_string());
            let parsed: FormStep = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, step);
        }
        assert!(serde_json::from_str::<FormStep>("5").is_err());
        assert!(serde_json::from_str::<FormStep>("-1").is_err());
    }

    #[test]
    fn field_table_matches_sections() {
        assert!(FormStep::Welcome.fields().is_empty());
        assert!(FormStep::Confirmation.fields().is_empty());
        assert!(FormStep::BasicDetails.owns_field("email"));
        assert!(!FormStep::BasicDetails.owns_field("idProof"));
        assert!(FormStep::Documents.owns_field("recommendations"));
        for step in FormStep::ALL {
            if let Some(section) = step.section() {
                assert_eq!(section.fields(), step.fields());
            }
        }
    }

    #[test]
    fn labels() {
        assert_eq!(FormStep::AcademicDetails.label(), "Academic Details");
        assert_eq!(FormStep::Confirmation.label(), "Review");
    }

    #[test]
    fn only_blocked_is_failure() {
        assert!(!StepOutcome::Blocked.is_success());
        assert!(StepOutcome::ReadyToSubmit.is_success());
        assert!(StepOutcome::Advanced(FormStep::Documents).is_success());
    }
}
