//! Application form engine: multi-step data entry with validation gating.
//!
//! The applicant moves through five steps. Each field-editing step has a
//! fixed set of fields and a rule set; moving forward requires the current
//! step to validate cleanly. Progress can be saved as a draft (without any
//! uploaded files) and resumed in a later session.

pub mod model;
pub mod rules;
pub mod session;
pub mod state;
pub mod summary;

pub use model::{
    AcademicDetails, AcademicDetailsPatch, ApplicationData, BasicDetails, BasicDetailsPatch,
    Documents, DocumentsPatch, Draft, FieldSet, FileRef, Section, SectionPatch,
};
pub use rules::FieldErrors;
pub use session::FormSession;
pub use state::{FormStep, StepOutcome};
pub use summary::{ApplicationSummary, DocumentStatus};
