//! Application data model, partial-update patches, and the draft record.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::state::{
    ACADEMIC_DETAILS_FIELDS, BASIC_DETAILS_FIELDS, DOCUMENT_FIELDS, FormStep,
};
use crate::error::Error;

/// Names of fields the applicant has interacted with.
pub type FieldSet = BTreeSet<String>;

/// The editable sections of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    BasicDetails,
    AcademicDetails,
    Documents,
}

impl Section {
    /// Field names that belong to this section.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::BasicDetails => BASIC_DETAILS_FIELDS,
            Self::AcademicDetails => ACADEMIC_DETAILS_FIELDS,
            Self::Documents => DOCUMENT_FIELDS,
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BasicDetails => write!(f, "basicDetails"),
            Self::AcademicDetails => write!(f, "academicDetails"),
            Self::Documents => write!(f, "documents"),
        }
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basicDetails" | "basic" => Ok(Self::BasicDetails),
            "academicDetails" | "academic" => Ok(Self::AcademicDetails),
            "documents" => Ok(Self::Documents),
            other => Err(format!("unknown section: {other}")),
        }
    }
}

/// Personal identity fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BasicDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub address: String,
}

/// Academic history fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AcademicDetails {
    pub high_school_name: String,
    /// Free-text grade or GPA; never parsed numerically.
    pub high_school_grade: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_institute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
}

/// Opaque handle to an uploaded file. Content is never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

impl FileRef {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Uploaded document slots. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documents {
    pub id_proof: Option<FileRef>,
    pub transcripts: Vec<FileRef>,
    pub recommendations: Vec<FileRef>,
}

impl Documents {
    pub fn is_empty(&self) -> bool {
        self.id_proof.is_none() && self.transcripts.is_empty() && self.recommendations.is_empty()
    }
}

/// The in-progress application, owned by a single
/// [`FormSession`](super::FormSession).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationData {
    pub basic_details: BasicDetails,
    pub academic_details: AcademicDetails,
    pub documents: Documents,
    pub current_step: FormStep,
    pub is_complete: bool,
    /// Fields whose validation result may be shown. Session-local.
    pub validated_fields: FieldSet,
}

impl ApplicationData {
    /// Rebuild session state from a stored draft. Documents and the
    /// validated set always start empty.
    pub fn from_draft(draft: Draft) -> Self {
        Self {
            basic_details: draft.basic_details,
            academic_details: draft.academic_details,
            documents: Documents::default(),
            current_step: draft.current_step,
            is_complete: draft.is_complete,
            validated_fields: FieldSet::new(),
        }
    }

    /// The persistable part of this application.
    pub fn to_draft(&self) -> Draft {
        Draft {
            basic_details: self.basic_details.clone(),
            academic_details: self.academic_details.clone(),
            documents: DraftDocuments::default(),
            current_step: self.current_step,
            is_complete: self.is_complete,
        }
    }

    /// Apply a partial update to one section.
    pub fn apply(&mut self, patch: SectionPatch) {
        match patch {
            SectionPatch::Basic(p) => p.apply_to(&mut self.basic_details),
            SectionPatch::Academic(p) => p.apply_to(&mut self.academic_details),
            SectionPatch::Documents(p) => p.apply_to(&mut self.documents),
        }
    }
}

/// Durable draft record.
///
/// Mirrors [`ApplicationData`] with `documents` fixed to an empty
/// placeholder and without the validated field set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub basic_details: BasicDetails,
    pub academic_details: AcademicDetails,
    /// Always written empty; ignored on restore.
    #[serde(default)]
    pub documents: DraftDocuments,
    pub current_step: FormStep,
    pub is_complete: bool,
}

/// Placeholder for document slots: `{ idProof: null, transcripts: [], recommendations: [] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DraftDocuments {
    pub id_proof: Option<serde_json::Value>,
    pub transcripts: Vec<serde_json::Value>,
    pub recommendations: Vec<serde_json::Value>,
}

// ── Patches ─────────────────────────────────────────────────────────

/// Partial update to [`BasicDetails`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BasicDetailsPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
}

impl BasicDetailsPatch {
    fn apply_to(self, target: &mut BasicDetails) {
        merge(&mut target.first_name, self.first_name);
        merge(&mut target.last_name, self.last_name);
        merge(&mut target.email, self.email);
        merge(&mut target.phone, self.phone);
        merge(&mut target.date_of_birth, self.date_of_birth);
        merge(&mut target.address, self.address);
    }
}

/// Partial update to [`AcademicDetails`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AcademicDetailsPatch {
    pub high_school_name: Option<String>,
    pub high_school_grade: Option<String>,
    pub previous_degree: Option<String>,
    pub previous_institute: Option<String>,
    pub gpa: Option<String>,
}

impl AcademicDetailsPatch {
    fn apply_to(self, target: &mut AcademicDetails) {
        merge(&mut target.high_school_name, self.high_school_name);
        merge(&mut target.high_school_grade, self.high_school_grade);
        if self.previous_degree.is_some() {
            target.previous_degree = self.previous_degree;
        }
        if self.previous_institute.is_some() {
            target.previous_institute = self.previous_institute;
        }
        if self.gpa.is_some() {
            target.gpa = self.gpa;
        }
    }
}

/// Partial update to [`Documents`]. A multi-file slot is replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DocumentsPatch {
    pub id_proof: Option<FileRef>,
    pub transcripts: Option<Vec<FileRef>>,
    pub recommendations: Option<Vec<FileRef>>,
}

impl DocumentsPatch {
    fn apply_to(self, target: &mut Documents) {
        if self.id_proof.is_some() {
            target.id_proof = self.id_proof;
        }
        merge(&mut target.transcripts, self.transcripts);
        merge(&mut target.recommendations, self.recommendations);
    }
}

/// A partial update addressed to one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionPatch {
    Basic(BasicDetailsPatch),
    Academic(AcademicDetailsPatch),
    Documents(DocumentsPatch),
}

impl SectionPatch {
    pub fn section(&self) -> Section {
        match self {
            Self::Basic(_) => Section::BasicDetails,
            Self::Academic(_) => Section::AcademicDetails,
            Self::Documents(_) => Section::Documents,
        }
    }

    /// Parse a camelCase partial-field object for `section`, as sent by a UI.
    pub fn from_json(section: Section, value: serde_json::Value) -> Result<Self, Error> {
        let invalid = |e: serde_json::Error| Error::InvalidPatch {
            section: section.to_string(),
            reason: e.to_string(),
        };
        match section {
            Section::BasicDetails => {
                serde_json::from_value(value).map(Self::Basic).map_err(invalid)
            }
            Section::AcademicDetails => {
                serde_json::from_value(value).map(Self::Academic).map_err(invalid)
            }
            Section::Documents => {
                serde_json::from_value(value).map(Self::Documents).map_err(invalid)
            }
        }
    }
}

impl From<BasicDetailsPatch> for SectionPatch {
    fn from(patch: BasicDetailsPatch) -> Self {
        Self::Basic(patch)
    }
}

impl From<AcademicDetailsPatch> for SectionPatch {
    fn from(patch: AcademicDetailsPatch) -> Self {
        Self::Academic(patch)
    }
}

impl From<DocumentsPatch> for SectionPatch {
    fn from(patch: DocumentsPatch) -> Self {
        Self::Documents(patch)
    }
}

fn merge<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}
