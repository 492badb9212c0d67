//! Review summary shown on the confirmation step.

use serde::Serialize;

use super::model::{ApplicationData, FileRef};

/// Upload state of a document slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "count", rename_all = "snake_case")]
pub enum DocumentStatus {
    /// The single-file slot holds a file.
    Uploaded,
    /// The single-file slot is empty.
    Missing,
    /// A multi-file slot holds this many files.
    Files(usize),
    /// A multi-file slot is empty.
    Empty,
}

impl DocumentStatus {
    fn single(file: Option<&FileRef>) -> Self {
        if file.is_some() {
            Self::Uploaded
        } else {
            Self::Missing
        }
    }

    fn multiple(files: &[FileRef]) -> Self {
        if files.is_empty() {
            Self::Empty
        } else {
            Self::Files(files.len())
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uploaded => write!(f, "Uploaded"),
            Self::Missing => write!(f, "Not uploaded"),
            Self::Files(n) => write!(f, "{n} file(s) uploaded"),
            Self::Empty => write!(f, "No files uploaded"),
        }
    }
}

/// Read-only digest of an application for review before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationSummary {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub high_school: String,
    pub high_school_grade: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_institute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_gpa: Option<String>,
    pub id_proof: DocumentStatus,
    pub transcripts: DocumentStatus,
    pub recommendations: DocumentStatus,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

impl ApplicationSummary {
    pub fn from_data(data: &ApplicationData) -> Self {
        let basic = &data.basic_details;
        let academic = &data.academic_details;
        let docs = &data.documents;

        let full_name = format!("{} {}", basic.first_name.trim(), basic.last_name.trim())
            .trim()
            .to_string();

        Self {
            full_name,
            email: basic.email.clone(),
            phone: basic.phone.clone(),
            date_of_birth: basic.date_of_birth.clone(),
            address: non_empty(Some(&basic.address)),
            high_school: academic.high_school_name.clone(),
            high_school_grade: academic.high_school_grade.clone(),
            previous_degree: non_empty(academic.previous_degree.as_deref()),
            previous_institute: non_empty(academic.previous_institute.as_deref()),
            previous_gpa: non_empty(academic.gpa.as_deref()),
            id_proof: DocumentStatus::single(docs.id_proof.as_ref()),
            transcripts: DocumentStatus::multiple(&docs.transcripts),
            recommendations: DocumentStatus::multiple(&docs.recommendations),
        }
    }

    /// Render the summary as markdown.
    pub fn to_markdown(&self) -> String {
        let mut parts = vec!["# Application Summary".to_string(), String::new()];

        parts.push("## Personal Information".to_string());
        parts.push(format!("- **Full Name:** {}", self.full_name));
        parts.push(format!("- **Email:** {}", self.email));
        parts.push(format!("- **Phone:** {}", self.phone));
        parts.push(format!("- **Date of Birth:** {}", self.date_of_birth));
        if let Some(ref address) = self.address {
            parts.push(format!("- **Address:** {}", address));
        }

        parts.push(String::new());
        parts.push("## Academic Information".to_string());
        parts.push(format!("- **High School:** {}", self.high_school));
        parts.push(format!("- **High School Grade:** {}", self.high_school_grade));
        if let Some(ref degree) = self.previous_degree {
            parts.push(format!("- **Previous Degree:** {}", degree));
        }
        if let Some(ref institute) = self.previous_institute {
            parts.push(format!("- **Previous Institution:** {}", institute));
        }
        if let Some(ref gpa) = self.previous_gpa {
            parts.push(format!("- **Previous GPA:** {}", gpa));
        }

        parts.push(String::new());
        parts.push("## Documents".to_string());
        parts.push(format!("- **ID Proof:** {}", self.id_proof));
        parts.push(format!("- **Transcripts:** {}", self.transcripts));
        parts.push(format!("- **Recommendations:** {}", self.recommendations));

        parts.join("\n")
    }
}
