//! Declarative validation rules for each section.
//!
//! Every validator only evaluates the fields named in the `fields` set it is
//! given, so a field the applicant has not touched never produces an error.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::model::{AcademicDetails, ApplicationData, BasicDetails, Documents, FieldSet, Section};
use super::state::FormStep;
use crate::config::ValidationLimits;

/// Field name → human-readable message. A missing key means no error.
pub type FieldErrors = BTreeMap<String, String>;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

// Leading `+`, then ASCII digits, whitespace, hyphens and parentheses.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s\-()]+$").unwrap());

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Accepts formats like `(123) 456-7890`, `123-456-7890` and `+1 234 567 8900`.
pub fn is_valid_phone(phone: &str, min_len: usize) -> bool {
    let phone = phone.trim();
    if !PHONE_RE.is_match(phone) {
        return false;
    }
    let body = phone.strip_prefix('+').unwrap_or(phone);
    body.chars().count() >= min_len
}

/// Render a byte ceiling the way messages quote it, e.g. `5MB`.
pub fn format_size_limit(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Required string: empty → "`label` is required", over `max` → "`label` is too long".
fn required_text(
    errors: &mut FieldErrors,
    fields: &FieldSet,
    name: &str,
    label: &str,
    value: &str,
    max: usize,
) {
    if !fields.contains(name) {
        return;
    }
    if value.is_empty() {
        errors.insert(name.to_string(), format!("{label} is required"));
    } else if char_len(value) > max {
        errors.insert(name.to_string(), format!("{label} is too long"));
    }
}

pub fn validate_basic_details(
    data: &BasicDetails,
    fields: &FieldSet,
    limits: &ValidationLimits,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let max = limits.name_max_len;
    required_text(&mut errors, fields, "firstName", "First name", &data.first_name, max);
    required_text(&mut errors, fields, "lastName", "Last name", &data.last_name, max);

    if fields.contains("email") {
        if data.email.is_empty() {
            errors.insert("email".into(), "Email is required".into());
        } else if !is_valid_email(&data.email) {
            errors.insert("email".into(), "Invalid email format".into());
        }
    }

    if fields.contains("phone") {
        if data.phone.is_empty() {
            errors.insert("phone".into(), "Phone number is required".into());
        } else if !is_valid_phone(&data.phone, limits.phone_min_len) {
            errors.insert("phone".into(), "Invalid phone number format".into());
        }
    }

    if fields.contains("address")
        && !data.address.is_empty()
        && char_len(&data.address) > limits.address_max_len
    {
        errors.insert("address".into(), "Address is too long".into());
    }

    errors
}

pub fn validate_academic_details(
    data: &AcademicDetails,
    fields: &FieldSet,
    limits: &ValidationLimits,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    required_text(
        &mut errors,
        fields,
        "highSchoolName",
        "High school name",
        &data.high_school_name,
        limits.high_school_name_max_len,
    );

    if fields.contains("highSchoolGrade") {
        if data.high_school_grade.is_empty() {
            errors.insert("highSchoolGrade".into(), "High school grade is required".into());
        } else if char_len(&data.high_school_grade) > limits.grade_max_len {
            errors.insert("highSchoolGrade".into(), "Invalid grade format".into());
        }
    }

    errors
}

pub fn validate_documents(
    data: &Documents,
    fields: &FieldSet,
    limits: &ValidationLimits,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let max = limits.max_file_size;
    let limit = format_size_limit(max);

    if fields.contains("idProof") {
        match &data.id_proof {
            None => {
                errors.insert("idProof".into(), "ID proof is required".into());
            }
            Some(file) if file.size > max => {
                errors.insert(
                    "idProof".into(),
                    format!("ID proof file size should not exceed {limit}"),
                );
            }
            Some(_) => {}
        }
    }

    if fields.contains("transcripts") && data.transcripts.iter().any(|f| f.size > max) {
        errors.insert(
            "transcripts".into(),
            format!("Some transcript files exceed {limit} limit"),
        );
    }

    if fields.contains("recommendations") && data.recommendations.iter().any(|f| f.size > max) {
        errors.insert(
            "recommendations".into(),
            format!("Some recommendation files exceed {limit} limit"),
        );
    }

    errors
}

/// Run one section's rules, restricted to `fields`.
pub fn validate_section(
    data: &ApplicationData,
    section: Section,
    fields: &FieldSet,
    limits: &ValidationLimits,
) -> FieldErrors {
    match section {
        Section::BasicDetails => validate_basic_details(&data.basic_details, fields, limits),
        Section::AcademicDetails => {
            validate_academic_details(&data.academic_details, fields, limits)
        }
        Section::Documents => validate_documents(&data.documents, fields, limits),
    }
}

/// Run every rule belonging to `step`, restricted to `fields`.
///
/// Steps without a section (welcome, confirmation) never produce errors.
pub fn validate_step(
    data: &ApplicationData,
    step: FormStep,
    fields: &FieldSet,
    limits: &ValidationLimits,
) -> FieldErrors {
    match step.section() {
        Some(section) => validate_section(data, section, fields, limits),
        None => FieldErrors::new(),
    }
}

/// Every field of `step`, as a set.
pub fn all_fields(step: FormStep) -> FieldSet {
    step.fields().iter().map(|f| f.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::model::FileRef;

    fn limits() -> ValidationLimits {
        ValidationLimits::default()
    }

    fn only(names: &[&str]) -> FieldSet {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn valid_basic() -> BasicDetails {
        BasicDetails {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@navy.mil".into(),
            phone: "(123) 456-7890".into(),
            date_of_birth: "1906-12-09".into(),
            address: String::new(),
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
    }

    #[test]
    fn phone_shapes() {
        assert!(is_valid_phone("(123) 456-7890", 10));
        assert!(is_valid_phone("123-456-7890", 10));
        assert!(is_valid_phone("1234567890", 10));
        assert!(is_valid_phone("  +1 234 567 8900 ", 10));
        assert!(!is_valid_phone("123456789", 10));
        assert!(!is_valid_phone("+123456789", 10));
        assert!(!is_valid_phone("123.456.7890", 10));
        assert!(!is_valid_phone("call me maybe", 10));
        // Non-ASCII digits
        assert!(!is_valid_phone("١٢٣٤٥٦٧٨٩٠", 10));
        assert!(!is_valid_phone("１２３４５６７８９０", 10));
    }

    #[test]
    fn size_limit_formatting() {
        assert_eq!(format_size_limit(5 * 1024 * 1024), "5MB");
        assert_eq!(format_size_limit(512 * 1024), "512KB");
        assert_eq!(format_size_limit(1000), "1000 bytes");
    }

    #[test]
    fn untouched_fields_never_error() {
        let errors = validate_basic_details(&BasicDetails::default(), &FieldSet::new(), &limits());
        assert!(errors.is_empty());
        let errors = validate_documents(&Documents::default(), &FieldSet::new(), &limits());
        assert!(errors.is_empty());
    }

    #[test]
    fn required_and_too_long() {
        let mut data = valid_basic();
        data.first_name.clear();
        data.last_name = "x".repeat(51);
        let errors = validate_basic_details(&data, &only(&["firstName", "lastName"]), &limits());
        assert_eq!(errors["firstName"], "First name is required");
        assert_eq!(errors["lastName"], "Last name is too long");
    }

    #[test]
    fn length_counts_characters() {
        let mut data = valid_basic();
        data.first_name = "é".repeat(50);
        let errors = validate_basic_details(&data, &only(&["firstName"]), &limits());
        assert!(errors.is_empty());
    }

    #[test]
    fn email_and_phone_messages() {
        let mut data = valid_basic();
        data.email = "not-an-email".into();
        data.phone = "12".into();
        let errors = validate_basic_details(&data, &only(&["email", "phone"]), &limits());
        assert_eq!(errors["email"], "Invalid email format");
        assert_eq!(errors["phone"], "Invalid phone number format");

        data.email.clear();
        data.phone.clear();
        let errors = validate_basic_details(&data, &only(&["email", "phone"]), &limits());
        assert_eq!(errors["email"], "Email is required");
        assert_eq!(errors["phone"], "Phone number is required");
    }

    #[test]
    fn address_is_optional_with_ceiling() {
        let mut data = valid_basic();
        let fields = only(&["address"]);
        assert!(validate_basic_details(&data, &fields, &limits()).is_empty());
        data.address = "a".repeat(201);
        assert_eq!(
            validate_basic_details(&data, &fields, &limits())["address"],
            "Address is too long"
        );
    }

    #[test]
    fn unruled_fields_pass() {
        let data = BasicDetails::default();
        assert!(validate_basic_details(&data, &only(&["dateOfBirth"]), &limits()).is_empty());
        let academic = AcademicDetails::default();
        let optional = only(&["previousDegree", "previousInstitute", "gpa"]);
        assert!(validate_academic_details(&academic, &optional, &limits()).is_empty());
    }

    #[test]
    fn academic_rules() {
        let mut data = AcademicDetails::default();
        let fields = all_fields(FormStep::AcademicDetails);
        let errors = validate_academic_details(&data, &fields, &limits());
        assert_eq!(errors["highSchoolName"], "High school name is required");
        assert_eq!(errors["highSchoolGrade"], "High school grade is required");

        data.high_school_name = "Central High".into();
        data.high_school_grade = "4.0 out of 4.0".into();
        let errors = validate_academic_details(&data, &fields, &limits());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["highSchoolGrade"], "Invalid grade format");
    }

    #[test]
    fn document_rules() {
        let fields = all_fields(FormStep::Documents);
        let mut docs = Documents::default();
        let errors = validate_documents(&docs, &fields, &limits());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["idProof"], "ID proof is required");

        docs.id_proof = Some(FileRef::new("id.pdf", 6_000_000));
        docs.transcripts = vec![FileRef::new("ok.pdf", 100), FileRef::new("big.pdf", 5_242_881)];
        docs.recommendations = vec![FileRef::new("edge.pdf", 5_242_880)];
        let errors = validate_documents(&docs, &fields, &limits());
        assert_eq!(errors["idProof"], "ID proof file size should not exceed 5MB");
        assert_eq!(errors["transcripts"], "Some transcript files exceed 5MB limit");
        assert!(!errors.contains_key("recommendations"));
    }

    #[test]
    fn step_dispatch() {
        let data = ApplicationData::default();
        let basic = all_fields(FormStep::BasicDetails);
        assert!(validate_step(&data, FormStep::Welcome, &basic, &limits()).is_empty());
        let errors = validate_step(&data, FormStep::BasicDetails, &basic, &limits());
        let keys: Vec<_> = errors.keys().map(String::as_str).collect();
        assert_eq!(keys, ["email", "firstName", "lastName", "phone"]);
    }
}
