//! Shared types for the ApplyPilot application agent.
//!
//! Everything that crosses a crate boundary lives here: the job/profile
//! inputs, the per-step form descriptors, the mapper output, and the single
//! terminal `ApplicationOutcome` every attempt must produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a stored job posting.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    New,
    Applied,
    Skipped,
}

/// A job posting as handed over by the persistence layer. Immutable once
/// fetched; only `status` mutates after an attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub job_url: String,
    pub description: Option<String>,
    /// Originating job board ("indeed", "linkedin", "remoteok", ...).
    pub source: String,
    pub status: JobStatus,
}

impl JobPosting {
    pub fn new(title: impl Into<String>, company: impl Into<String>, job_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            company: company.into(),
            location: None,
            job_url: job_url.into(),
            description: None,
            source: String::new(),
            status: JobStatus::New,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// Applicant identity supplied by the caller. Read-only to the agent.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<String>,
    pub resume_file_path: Option<String>,
}

impl ApplicantProfile {
    /// Split the full name into (first, last). A single token yields an
    /// empty last name; everything after the first token is the last name.
    pub fn name_parts(&self) -> (String, String) {
        let mut parts = self.full_name.split_whitespace();
        let first = parts.next().unwrap_or_default().to_string();
        let last = parts.collect::<Vec<_>>().join(" ");
        (first, last)
    }
}

/// Complete input bundle for one application attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub resume_path: Option<String>,
    pub cover_letter_text: String,
    pub applicant_profile: ApplicantProfile,
}

/// Kind of form control, derived from the tag name and `type` attribute.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Select,
    Checkbox,
    Radio,
    File,
    Textarea,
    /// Anything else (hidden, date, number, ...) is carried through so the
    /// mapper can still see it, but the filler treats it as plain text.
    Other,
}

impl FieldKind {
    pub fn from_tag(tag: &str, input_type: &str) -> Self {
        match tag {
            "select" => FieldKind::Select,
            "textarea" => FieldKind::Textarea,
            _ => match input_type {
                "email" => FieldKind::Email,
                "tel" => FieldKind::Tel,
                "checkbox" => FieldKind::Checkbox,
                "radio" => FieldKind::Radio,
                "file" => FieldKind::File,
                "text" | "" => FieldKind::Text,
                _ => FieldKind::Other,
            },
        }
    }
}

/// One form control on the active step, with its structural metadata.
/// Descriptors are derived per page/step and discarded after each step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormFieldDescriptor {
    pub index: usize,
    pub element_type: FieldKind,
    pub name: String,
    pub id: String,
    pub placeholder: String,
    pub associated_label: String,
    pub required: bool,
    pub current_value: String,
    pub is_visible: bool,
}

impl FormFieldDescriptor {
    /// Lowercased concatenation of the naming signals, used by the
    /// rule-based mapper for substring matching.
    pub fn naming_haystack(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name, self.id, self.placeholder, self.associated_label
        )
        .to_lowercase()
    }
}

/// Mapper verdict for one descriptor. `value == None` means leave the field
/// untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldMapping {
    pub field_index: usize,
    pub field_name: String,
    pub value: Option<String>,
    pub rationale: String,
}

/// Known third-party Applicant Tracking Systems, determined purely from the
/// URL domain.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtsIdentity {
    SmartRecruiters,
    Greenhouse,
    Lever,
    Workday,
    Taleo,
    Jobvite,
    Icims,
    BambooHr,
    None,
}

impl AtsIdentity {
    pub fn is_known(&self) -> bool {
        !matches!(self, AtsIdentity::None)
    }
}

/// Terminal status of an application attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Pending,
    Error,
    ManualRequired,
    LoginRequired,
}

/// The one record every attempt produces, success or not.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApplicationOutcome {
    pub success: bool,
    pub status: ApplicationStatus,
    pub message: String,
    pub confirmation_url: Option<String>,
    pub final_url: String,
    pub ats_type: Option<AtsIdentity>,
    pub attempted_at: DateTime<Utc>,
}

impl ApplicationOutcome {
    /// Verified submission. `status = applied` implies `success` and a
    /// non-empty final URL, so both are taken here rather than set by hand.
    pub fn applied(message: impl Into<String>, final_url: impl Into<String>) -> Self {
        let final_url = final_url.into();
        Self {
            success: true,
            status: ApplicationStatus::Applied,
            message: message.into(),
            confirmation_url: Some(final_url.clone()),
            final_url,
            ats_type: None,
            attempted_at: Utc::now(),
        }
    }

    pub fn failure(
        status: ApplicationStatus,
        message: impl Into<String>,
        final_url: impl Into<String>,
    ) -> Self {
        debug_assert!(!matches!(status, ApplicationStatus::Applied));
        Self {
            success: false,
            status,
            message: message.into(),
            confirmation_url: None,
            final_url: final_url.into(),
            ats_type: None,
            attempted_at: Utc::now(),
        }
    }

    pub fn with_ats(mut self, ats: AtsIdentity) -> Self {
        if ats.is_known() {
            self.ats_type = Some(ats);
        }
        self
    }
}
