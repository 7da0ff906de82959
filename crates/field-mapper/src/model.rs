use serde::{Deserialize, Serialize};

use applypilot_core_types::{ApplicantProfile, ApplicationConfig, FormFieldDescriptor, JobPosting};

/// Everything a mapper needs for one page/step: the descriptor list, the
/// applicant, job context and a cover-letter excerpt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MappingRequest {
    pub fields: Vec<FormFieldDescriptor>,
    pub profile: ApplicantProfile,
    pub job_title: String,
    pub company: String,
    pub cover_letter_excerpt: String,
    pub resume_path: Option<String>,
}

impl MappingRequest {
    pub fn new(
        fields: Vec<FormFieldDescriptor>,
        posting: &JobPosting,
        config: &ApplicationConfig,
    ) -> Self {
        const EXCERPT_LEN: usize = 600;
        let excerpt: String = config.cover_letter_text.chars().take(EXCERPT_LEN).collect();
        Self {
            fields,
            profile: config.applicant_profile.clone(),
            job_title: posting.title.clone(),
            company: posting.company.clone(),
            cover_letter_excerpt: excerpt,
            resume_path: config.resume_path.clone(),
        }
    }

    /// A mapping is applicable only if its index resolves to a descriptor
    /// we actually extracted; the mapper must never invent fields.
    pub fn contains_index(&self, index: usize) -> bool {
        self.fields.iter().any(|field| field.index == index)
    }
}
