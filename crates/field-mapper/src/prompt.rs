use serde_json::json;

use crate::model::MappingRequest;

pub const SYSTEM_PROMPT: &str = "You fill job application forms. Given form field \
descriptors and an applicant profile, decide a value for each field. Reply with a \
strict JSON array only, no prose: each element is \
{\"field_index\": number, \"field_name\": string, \"value\": string or null, \
\"rationale\": string}. Use null to leave a field untouched. Never invent a \
field_index that is not in the provided list.";

/// One structured user message carrying the descriptor list, the applicant
/// (name decomposed into first/last), job context and a cover-letter
/// excerpt.
pub fn build_user_prompt(request: &MappingRequest) -> String {
    let (first_name, last_name) = request.profile.name_parts();
    let payload = json!({
        "job": {
            "title": request.job_title,
            "company": request.company,
        },
        "applicant": {
            "full_name": request.profile.full_name,
            "first_name": first_name,
            "last_name": last_name,
            "email": request.profile.email,
            "phone": request.profile.phone,
            "skills": request.profile.skills,
            "experience": request.profile.experience,
            "has_resume_file": request.resume_path.is_some(),
        },
        "cover_letter_excerpt": request.cover_letter_excerpt,
        "fields": request.fields,
    });
    format!(
        "Map a value onto every form field below.\n{}",
        serde_json::to_string_pretty(&payload).unwrap_or_default()
    )
}
