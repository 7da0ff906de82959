use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use applypilot_core_types::{ApplicantProfile, FieldKind, FieldMapping, FormFieldDescriptor};

use crate::errors::MapperError;
use crate::model::MappingRequest;
use crate::provider::FieldMapper;

/// Deterministic name/label pattern rules. This is the fallback path and
/// must stand on its own: the text-generation collaborator is optional
/// configuration, not a prerequisite.
#[derive(Clone, Debug, Default)]
pub struct RuleBasedMapper;

impl RuleBasedMapper {
    /// One mapping per descriptor; `value == None` leaves the field alone.
    pub fn map(request: &MappingRequest) -> Vec<FieldMapping> {
        request
            .fields
            .iter()
            .map(|field| Self::map_one(field, &request.profile, &request.cover_letter_excerpt, request.resume_path.as_deref()))
            .collect()
    }

    /// Lightweight pass for later wizard steps: contact fields only.
    pub fn map_contact_only(
        fields: &[FormFieldDescriptor],
        profile: &ApplicantProfile,
    ) -> Vec<FieldMapping> {
        fields
            .iter()
            .filter_map(|field| {
                let haystack = field.naming_haystack();
                let value = if field.element_type == FieldKind::Email || haystack.contains("email") {
                    Some(profile.email.clone())
                } else if field.element_type == FieldKind::Tel || haystack.contains("phone") {
                    profile.phone.clone()
                } else {
                    None
                };
                value.map(|value| FieldMapping {
                    field_index: field.index,
                    field_name: field.name.clone(),
                    value: Some(value),
                    rationale: "contact-only step pass".to_string(),
                })
            })
            .collect()
    }

    fn map_one(
        field: &FormFieldDescriptor,
        profile: &ApplicantProfile,
        cover_letter: &str,
        resume_path: Option<&str>,
    ) -> FieldMapping {
        let haystack = field.naming_haystack();
        let (first_name, last_name) = profile.name_parts();

        let (value, rationale): (Option<String>, &str) = match field.element_type {
            FieldKind::Email => (Some(profile.email.clone()), "email input type"),
            FieldKind::Tel => (profile.phone.clone(), "tel input type"),
            FieldKind::File => {
                let existing = resume_path
                    .or(profile.resume_file_path.as_deref())
                    .filter(|path| Path::new(path).exists());
                (existing.map(str::to_string), "resume upload")
            }
            FieldKind::Checkbox => {
                if field.required {
                    (Some("true".to_string()), "required consent checkbox")
                } else {
                    (None, "optional checkbox left alone")
                }
            }
            FieldKind::Textarea => {
                if ["cover", "letter", "message", "why"]
                    .iter()
                    .any(|needle| haystack.contains(needle))
                {
                    (Some(cover_letter.to_string()), "cover letter textarea")
                } else {
                    (None, "unrecognized textarea")
                }
            }
            _ => {
                if haystack.contains("first") {
                    (Some(first_name), "first-name pattern")
                } else if haystack.contains("last") || haystack.contains("surname") {
                    (Some(last_name), "last-name pattern")
                } else if haystack.contains("full name") || haystack.contains("name") {
                    (Some(profile.full_name.clone()), "full-name pattern")
                } else if haystack.contains("email") {
                    (Some(profile.email.clone()), "email pattern")
                } else if haystack.contains("phone") || haystack.contains("mobile") {
                    (profile.phone.clone(), "phone pattern")
                } else {
                    (None, "no rule matched")
                }
            }
        };

        FieldMapping {
            field_index: field.index,
            field_name: field.name.clone(),
            value,
            rationale: rationale.to_string(),
        }
    }
}

#[async_trait]
impl FieldMapper for RuleBasedMapper {
    async fn map_fields(&self, request: &MappingRequest) -> Result<Vec<FieldMapping>, MapperError> {
        let mappings = Self::map(request);
        debug!(
            mapped = mappings.iter().filter(|m| m.value.is_some()).count(),
            total = mappings.len(),
            "rule-based mapping"
        );
        Ok(mappings)
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}
