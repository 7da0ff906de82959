use tracing::debug;

use applypilot_core_types::{FieldKind, FormFieldDescriptor};
use applypilot_session::PagePort;

use crate::errors::PerceiverError;

/// Per-step form discovery. Descriptors are valid for one DOM state only;
/// callers re-run this after every wizard navigation.
pub struct FieldExtractor;

impl FieldExtractor {
    pub async fn extract(page: &dyn PagePort) -> Result<Vec<FormFieldDescriptor>, PerceiverError> {
        let raw = page.extract_form_fields().await?;
        let total = raw.len();
        // Invisible controls are noise, except file inputs: those are
        // routinely hidden behind styled upload buttons.
        let fields: Vec<FormFieldDescriptor> = raw
            .into_iter()
            .filter(|field| field.is_visible || field.element_type == FieldKind::File)
            .collect();
        debug!(total, kept = fields.len(), "form fields extracted");
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testpage::StubPage;

    fn field(index: usize, kind: FieldKind, visible: bool) -> FormFieldDescriptor {
        FormFieldDescriptor {
            index,
            element_type: kind,
            name: format!("f{index}"),
            id: String::new(),
            placeholder: String::new(),
            associated_label: String::new(),
            required: false,
            current_value: String::new(),
            is_visible: visible,
        }
    }

    #[tokio::test]
    async fn test_invisible_dropped_but_file_inputs_kept() {
        let page = StubPage {
            fields: vec![
                field(0, FieldKind::Text, true),
                field(1, FieldKind::Text, false),
                field(2, FieldKind::File, false),
            ],
            ..StubPage::default()
        };
        let extracted = FieldExtractor::extract(&page).await.unwrap();
        let indices: Vec<usize> = extracted.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }
}
