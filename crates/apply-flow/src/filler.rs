use std::time::Duration;

use tracing::{debug, warn};

use applypilot_core_types::{FieldKind, FieldMapping, FormFieldDescriptor};
use applypilot_session::PagePort;

#[derive(Clone, Debug)]
pub struct FillPolicy {
    /// Pause after each field so client-side validation can react to the
    /// input events before the next control is touched.
    pub inter_field_delay: Duration,
}

impl Default for FillPolicy {
    fn default() -> Self {
        Self {
            inter_field_delay: Duration::from_millis(300),
        }
    }
}

/// Tally of one fill pass over a descriptor set.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FillReport {
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Applies mapper verdicts to the live page, one control at a time.
/// A single field failing is never fatal: it is logged and skipped, and
/// the pass continues.
pub struct FormFiller;

impl FormFiller {
    pub async fn apply(
        page: &dyn PagePort,
        fields: &[FormFieldDescriptor],
        mappings: &[FieldMapping],
        policy: &FillPolicy,
    ) -> FillReport {
        let mut report = FillReport::default();

        for mapping in mappings {
            let Some(value) = mapping.value.as_deref() else {
                report.skipped += 1;
                continue;
            };
            // A mapping only applies if its index resolves against the
            // descriptors of the *current* step; stale indices are dropped.
            let Some(field) = fields.iter().find(|f| f.index == mapping.field_index) else {
                debug!(index = mapping.field_index, "mapping index not on this step, dropped");
                report.skipped += 1;
                continue;
            };

            let result = match field.element_type {
                FieldKind::Select => page.select_value(field, value).await,
                FieldKind::Checkbox | FieldKind::Radio => {
                    page.set_checked(field, parse_bool(value)).await
                }
                FieldKind::File => page.upload_file(field, value).await,
                _ => page.fill_text(field, value).await,
            };

            match result {
                Ok(()) => report.applied += 1,
                Err(err) => {
                    warn!(
                        field = %mapping.field_name,
                        index = field.index,
                        error = %err,
                        "field fill failed, continuing"
                    );
                    report.failed += 1;
                }
            }

            if !policy.inter_field_delay.is_zero() {
                let _ = page.settle(policy.inter_field_delay).await;
            }
        }
        report
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "yes" | "1" | "checked" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FixturePage;
    use applypilot_core_types::FieldMapping;

    fn mapping(index: usize, value: Option<&str>) -> FieldMapping {
        FieldMapping {
            field_index: index,
            field_name: format!("f{index}"),
            value: value.map(str::to_string),
            rationale: String::new(),
        }
    }

    #[tokio::test]
    async fn test_none_values_and_stale_indices_are_skipped() {
        let page = FixturePage::default().with_fields(vec![
            FixturePage::text_field(0, "first_name"),
            FixturePage::text_field(1, "email"),
        ]);
        let fields = page.fields_snapshot();
        let mappings = vec![
            mapping(0, Some("Jane")),
            mapping(1, None),
            mapping(9, Some("stale")),
        ];
        let report =
            FormFiller::apply(&page, &fields, &mappings, &FillPolicy::default()).await;
        assert_eq!(report, FillReport { applied: 1, skipped: 2, failed: 0 });
        assert_eq!(page.filled_values(), vec![(0, "Jane".to_string())]);
    }

    #[tokio::test]
    async fn test_single_field_failure_does_not_abort_the_pass() {
        let page = FixturePage::default()
            .with_fields(vec![
                FixturePage::text_field(0, "first_name"),
                FixturePage::text_field(1, "last_name"),
            ])
            .failing_field(0);
        let fields = page.fields_snapshot();
        let mappings = vec![mapping(0, Some("Jane")), mapping(1, Some("Doe"))];
        let report =
            FormFiller::apply(&page, &fields, &mappings, &FillPolicy::default()).await;
        assert_eq!(report.failed, 1);
        assert_eq!(report.applied, 1);
        assert_eq!(page.filled_values(), vec![(1, "Doe".to_string())]);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("Yes"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }
}
