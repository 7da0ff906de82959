use tracing::debug;

use applypilot_perceiver::keywords::{
    contains_any, CANCEL_WORDS, ERROR_PHRASES, SUBMIT_WORDS, SUCCESS_PHRASES,
};
use applypilot_session::{ButtonDescriptor, PagePort};

use crate::errors::FlowError;

/// Post-submit verification verdict. Success requires an affirmative
/// signal AND the absence of an error signal; anything else is ambiguous
/// and must not be reported as applied.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Verdict {
    Success,
    Ambiguous(String),
}

/// Two-pass submit discovery over the visible controls: structural
/// attributes first (`type="submit"`, submit/apply in id or aria-label),
/// then label text. Cancel-flavored controls never qualify.
pub fn find_submit_control(buttons: &[ButtonDescriptor]) -> Option<ButtonDescriptor> {
    let visible: Vec<&ButtonDescriptor> = buttons.iter().filter(|b| b.is_visible).collect();

    for button in &visible {
        let attrs = format!("{} {}", button.id, button.aria_label).to_lowercase();
        let structural = button.type_attr == "submit"
            || attrs.contains("submit")
            || attrs.contains("apply");
        if structural && !is_negative(button) {
            return Some((*button).clone());
        }
    }

    for button in &visible {
        let text = button.text.to_lowercase();
        if contains_any(&text, SUBMIT_WORDS) && !is_negative(button) {
            return Some((*button).clone());
        }
    }
    None
}

fn is_negative(button: &ButtonDescriptor) -> bool {
    contains_any(&button.naming_haystack(), CANCEL_WORDS)
}

/// Read the settled post-submit page and decide whether the submission
/// verifiably landed.
pub async fn verify_success(page: &dyn PagePort) -> Result<Verdict, FlowError> {
    let body = page.body_text().await?.to_lowercase();
    let affirmative = contains_any(&body, SUCCESS_PHRASES);
    let negative = contains_any(&body, ERROR_PHRASES);
    debug!(affirmative, negative, "post-submit signals");

    if affirmative && !negative {
        Ok(Verdict::Success)
    } else {
        let reason = if negative {
            "page shows a validation or error message after submit"
        } else {
            "no confirmation signal on the post-submit page"
        };
        Ok(Verdict::Ambiguous(reason.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FixturePage, PageState};

    #[test]
    fn test_structural_submit_wins_over_text() {
        let mut by_id = FixturePage::button(1, "Finish", "button");
        by_id.id = "apply-button".into();
        let buttons = vec![FixturePage::button(0, "Send feedback", "button"), by_id];
        assert_eq!(find_submit_control(&buttons).unwrap().handle, 1);
    }

    #[test]
    fn test_text_fallback_skips_cancel_flavored_controls() {
        let buttons = vec![
            FixturePage::button(0, "Cancel application", "button"),
            FixturePage::button(1, "Apply now", "button"),
        ];
        assert_eq!(find_submit_control(&buttons).unwrap().handle, 1);
    }

    #[test]
    fn test_no_submit_control() {
        let buttons = vec![FixturePage::button(0, "Learn more", "button")];
        assert!(find_submit_control(&buttons).is_none());
    }

    #[tokio::test]
    async fn test_success_needs_affirmative_and_no_error() {
        let ok = FixturePage::default().with_state(PageState {
            body: "Thank you! We received your application.".into(),
            ..PageState::default()
        });
        assert_eq!(verify_success(&ok).await.unwrap(), Verdict::Success);

        let mixed = FixturePage::default().with_state(PageState {
            body: "Thank you. Error: required field Phone is missing.".into(),
            ..PageState::default()
        });
        assert!(matches!(
            verify_success(&mixed).await.unwrap(),
            Verdict::Ambiguous(_)
        ));

        let silent = FixturePage::default().with_state(PageState {
            body: "Senior Backend Engineer at Acme".into(),
            ..PageState::default()
        });
        assert!(matches!(
            verify_success(&silent).await.unwrap(),
            Verdict::Ambiguous(_)
        ));
    }
}
