use applypilot_perceiver::keywords::{contains_any, CANCEL_WORDS, NEXT_WORDS, SUBMIT_WORDS};
use applypilot_session::ButtonDescriptor;

/// Pick the control that advances a multi-step wizard. Submit-flavored and
/// backwards-flavored controls are excluded so the step loop can never fire
/// the final submission or walk the wizard backwards.
pub fn find_next_control(buttons: &[ButtonDescriptor]) -> Option<ButtonDescriptor> {
    buttons
        .iter()
        .filter(|button| button.is_visible)
        .find(|button| {
            let haystack = button.naming_haystack();
            contains_any(&haystack, NEXT_WORDS)
                && button.type_attr != "submit"
                && !contains_any(&haystack, SUBMIT_WORDS)
                && !contains_any(&haystack, CANCEL_WORDS)
        })
        .cloned()
}
