use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use applypilot_core_types::FormFieldDescriptor;

use crate::errors::SessionError;

/// A clickable control harvested from the page, used for next-step and
/// submit discovery. `handle` resolves back to the live element for one
/// page state only; it is re-harvested after every navigation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ButtonDescriptor {
    pub handle: usize,
    pub text: String,
    pub id: String,
    pub type_attr: String,
    pub aria_label: String,
    pub is_visible: bool,
}

impl ButtonDescriptor {
    /// Lowercased concatenation of the signals submit/next discovery
    /// matches against.
    pub fn naming_haystack(&self) -> String {
        format!("{} {} {}", self.text, self.id, self.aria_label).to_lowercase()
    }
}

/// The seam between the agent and a live (or fixture) page. All DOM
/// operations the pipeline performs go through this trait; implementations
/// re-resolve elements on every call so mappings are never applied to a
/// stale DOM.
#[async_trait]
pub trait PagePort: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    async fn current_url(&self) -> Result<String, SessionError>;

    async fn title(&self) -> Result<String, SessionError>;

    /// Full visible text of the body, lowercased by callers as needed.
    async fn body_text(&self) -> Result<String, SessionError>;

    /// Number of elements matching a CSS selector in the main frame.
    async fn count_matching(&self, selector: &str) -> Result<usize, SessionError>;

    async fn exists(&self, selector: &str) -> Result<bool, SessionError> {
        Ok(self.count_matching(selector).await? > 0)
    }

    /// Enumerate every input/select/textarea across the main frame and any
    /// reachable same-origin iframe. Re-run once per wizard step.
    async fn extract_form_fields(&self) -> Result<Vec<FormFieldDescriptor>, SessionError>;

    /// Harvest clickable controls (buttons, submit inputs, role=button
    /// anchors) with their naming signals.
    async fn visible_buttons(&self) -> Result<Vec<ButtonDescriptor>, SessionError>;

    async fn click_button(&self, button: &ButtonDescriptor) -> Result<(), SessionError>;

    /// Clear-then-type into a text-like control.
    async fn fill_text(&self, field: &FormFieldDescriptor, text: &str) -> Result<(), SessionError>;

    /// Choose a select option by option value (falling back to visible
    /// label inside the implementation).
    async fn select_value(
        &self,
        field: &FormFieldDescriptor,
        value: &str,
    ) -> Result<(), SessionError>;

    /// Set checkbox/radio state; implementations click only when the target
    /// state differs from the current one.
    async fn set_checked(&self, field: &FormFieldDescriptor, checked: bool)
        -> Result<(), SessionError>;

    /// Upload a file from an absolute filesystem path.
    async fn upload_file(&self, field: &FormFieldDescriptor, path: &str)
        -> Result<(), SessionError>;

    /// Let client-side scripts react; fixture pages may no-op this.
    async fn settle(&self, delay: Duration) -> Result<(), SessionError> {
        tokio::time::sleep(delay).await;
        Ok(())
    }

    /// Release the underlying context. Called unconditionally at the end
    /// of an attempt; fixture pages have nothing to release.
    async fn close(&self) {}
}
