//! Shared fixed-state page for perception tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use applypilot_core_types::FormFieldDescriptor;
use applypilot_session::{ButtonDescriptor, PagePort, SessionError};

/// Answers every read with a fixed value. `real_sleep` makes `settle`
/// consume wall-clock time so timing bounds can be asserted.
#[derive(Default)]
pub struct StubPage {
    pub url: String,
    pub title: String,
    pub body: String,
    pub fields: Vec<FormFieldDescriptor>,
    pub counts: HashMap<String, usize>,
    pub real_sleep: bool,
}

#[async_trait]
impl PagePort for StubPage {
    async fn navigate(&self, _url: &str) -> Result<(), SessionError> {
        Ok(())
    }

    async fn current_url(&self) -> Result<String, SessionError> {
        Ok(self.url.clone())
    }

    async fn title(&self) -> Result<String, SessionError> {
        Ok(self.title.clone())
    }

    async fn body_text(&self) -> Result<String, SessionError> {
        Ok(self.body.clone())
    }

    async fn count_matching(&self, selector: &str) -> Result<usize, SessionError> {
        Ok(self.counts.get(selector).copied().unwrap_or(0))
    }

    async fn extract_form_fields(&self) -> Result<Vec<FormFieldDescriptor>, SessionError> {
        Ok(self.fields.clone())
    }

    async fn visible_buttons(&self) -> Result<Vec<ButtonDescriptor>, SessionError> {
        Ok(vec![])
    }

    async fn click_button(&self, _button: &ButtonDescriptor) -> Result<(), SessionError> {
        Ok(())
    }

    async fn fill_text(
        &self,
        _field: &FormFieldDescriptor,
        _text: &str,
    ) -> Result<(), SessionError> {
        Ok(())
    }

    async fn select_value(
        &self,
        _field: &FormFieldDescriptor,
        _value: &str,
    ) -> Result<(), SessionError> {
        Ok(())
    }

    async fn set_checked(
        &self,
        _field: &FormFieldDescriptor,
        _checked: bool,
    ) -> Result<(), SessionError> {
        Ok(())
    }

    async fn upload_file(
        &self,
        _field: &FormFieldDescriptor,
        _path: &str,
    ) -> Result<(), SessionError> {
        Ok(())
    }

    async fn settle(&self, delay: Duration) -> Result<(), SessionError> {
        if self.real_sleep {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}
