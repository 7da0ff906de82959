//! Scripted in-memory page for exercising the flow without a browser.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use applypilot_core_types::{FieldKind, FormFieldDescriptor};
use applypilot_session::{ButtonDescriptor, PagePort, SessionError};

/// One frozen DOM state: what every read-side port call answers with.
#[derive(Clone, Debug, Default)]
pub struct PageState {
    pub url: String,
    pub title: String,
    pub body: String,
    pub fields: Vec<FormFieldDescriptor>,
    pub buttons: Vec<ButtonDescriptor>,
    /// Exact-selector match counts for `count_matching`.
    pub counts: HashMap<String, usize>,
}

/// A `PagePort` whose state is advanced by scripted transitions: on
/// navigation, on button clicks, and on settle polls. Records every
/// mutation so tests can assert what the flow actually did.
#[derive(Default)]
pub struct FixturePage {
    state: Mutex<PageState>,
    nav_states: Mutex<Vec<(String, PageState)>>,
    click_states: Mutex<HashMap<usize, PageState>>,
    settle_states: Mutex<VecDeque<PageState>>,
    failing: Mutex<HashSet<usize>>,
    filled: Mutex<Vec<(usize, String)>>,
    clicked: Mutex<Vec<usize>>,
}

impl FixturePage {
    pub fn with_state(self, state: PageState) -> Self {
        *self.state.lock().unwrap() = state;
        self
    }

    pub fn with_fields(self, fields: Vec<FormFieldDescriptor>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.title = "Form".into();
            state.fields = fields;
        }
        self
    }

    /// Make fill/select/check/upload fail for one index.
    pub fn failing_field(self, index: usize) -> Self {
        self.failing.lock().unwrap().insert(index);
        self
    }

    /// State to apply when a navigation target contains `needle`.
    pub fn on_navigate(self, needle: &str, state: PageState) -> Self {
        self.nav_states.lock().unwrap().push((needle.to_string(), state));
        self
    }

    /// State to apply when the button with `handle` is clicked.
    pub fn on_click(self, handle: usize, state: PageState) -> Self {
        self.click_states.lock().unwrap().insert(handle, state);
        self
    }

    /// States popped one per `settle` call, for poll-driven transitions.
    pub fn on_settle(self, states: Vec<PageState>) -> Self {
        *self.settle_states.lock().unwrap() = states.into();
        self
    }

    pub fn text_field(index: usize, name: &str) -> FormFieldDescriptor {
        FormFieldDescriptor {
            index,
            element_type: FieldKind::Text,
            name: name.into(),
            id: String::new(),
            placeholder: String::new(),
            associated_label: String::new(),
            required: false,
            current_value: String::new(),
            is_visible: true,
        }
    }

    pub fn button(handle: usize, text: &str, type_attr: &str) -> ButtonDescriptor {
        ButtonDescriptor {
            handle,
            text: text.into(),
            id: String::new(),
            type_attr: type_attr.into(),
            aria_label: String::new(),
            is_visible: true,
        }
    }

    pub fn fields_snapshot(&self) -> Vec<FormFieldDescriptor> {
        self.state.lock().unwrap().fields.clone()
    }

    pub fn filled_values(&self) -> Vec<(usize, String)> {
        self.filled.lock().unwrap().clone()
    }

    pub fn clicked_handles(&self) -> Vec<usize> {
        self.clicked.lock().unwrap().clone()
    }

    fn record_fill(&self, field: &FormFieldDescriptor, value: String) -> Result<(), SessionError> {
        if self.failing.lock().unwrap().contains(&field.index) {
            return Err(SessionError::ElementNotFound(format!(
                "[data-ap-idx=\"{}\"]",
                field.index
            )));
        }
        self.filled.lock().unwrap().push((field.index, value));
        Ok(())
    }
}

#[async_trait]
impl PagePort for FixturePage {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        let next = self
            .nav_states
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| url.contains(needle.as_str()))
            .map(|(_, state)| state.clone());
        let mut state = self.state.lock().unwrap();
        if let Some(next) = next {
            *state = next;
        }
        if state.url.is_empty() {
            state.url = url.to_string();
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, SessionError> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn title(&self) -> Result<String, SessionError> {
        Ok(self.state.lock().unwrap().title.clone())
    }

    async fn body_text(&self) -> Result<String, SessionError> {
        Ok(self.state.lock().unwrap().body.clone())
    }

    async fn count_matching(&self, selector: &str) -> Result<usize, SessionError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .counts
            .get(selector)
            .copied()
            .unwrap_or(0))
    }

    async fn extract_form_fields(&self) -> Result<Vec<FormFieldDescriptor>, SessionError> {
        Ok(self.state.lock().unwrap().fields.clone())
    }

    async fn visible_buttons(&self) -> Result<Vec<ButtonDescriptor>, SessionError> {
        Ok(self.state.lock().unwrap().buttons.clone())
    }

    async fn click_button(&self, button: &ButtonDescriptor) -> Result<(), SessionError> {
        self.clicked.lock().unwrap().push(button.handle);
        let next = self.click_states.lock().unwrap().get(&button.handle).cloned();
        if let Some(next) = next {
            *self.state.lock().unwrap() = next;
        }
        Ok(())
    }

    async fn fill_text(&self, field: &FormFieldDescriptor, text: &str) -> Result<(), SessionError> {
        self.record_fill(field, text.to_string())
    }

    async fn select_value(
        &self,
        field: &FormFieldDescriptor,
        value: &str,
    ) -> Result<(), SessionError> {
        self.record_fill(field, value.to_string())
    }

    async fn set_checked(
        &self,
        field: &FormFieldDescriptor,
        checked: bool,
    ) -> Result<(), SessionError> {
        self.record_fill(field, checked.to_string())
    }

    async fn upload_file(
        &self,
        field: &FormFieldDescriptor,
        path: &str,
    ) -> Result<(), SessionError> {
        self.record_fill(field, path.to_string())
    }

    async fn settle(&self, _delay: Duration) -> Result<(), SessionError> {
        let next = self.settle_states.lock().unwrap().pop_front();
        if let Some(next) = next {
            *self.state.lock().unwrap() = next;
        }
        Ok(())
    }
}
