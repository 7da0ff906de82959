use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use applypilot_core_types::{FieldKind, FormFieldDescriptor};

use crate::config::SessionConfig;
use crate::errors::SessionError;
use crate::js;
use crate::port::{ButtonDescriptor, PagePort};

/// One isolated headless browsing context, owned by a single application
/// attempt. Never reused: a fresh profile per attempt bounds resource
/// growth and avoids cross-attempt cookie bleed.
pub struct CdpPageSession {
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler: JoinHandle<()>,
    nav_timeout: Duration,
}

impl CdpPageSession {
    pub async fn launch(config: &SessionConfig) -> Result<Self, SessionError> {
        let (width, height) = config.window_size;
        let mut builder = BrowserConfig::builder().window_size(width, height);
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(exe) = &config.executable {
            builder = builder.chrome_executable(exe);
        }
        let browser_config = builder.build().map_err(SessionError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|err| SessionError::Launch(err.to_string()))?;

        // The handler stream must be polled for the lifetime of the browser.
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(err) => {
                handler_task.abort();
                return Err(SessionError::Launch(err.to_string()));
            }
        };

        debug!(headless = config.headless, "browser session launched");
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page,
            handler: handler_task,
            nav_timeout: config.nav_timeout,
        })
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T, SessionError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|err| SessionError::Eval(err.to_string()))?
            .into_value::<T>()
            .map_err(|err| SessionError::Eval(err.to_string()))
    }

    fn field_selector(field: &FormFieldDescriptor) -> String {
        format!("[data-ap-idx=\"{}\"]", field.index)
    }
}

impl Drop for CdpPageSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Raw record produced by the harvest script, converted into the shared
/// descriptor shape on the Rust side.
#[derive(Debug, Deserialize)]
struct RawField {
    index: usize,
    tag: String,
    #[serde(rename = "type")]
    input_type: String,
    name: String,
    id: String,
    placeholder: String,
    label: String,
    required: bool,
    value: String,
    visible: bool,
}

impl From<RawField> for FormFieldDescriptor {
    fn from(raw: RawField) -> Self {
        FormFieldDescriptor {
            index: raw.index,
            element_type: FieldKind::from_tag(&raw.tag, &raw.input_type),
            name: raw.name,
            id: raw.id,
            placeholder: raw.placeholder,
            associated_label: raw.label,
            required: raw.required,
            current_value: raw.value,
            is_visible: raw.visible,
        }
    }
}

#[async_trait]
impl PagePort for CdpPageSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        let nav = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };
        match tokio::time::timeout(self.nav_timeout, nav).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(SessionError::Navigation {
                url: url.to_string(),
                reason: err.to_string(),
            }),
            Err(_) => Err(SessionError::Navigation {
                url: url.to_string(),
                reason: format!("timed out after {:?}", self.nav_timeout),
            }),
        }
    }

    async fn current_url(&self) -> Result<String, SessionError> {
        Ok(self
            .page
            .url()
            .await
            .map_err(|err| SessionError::Cdp(err.to_string()))?
            .unwrap_or_default())
    }

    async fn title(&self) -> Result<String, SessionError> {
        Ok(self
            .page
            .get_title()
            .await
            .map_err(|err| SessionError::Cdp(err.to_string()))?
            .unwrap_or_default())
    }

    async fn body_text(&self) -> Result<String, SessionError> {
        self.eval("document.body ? document.body.innerText : ''".to_string())
            .await
    }

    async fn count_matching(&self, selector: &str) -> Result<usize, SessionError> {
        let literal =
            serde_json::to_string(selector).map_err(|err| SessionError::Eval(err.to_string()))?;
        let count: u64 = self
            .eval(format!("document.querySelectorAll({literal}).length"))
            .await?;
        Ok(count as usize)
    }

    async fn extract_form_fields(&self) -> Result<Vec<FormFieldDescriptor>, SessionError> {
        let raw: Vec<RawField> = self.eval(js::harvest_fields()).await?;
        Ok(raw.into_iter().map(FormFieldDescriptor::from).collect())
    }

    async fn visible_buttons(&self) -> Result<Vec<ButtonDescriptor>, SessionError> {
        self.eval(js::harvest_buttons()).await
    }

    async fn click_button(&self, button: &ButtonDescriptor) -> Result<(), SessionError> {
        let selector = format!("[data-ap-btn=\"{}\"]", button.handle);
        // Prefer a trusted click on main-frame elements; JS click is the
        // cross-frame fallback.
        if let Ok(element) = self.page.find_element(&selector).await {
            element
                .click()
                .await
                .map_err(|err| SessionError::Cdp(err.to_string()))?;
            return Ok(());
        }
        let clicked: bool = self.eval(js::click_button(button.handle)).await?;
        if clicked {
            Ok(())
        } else {
            Err(SessionError::ElementNotFound(selector))
        }
    }

    async fn fill_text(&self, field: &FormFieldDescriptor, text: &str) -> Result<(), SessionError> {
        let selector = Self::field_selector(field);
        if let Ok(element) = self.page.find_element(&selector).await {
            element
                .click()
                .await
                .map_err(|err| SessionError::Cdp(err.to_string()))?;
            let _: bool = self.eval(js::clear_value(field.index)).await?;
            element
                .type_str(text)
                .await
                .map_err(|err| SessionError::Cdp(err.to_string()))?;
            return Ok(());
        }
        // Element lives in a subframe; mutate through the frame walker.
        let ok: bool = self.eval(js::set_text(field.index, text)).await?;
        if ok {
            Ok(())
        } else {
            Err(SessionError::ElementNotFound(selector))
        }
    }

    async fn select_value(
        &self,
        field: &FormFieldDescriptor,
        value: &str,
    ) -> Result<(), SessionError> {
        let ok: bool = self.eval(js::select_option(field.index, value)).await?;
        if ok {
            Ok(())
        } else {
            Err(SessionError::ElementNotFound(Self::field_selector(field)))
        }
    }

    async fn set_checked(
        &self,
        field: &FormFieldDescriptor,
        checked: bool,
    ) -> Result<(), SessionError> {
        let ok: bool = self.eval(js::set_checked(field.index, checked)).await?;
        if ok {
            Ok(())
        } else {
            Err(SessionError::ElementNotFound(Self::field_selector(field)))
        }
    }

    async fn upload_file(
        &self,
        field: &FormFieldDescriptor,
        path: &str,
    ) -> Result<(), SessionError> {
        if !Path::new(path).is_absolute() || !Path::new(path).exists() {
            return Err(SessionError::Upload(format!(
                "resume path {path} is not an existing absolute path"
            )));
        }
        let selector = Self::field_selector(field);
        let element = self
            .page
            .find_element(&selector)
            .await
            .map_err(|_| SessionError::ElementNotFound(selector))?;
        let params = SetFileInputFilesParams::builder()
            .files(vec![path.to_string()])
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(SessionError::Upload)?;
        self.page
            .execute(params)
            .await
            .map_err(|err| SessionError::Upload(err.to_string()))?;
        Ok(())
    }

    /// Tear the context down. Idempotent; `Drop` additionally aborts the
    /// handler task so no exit path leaks a chromium poller.
    async fn close(&self) {
        if let Some(mut browser) = self.browser.lock().await.take() {
            if let Err(err) = browser.close().await {
                warn!(error = %err, "browser close failed");
            }
            if let Err(err) = browser.wait().await {
                warn!(error = %err, "browser wait failed");
            }
        }
        self.handler.abort();
    }
}
