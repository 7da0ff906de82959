use thiserror::Error;

/// Session-level errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("CDP command failed: {0}")]
    Cdp(String),

    #[error("script evaluation failed: {0}")]
    Eval(String),

    #[error("no element matched {0}")]
    ElementNotFound(String),

    #[error("file upload failed: {0}")]
    Upload(String),
}
