use thiserror::Error;

use applypilot_core_types::ApplicationStatus;
use applypilot_perceiver::PerceiverError;
use applypilot_session::SessionError;

/// Everything that can end an attempt early. Each variant maps to exactly
/// one terminal status so no error path escapes the outcome record.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Perceiver(#[from] PerceiverError),

    #[error("url resolves to a search-results page, not an individual posting")]
    ListingPage,

    #[error("login wall did not clear within the wait window")]
    LoginRequired,

    #[error("no fillable application form found on the page")]
    FormNotFound,

    #[error("no submit control found after filling")]
    SubmitNotFound,

    #[error("{0}")]
    Internal(String),
}

impl FlowError {
    pub fn status(&self) -> ApplicationStatus {
        match self {
            FlowError::Session(_) | FlowError::Perceiver(_) | FlowError::Internal(_) => {
                ApplicationStatus::Error
            }
            FlowError::ListingPage => ApplicationStatus::Error,
            FlowError::LoginRequired => ApplicationStatus::LoginRequired,
            FlowError::FormNotFound | FlowError::SubmitNotFound => {
                ApplicationStatus::ManualRequired
            }
        }
    }
}
