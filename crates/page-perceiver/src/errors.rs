use thiserror::Error;

use applypilot_session::SessionError;

#[derive(Debug, Error)]
pub enum PerceiverError {
    #[error("page access failed: {0}")]
    Page(#[from] SessionError),

    #[error("page never finished rendering after {0} polls")]
    RenderTimeout(u32),
}
