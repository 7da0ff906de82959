use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapperError {
    #[error("mapper is not configured: {0}")]
    Unavailable(String),

    #[error("collaborator request failed: {0}")]
    Http(String),

    #[error("collaborator response unusable: {0}")]
    Parse(String),
}
