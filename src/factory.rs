use async_trait::async_trait;

use applypilot_flow::{FlowError, SessionFactory};
use applypilot_session::{CdpPageSession, PagePort, SessionConfig};

/// Launches a fresh chromium context per attempt.
pub struct ChromeSessionFactory {
    config: SessionConfig,
}

impl ChromeSessionFactory {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    async fn open(&self) -> Result<Box<dyn PagePort>, FlowError> {
        let session = CdpPageSession::launch(&self.config).await?;
        Ok(Box::new(session))
    }
}
