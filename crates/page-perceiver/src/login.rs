use std::time::{Duration, Instant};

use tracing::{debug, info};

use applypilot_session::PagePort;

use crate::errors::PerceiverError;
use crate::keywords::{contains_any, LOGIN_PHRASES};

/// What happened at the authentication wall.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GateOutcome {
    /// No login signal on the page.
    NoWall,
    /// Signal cleared within the window (operator signed in out of band).
    Resolved,
    /// Signal persisted for the whole window.
    Unresolved,
}

#[derive(Clone, Debug)]
pub struct GatePolicy {
    pub poll_interval: Duration,
    pub total_timeout: Duration,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            total_timeout: Duration::from_secs(60),
        }
    }
}

/// Models login as an externally-resolved event the agent cannot force,
/// only wait on. Stateless between calls: a retry after manual login
/// resumes from extraction.
pub struct LoginGate {
    policy: GatePolicy,
}

impl LoginGate {
    pub fn new(policy: GatePolicy) -> Self {
        Self { policy }
    }

    /// One-shot signal check: password input present, or sign-in phrasing
    /// in the page text.
    pub async fn detect(page: &dyn PagePort) -> Result<bool, PerceiverError> {
        if page.exists("input[type=\"password\"]").await? {
            return Ok(true);
        }
        let body = page.body_text().await?.to_lowercase();
        Ok(contains_any(&body, LOGIN_PHRASES))
    }

    /// Bounded poll for the operator to complete sign-in. A URL change or
    /// signal disappearance is provisional, confirmed by one final
    /// re-check before reporting `Resolved`.
    pub async fn wait_for_login(&self, page: &dyn PagePort) -> Result<GateOutcome, PerceiverError> {
        if !Self::detect(page).await? {
            return Ok(GateOutcome::NoWall);
        }

        info!(
            timeout_s = self.policy.total_timeout.as_secs(),
            "login wall detected, waiting for out-of-band sign-in"
        );
        let start_url = page.current_url().await?;
        let started = Instant::now();

        while started.elapsed() < self.policy.total_timeout {
            page.settle(self.policy.poll_interval).await?;

            let url = page.current_url().await?;
            let signal = Self::detect(page).await?;
            if url != start_url || !signal {
                debug!(url_changed = url != start_url, signal, "provisional login resolution");
                page.settle(self.policy.poll_interval).await?;
                if !Self::detect(page).await? {
                    return Ok(GateOutcome::Resolved);
                }
                // URL moved but the wall is still up (e.g. a dedicated
                // sign-in page); keep waiting out the window.
            }
        }
        Ok(GateOutcome::Unresolved)
    }
}

impl Default for LoginGate {
    fn default() -> Self {
        Self::new(GatePolicy::default())
    }
}
