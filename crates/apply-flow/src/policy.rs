use std::time::Duration;

use applypilot_perceiver::{ClassifierPolicy, GatePolicy};

use crate::filler::FillPolicy;

/// Every ceiling the pipeline observes. All waits in the flow are bounded
/// by one of these; there is no unbounded poll anywhere.
#[derive(Clone, Debug)]
pub struct FlowPolicy {
    pub classifier: ClassifierPolicy,
    pub gate: GatePolicy,
    pub fill: FillPolicy,
    /// Wizard advance ceiling; the loop stops here even if a next control
    /// is still on screen.
    pub max_wizard_steps: u32,
    /// Wait after a step advance before re-extracting fields.
    pub step_settle: Duration,
    /// Wait after the submit click before reading the result page.
    pub post_submit_settle: Duration,
    /// Fixed pause between attempts in a batch.
    pub inter_attempt_delay: Duration,
}

impl Default for FlowPolicy {
    fn default() -> Self {
        Self {
            classifier: ClassifierPolicy::default(),
            gate: GatePolicy::default(),
            fill: FillPolicy::default(),
            max_wizard_steps: 5,
            step_settle: Duration::from_secs(2),
            post_submit_settle: Duration::from_secs(3),
            inter_attempt_delay: Duration::from_secs(10),
        }
    }
}

impl FlowPolicy {
    /// Tight ceilings for fixture-backed tests.
    pub fn fast() -> Self {
        Self {
            classifier: ClassifierPolicy {
                settle_interval: Duration::from_millis(1),
                ..ClassifierPolicy::default()
            },
            gate: GatePolicy {
                poll_interval: Duration::from_millis(1),
                total_timeout: Duration::from_millis(20),
            },
            fill: FillPolicy {
                inter_field_delay: Duration::from_millis(0),
            },
            max_wizard_steps: 5,
            step_settle: Duration::from_millis(1),
            post_submit_settle: Duration::from_millis(1),
            inter_attempt_delay: Duration::from_millis(1),
        }
    }
}
