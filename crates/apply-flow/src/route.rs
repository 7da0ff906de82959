use async_trait::async_trait;
use tracing::info;
use url::Url;

use applypilot_core_types::{ApplicationConfig, ApplicationOutcome, AtsIdentity, JobPosting};
use applypilot_mapper::FieldMapper;
use applypilot_perceiver::detect_ats;
use applypilot_session::PagePort;

use crate::errors::FlowError;
use crate::pipeline;
use crate::policy::FlowPolicy;

/// Boards with their own application surface, routed by host or by the
/// posting's declared source.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KnownBoard {
    Indeed,
    LinkedIn,
    RemoteOk,
}

const BOARD_TABLE: &[(&str, KnownBoard)] = &[
    ("indeed", KnownBoard::Indeed),
    ("linkedin", KnownBoard::LinkedIn),
    ("remoteok", KnownBoard::RemoteOk),
];

/// Where an attempt is dispatched. Adding a platform means adding a
/// variant and a handler, not editing a conditional chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlatformRoute {
    Ats(AtsIdentity),
    Board(KnownBoard),
    Generic,
}

impl PlatformRoute {
    /// ATS domains outrank board routing: a lever.co link surfaced through
    /// LinkedIn is still a Lever application.
    pub fn resolve(url: &str, source: &str) -> Self {
        let ats = detect_ats(url);
        if ats.is_known() {
            return PlatformRoute::Ats(ats);
        }
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .unwrap_or_else(|| url.to_lowercase());
        let haystack = format!("{host} {}", source.to_lowercase());
        for (needle, board) in BOARD_TABLE {
            if haystack.contains(needle) {
                return PlatformRoute::Board(*board);
            }
        }
        PlatformRoute::Generic
    }
}

/// Everything a handler needs for one attempt, borrowed from the pipeline.
pub struct StageContext<'a> {
    pub page: &'a dyn PagePort,
    pub posting: &'a JobPosting,
    pub config: &'a ApplicationConfig,
    pub mapper: &'a dyn FieldMapper,
    pub policy: &'a FlowPolicy,
}

/// One platform's application strategy, built from the shared stages.
#[async_trait]
pub trait ApplyHandler: Send + Sync {
    async fn attempt(&self, cx: &StageContext<'_>) -> Result<ApplicationOutcome, FlowError>;
}

pub fn handler_for(route: &PlatformRoute) -> &'static dyn ApplyHandler {
    match route {
        PlatformRoute::Ats(_) => &AtsHandler,
        PlatformRoute::Board(_) => &BoardHandler,
        PlatformRoute::Generic => &GenericHandler,
    }
}

/// Unknown host: gate, then the full form flow, probing for an apply
/// affordance if the posting page carries no form itself.
pub struct GenericHandler;

#[async_trait]
impl ApplyHandler for GenericHandler {
    async fn attempt(&self, cx: &StageContext<'_>) -> Result<ApplicationOutcome, FlowError> {
        pipeline::wait_out_login(cx).await?;
        pipeline::form_flow(cx, true).await
    }
}

/// Known ATS host: the URL already is the application form, so no apply
/// probe. Several vendors put sign-in in front of the form, hence the gate.
pub struct AtsHandler;

#[async_trait]
impl ApplyHandler for AtsHandler {
    async fn attempt(&self, cx: &StageContext<'_>) -> Result<ApplicationOutcome, FlowError> {
        info!(ats = ?detect_ats(&cx.posting.job_url), "ats application surface");
        pipeline::wait_out_login(cx).await?;
        pipeline::form_flow(cx, false).await
    }
}

/// Job board: the posting page fronts the form behind an apply affordance,
/// so probe for it eagerly before gating.
pub struct BoardHandler;

#[async_trait]
impl ApplyHandler for BoardHandler {
    async fn attempt(&self, cx: &StageContext<'_>) -> Result<ApplicationOutcome, FlowError> {
        pipeline::open_apply_form(cx).await?;
        pipeline::wait_out_login(cx).await?;
        pipeline::form_flow(cx, false).await
    }
}
