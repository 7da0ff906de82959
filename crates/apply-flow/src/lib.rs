//! Application flow: the per-posting state machine and the batch driver.
//!
//! A posting goes URL -> classify -> route -> gate -> extract -> map ->
//! fill -> wizard steps -> submit -> verify, and every path out of that
//! chain terminates in exactly one `ApplicationOutcome`.

mod batch;
mod errors;
mod filler;
mod pipeline;
mod policy;
mod route;
mod steps;
mod store;
mod submit;

pub mod testutil;

pub use batch::{BatchRunner, SessionFactory};
pub use errors::FlowError;
pub use filler::{FillPolicy, FillReport, FormFiller};
pub use pipeline::ApplyPipeline;
pub use policy::FlowPolicy;
pub use route::{handler_for, ApplyHandler, KnownBoard, PlatformRoute, StageContext};
pub use steps::find_next_control;
pub use store::{MemoryOutcomeStore, OutcomeStore};
pub use submit::{find_submit_control, verify_success, Verdict};
