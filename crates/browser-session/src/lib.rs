//! Per-attempt browser session management.
//!
//! One `CdpPageSession` is acquired per application attempt and released
//! unconditionally on every exit path. The rest of the agent never touches
//! chromiumoxide directly; it works against the [`PagePort`] trait so tests
//! can substitute an in-memory page.

mod config;
mod errors;
mod js;
mod port;
mod session;

pub use config::SessionConfig;
pub use errors::SessionError;
pub use port::{ButtonDescriptor, PagePort};
pub use session::CdpPageSession;
