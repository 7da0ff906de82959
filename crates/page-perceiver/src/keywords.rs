//! Shared phrase and selector tables.
//!
//! Third-party pages are untrusted, unstable markup; everything here is a
//! heuristic signal, never a guarantee.

use once_cell::sync::Lazy;
use regex::Regex;

/// Selectors that look like one job card in a results list.
pub const JOB_CARD_SELECTOR: &str = "[class*=\"job-card\"], [class*=\"jobCard\"], \
     [class*=\"job_listing\"], [data-testid*=\"job-card\"], li.result, article.job, div.job-row";

/// Pagination affordances.
pub const PAGINATION_SELECTOR: &str =
    ".pagination, [class*=\"pagination\"], nav[aria-label*=\"agination\"], ul.pager, a[rel=\"next\"]";

pub const LOGIN_PHRASES: &[&str] = &[
    "sign in",
    "log in",
    "login to",
    "create an account",
    "create account",
    "sign up to apply",
];

pub const SUCCESS_PHRASES: &[&str] = &[
    "thank you",
    "application submitted",
    "successfully applied",
    "application received",
    "we received your application",
    "confirmation",
];

pub const ERROR_PHRASES: &[&str] = &["error", "required field", "please fill"];

pub const NEXT_WORDS: &[&str] = &["next", "continue", "proceed"];

pub const SUBMIT_WORDS: &[&str] = &["submit", "apply", "send"];

pub const CANCEL_WORDS: &[&str] = &["cancel", "back", "previous", "discard"];

/// Anti-bot interstitials and not-yet-rendered shells.
pub const INTERSTITIAL_PHRASES: &[&str] = &[
    "just a moment",
    "checking your browser",
    "verify you are human",
    "enable javascript and cookies",
];

/// "1,234 jobs found" / "12 jobs" style listing banners.
pub static JOBS_FOUND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b[\d,]+\s+jobs?\b(\s+found)?").expect("static regex"));

/// True when any phrase from the table occurs in the (lowercased) text.
pub fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase))
}
