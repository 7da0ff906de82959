use std::time::Duration;

use tracing::debug;
use url::Url;

use applypilot_session::PagePort;

use crate::errors::PerceiverError;
use crate::keywords::{
    contains_any, INTERSTITIAL_PHRASES, JOBS_FOUND_RE, JOB_CARD_SELECTOR, PAGINATION_SELECTOR,
};

/// Verdict on what the loaded page is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageClass {
    IndividualPosting,
    SearchResults,
}

#[derive(Clone, Debug)]
pub struct ClassifierPolicy {
    /// More matches than this is a listing signal.
    pub card_threshold: usize,
    /// Interval between render polls.
    pub settle_interval: Duration,
    /// Bounded attempt count for the render poll.
    pub max_settle_polls: u32,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            card_threshold: 3,
            settle_interval: Duration::from_millis(1500),
            max_settle_polls: 4,
        }
    }
}

/// Distinguishes an individual job posting from a search-results/listing
/// page using structural and textual signals.
pub struct PageClassifier {
    policy: ClassifierPolicy,
}

impl PageClassifier {
    pub fn new(policy: ClassifierPolicy) -> Self {
        Self { policy }
    }

    pub async fn classify(&self, page: &dyn PagePort) -> Result<PageClass, PerceiverError> {
        self.wait_for_render(page).await?;

        let url = page.current_url().await?;
        let body = page.body_text().await?.to_lowercase();
        let cards = page.count_matching(JOB_CARD_SELECTOR).await?;
        let pagination = page.count_matching(PAGINATION_SELECTOR).await? > 0;
        let listing_phrases =
            body.contains("search results") || JOBS_FOUND_RE.is_match(&body);
        let url_listing_shape = url_has_listing_shape(&url);

        debug!(cards, pagination, listing_phrases, url_listing_shape, %url, "classifier signals");

        // RemoteOK's individual-posting URLs also contain "/jobs/", so the
        // card-count signal alone is not trustworthy there: require cards
        // AND pagination jointly.
        if is_bulk_listing_board(&url) {
            return Ok(if cards > self.policy.card_threshold && pagination {
                PageClass::SearchResults
            } else {
                PageClass::IndividualPosting
            });
        }

        let listing = cards > self.policy.card_threshold
            || listing_phrases
            || (pagination && url_listing_shape);
        Ok(if listing {
            PageClass::SearchResults
        } else {
            PageClass::IndividualPosting
        })
    }

    /// Pages reporting an empty/placeholder title or anti-bot interstitial
    /// text have not finished rendering; poll a fixed number of times
    /// before classifying.
    async fn wait_for_render(&self, page: &dyn PagePort) -> Result<(), PerceiverError> {
        for _ in 0..self.policy.max_settle_polls {
            if page_rendered(page).await? {
                return Ok(());
            }
            page.settle(self.policy.settle_interval).await?;
        }
        // Classify whatever is there; a blank page will land in the
        // individual-posting path and fail later with a clearer status.
        if !page_rendered(page).await? {
            debug!(polls = self.policy.max_settle_polls, "page still settling, classifying anyway");
        }
        Ok(())
    }
}

impl Default for PageClassifier {
    fn default() -> Self {
        Self::new(ClassifierPolicy::default())
    }
}

async fn page_rendered(page: &dyn PagePort) -> Result<bool, PerceiverError> {
    let title = page.title().await?;
    let trimmed = title.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("loading") || trimmed == "..." {
        return Ok(false);
    }
    let body = page.body_text().await?.to_lowercase();
    Ok(!contains_any(&body, INTERSTITIAL_PHRASES))
}

/// `/jobs/` (plural, listing) vs `/job/` (singular, posting), plus obvious
/// search-page query markers.
fn url_has_listing_shape(url: &str) -> bool {
    let (path, query) = match Url::parse(url) {
        Ok(parsed) => (
            parsed.path().to_lowercase(),
            parsed.query().unwrap_or_default().to_lowercase(),
        ),
        Err(_) => (url.to_lowercase(), String::new()),
    };
    if path.contains("/job/") {
        return false;
    }
    path.contains("/jobs") || path.contains("/search") || query.contains("page=") || query.contains("q=")
}

fn is_bulk_listing_board(url: &str) -> bool {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_default();
    host.contains("remoteok")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testpage::StubPage;
    use std::collections::HashMap;

    fn remoteok_page(cards: usize, pagination: usize, url: &str) -> StubPage {
        let mut counts = HashMap::new();
        counts.insert(JOB_CARD_SELECTOR.to_string(), cards);
        counts.insert(PAGINATION_SELECTOR.to_string(), pagination);
        StubPage {
            url: url.into(),
            title: "Remote Backend Engineer".into(),
            body: "Work from anywhere.".into(),
            counts,
            ..StubPage::default()
        }
    }

    #[tokio::test]
    async fn test_remoteok_posting_with_many_cards_stays_individual() {
        // Card count alone must not tip the verdict on this board.
        let page = remoteok_page(6, 0, "https://remoteok.com/remote-jobs/123-backend");
        let class = PageClassifier::default().classify(&page).await.unwrap();
        assert_eq!(class, PageClass::IndividualPosting);
    }

    #[tokio::test]
    async fn test_remoteok_cards_and_pagination_is_listing() {
        let page = remoteok_page(6, 1, "https://remoteok.com/remote-dev-jobs");
        let class = PageClassifier::default().classify(&page).await.unwrap();
        assert_eq!(class, PageClass::SearchResults);
    }

    #[tokio::test]
    async fn test_generic_host_card_count_alone_is_listing() {
        let mut counts = HashMap::new();
        counts.insert(JOB_CARD_SELECTOR.to_string(), 6);
        let page = StubPage {
            url: "https://jobs.example.test/openings".into(),
            title: "Openings".into(),
            body: "Browse our openings.".into(),
            counts,
            ..StubPage::default()
        };
        let class = PageClassifier::default().classify(&page).await.unwrap();
        assert_eq!(class, PageClass::SearchResults);
    }

    #[test]
    fn test_url_listing_shape() {
        assert!(url_has_listing_shape("https://x.test/jobs?q=rust&page=2"));
        assert!(url_has_listing_shape("https://x.test/search?q=rust"));
        assert!(!url_has_listing_shape("https://x.test/job/backend-engineer-42"));
        assert!(!url_has_listing_shape("https://x.test/careers/openings/42"));
    }

    #[test]
    fn test_bulk_listing_board_detection() {
        assert!(is_bulk_listing_board("https://remoteok.com/remote-jobs/12345-backend"));
        assert!(!is_bulk_listing_board("https://boards.example-ats.io/co/jobs?page=2"));
    }
}
