use applypilot_core_types::AtsIdentity;
use url::Url;

/// Domain table for known ATS vendors. Order is fixed; the first hit wins,
/// so identical URLs always yield identical identities.
const ATS_DOMAINS: &[(&str, AtsIdentity)] = &[
    ("smartrecruiters.com", AtsIdentity::SmartRecruiters),
    ("greenhouse.io", AtsIdentity::Greenhouse),
    ("lever.co", AtsIdentity::Lever),
    ("myworkdayjobs.com", AtsIdentity::Workday),
    ("workday.com", AtsIdentity::Workday),
    ("taleo.net", AtsIdentity::Taleo),
    ("jobvite.com", AtsIdentity::Jobvite),
    ("icims.com", AtsIdentity::Icims),
    ("bamboohr.com", AtsIdentity::BambooHr),
];

/// Map a URL to a known ATS identity purely from its domain. No network
/// call, no page inspection: this has to work the instant a click or
/// redirect lands on a third-party domain.
pub fn detect_ats(url: &str) -> AtsIdentity {
    let host = match Url::parse(url) {
        Ok(parsed) => parsed.host_str().unwrap_or_default().to_lowercase(),
        // Relative or malformed input: fall back to matching the raw string.
        Err(_) => url.to_lowercase(),
    };
    for (domain, identity) in ATS_DOMAINS {
        if host == *domain || host.ends_with(&format!(".{domain}")) || host.contains(domain) {
            return *identity;
        }
    }
    AtsIdentity::None
}
