use std::time::Duration;

/// Launch options for one attempt's browser context.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub headless: bool,
    pub window_size: (u32, u32),
    /// Ceiling for a single navigation, including redirects.
    pub nav_timeout: Duration,
    /// Explicit chromium binary; autodetected when `None`.
    pub executable: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1280, 900),
            nav_timeout: Duration::from_secs(30),
            executable: None,
        }
    }
}
