use std::collections::HashMap;

/// CSS selectors keyed by the role an element plays on the page.
#[derive(Debug, Clone)]
pub struct Selectors {
    pub loading_overlay: &'static str,
    pub scroll_progress: &'static str,
    pub header: &'static str,
    pub nav_links: &'static str,
    pub nav_cards: &'static str,
    /// The designated link inside a navigation card. Each card is expected
    /// to contain exactly one.
    pub card_link: &'static str,
}

#[derive(Debug, Clone)]
pub struct Timing {
    /// Delay before the loading overlay is dismissed once the page is ready.
    pub loading_dismiss_ms: u32,
    /// Delay between marking a card link as loading and navigating away.
    pub navigation_delay_ms: u32,
}

/// Static page configuration. Built once in `main` and shared as
/// `Rc<Config>`, so it stays read-only for the life of the page.
#[derive(Debug, Clone)]
pub struct Config {
    /// Section name -> fully-qualified destination URL.
    pub urls: HashMap<&'static str, &'static str>,
    /// Hostnames (and their subdomains) that card navigation may target.
    pub allowed_domains: Vec<&'static str>,
    /// Upper bound on any scheduled redirect delay.
    pub max_redirect_delay_ms: u32,
    pub selectors: Selectors,
    /// Data attribute on a card naming its target section.
    pub section_attr: &'static str,
    /// Class that marks an element as hidden.
    pub hidden_class: &'static str,
    pub timing: Timing,
}

impl Config {
    pub fn new() -> Self {
        Self {
            urls: HashMap::from([
                ("blog", "https://blog.helios.dev"),
                ("docs", "https://docs.helios.dev"),
                ("community", "https://community.helios.dev"),
                ("status", "https://status.helios.dev"),
            ]),
            allowed_domains: vec!["helios.dev"],
            max_redirect_delay_ms: 5_000,
            selectors: Selectors {
                loading_overlay: ".loading-overlay",
                scroll_progress: ".scroll-progress-bar",
                header: ".top-nav",
                nav_links: ".nav-link",
                nav_cards: ".nav-card",
                card_link: "a.card-link",
            },
            section_attr: "data-section",
            hidden_class: "hidden",
            timing: Timing {
                loading_dismiss_ms: 500,
                navigation_delay_ms: 300,
            },
        }
    }

    pub fn section_url(&self, section: &str) -> Option<&'static str> {
        self.urls.get(section).copied()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
