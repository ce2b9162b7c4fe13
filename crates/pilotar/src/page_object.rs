//! Page object contract.
//!
//! A page object binds locators and user-flow methods for one logical
//! screen. Page objects do not extend a driver wrapper; each one holds a
//! borrowed [`Page`] handle and implements this trait, so a page object
//! can never outlive the page it drives.

use std::collections::HashMap;

use crate::page::Page;

/// Trait implemented by every page object.
pub trait PageObject {
    /// The page handle this object drives.
    fn page(&self) -> &Page;

    /// URL pattern that matches this screen (e.g., `/login`, `/users/:id`)
    fn url_pattern(&self) -> &str;

    /// Check if the screen is ready for interaction
    fn is_loaded(&self) -> bool {
        true
    }

    /// How long to wait for the screen to load (in milliseconds)
    fn load_timeout_ms(&self) -> u64 {
        crate::wait::DEFAULT_TIMEOUT_MS
    }

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Whether the page's current URL path matches this object's pattern.
    fn at_page(&self) -> bool {
        UrlMatcher::new(self.url_pattern()).matches(url_path(self.page().current_url()))
    }
}

/// Extract the path component of a URL, without query or fragment.
#[must_use]
pub fn url_path(url: &str) -> &str {
    let after_scheme = url.find("://").map_or(url, |i| &url[i + 3..]);
    let path = after_scheme.find('/').map_or("/", |i| &after_scheme[i..]);
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// URL pattern matcher for page objects.
///
/// Patterns support literal segments (`/login`), wildcards (`/users/*`),
/// and named parameters (`/users/:id`).
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a URL path matches the pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let url_segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();

        // Wildcards and parameters each consume exactly one segment
        if url_segments.len() != self.segments.len() {
            return false;
        }

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                UrlSegment::Literal(lit) => {
                    if url_segments.get(i) != Some(&lit.as_str()) {
                        return false;
                    }
                }
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => {}
            }
        }

        true
    }

    /// Extract named parameters from a URL path
    #[must_use]
    pub fn extract_params(&self, url: &str) -> HashMap<String, String> {
        let mut params = HashMap::new();
        let url_segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();

        for (i, segment) in self.segments.iter().enumerate() {
            if let UrlSegment::Parameter(name) = segment {
                if let Some(value) = url_segments.get(i) {
                    let _ = params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        params
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
