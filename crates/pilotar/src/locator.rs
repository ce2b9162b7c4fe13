//! Locator abstraction for element selection.
//!
//! A [`Selector`] names zero, one, or more DOM elements; a [`Locator`]
//! pairs a selector with an optional per-operation timeout override.
//! Selectors compile to JavaScript lookup expressions executed in the
//! page, which keeps the element query strategy in one place.

use std::fmt;
use std::time::Duration;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., `button.primary`)
    Css(String),
    /// Text content selector
    Text(String),
    /// Test ID selector (`data-testid` attribute)
    TestId(String),
    /// CSS selector filtered by text content
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Convert to a JavaScript expression evaluating to the first
    /// matching element, or `null`.
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({s:?})"),
            Self::Text(t) => {
                format!("Array.from(document.querySelectorAll('*')).find(el => el.textContent.includes({t:?}))")
            }
            Self::TestId(id) => format!("document.querySelector('[data-testid={id:?}]')"),
            Self::CssWithText { css, text } => {
                format!("Array.from(document.querySelectorAll({css:?})).find(el => el.textContent.includes({text:?}))")
            }
        }
    }

    /// Convert to a JavaScript expression evaluating to `true` only when
    /// the first match exists and is rendered visible.
    #[must_use]
    pub fn to_visibility_query(&self) -> String {
        format!(
            "(() => {{ const el = {query}; if (!el) return false; \
             const style = window.getComputedStyle(el); \
             return el.getClientRects().length > 0 \
             && style.visibility !== 'hidden' && style.display !== 'none'; }})()",
            query = self.to_query()
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "{s}"),
            Self::Text(t) => write!(f, "text={t}"),
            Self::TestId(id) => write!(f, "data-testid={id}"),
            Self::CssWithText { css, text } => write!(f, "{css} >> text={text}"),
        }
    }
}

/// A locator for finding and interacting with elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    timeout: Option<Duration>,
}

impl Locator {
    /// Create a new locator from a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: Selector::Css(selector.into()),
            timeout: None,
        }
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            timeout: None,
        }
    }

    /// Filter a CSS locator by text content
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let selector = match self.selector {
            Selector::Css(css) => Selector::CssWithText {
                css,
                text: text.into(),
            },
            other => other,
        };
        Self {
            selector,
            timeout: self.timeout,
        }
    }

    /// Override the default timeout for operations on this locator
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the timeout override, if any
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.selector.fmt(f)
    }
}
