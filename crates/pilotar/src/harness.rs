//! Scenario suite execution.
//!
//! A [`Scenario`] is one test case: a named async flow over a page,
//! categorised by a [`Marker`]. A [`Suite`] runs its scenarios strictly
//! sequentially, provisioning a fresh [`TestSession`] for each one and
//! tearing it down whatever the body did.

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::fixture::{SessionContext, TestSession};
use crate::page::Page;
use crate::result::{PilotarError, PilotarResult};

/// Test categorisation marker, usable as a run filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    /// Fast, critical-path coverage
    Smoke,
    /// Broader coverage run less often
    Regression,
}

impl Marker {
    /// The marker name as used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smoke => "smoke",
            Self::Regression => "regression",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Marker {
    type Err = PilotarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smoke" => Ok(Self::Smoke),
            "regression" => Ok(Self::Regression),
            other => Err(PilotarError::invalid_state(format!(
                "unknown marker: {other} (expected smoke or regression)"
            ))),
        }
    }
}

/// Future returned by a scenario body.
pub type ScenarioFuture<'a> = Pin<Box<dyn Future<Output = PilotarResult<()>> + 'a>>;

/// Function signature of a scenario body.
pub type ScenarioFn =
    for<'a> fn(&'a SessionContext, &'a mut Page) -> ScenarioFuture<'a>;

/// A single test case
#[derive(Clone)]
pub struct Scenario {
    /// Scenario name
    pub name: &'static str,
    /// Categorisation marker
    pub marker: Marker,
    /// Scenario body
    pub run: ScenarioFn,
}

impl Scenario {
    /// Create a new scenario
    #[must_use]
    pub const fn new(name: &'static str, marker: Marker, run: ScenarioFn) -> Self {
        Self { name, marker, run }
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("marker", &self.marker)
            .finish()
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// Categorisation marker
    pub marker: Marker,
    /// Whether the scenario passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

/// Results from running a suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite: String,
    /// Individual scenario results
    pub results: Vec<ScenarioResult>,
    /// Total wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl SuiteResults {
    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }
}

/// An ordered collection of scenarios
#[derive(Debug, Clone)]
pub struct Suite {
    name: String,
    scenarios: Vec<Scenario>,
}

impl Suite {
    /// Create an empty suite
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenarios: Vec::new(),
        }
    }

    /// Suite name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a scenario
    #[must_use]
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Registered scenarios, in run order
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Number of scenarios
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Whether the suite is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Keep only scenarios matching the marker and the name substring.
    #[must_use]
    pub fn filtered(mut self, marker: Option<Marker>, name_filter: Option<&str>) -> Self {
        self.scenarios.retain(|s| {
            marker.map_or(true, |m| s.marker == m)
                && name_filter.map_or(true, |f| s.name.contains(f))
        });
        self
    }

    /// Run every scenario sequentially, one fresh session each.
    ///
    /// A body error fails the scenario; teardown still runs. A teardown
    /// error fails an otherwise-green scenario.
    pub async fn run(&self, ctx: &SessionContext, screenshots_dir: &Path) -> SuiteResults {
        let suite_start = Instant::now();
        let mut results = Vec::with_capacity(self.scenarios.len());

        info!(suite = %self.name, count = self.scenarios.len(), "running suite");

        for scenario in &self.scenarios {
            info!(name = scenario.name, marker = %scenario.marker, "running scenario");
            let start = Instant::now();

            let mut session =
                TestSession::new(screenshots_dir).with_test_name(scenario.name);

            let body = match session.start(ctx).await {
                Ok(()) => match session.page_mut() {
                    Ok(page) => (scenario.run)(ctx, page).await,
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            };
            let teardown = session.finish().await;

            let outcome = match (body, teardown) {
                (Ok(()), Ok(())) => Ok(()),
                (Err(e), _) | (Ok(()), Err(e)) => Err(e),
            };

            let duration_ms = start.elapsed().as_millis() as u64;
            match &outcome {
                Ok(()) => info!(name = scenario.name, duration_ms, "scenario passed"),
                Err(e) => error!(name = scenario.name, duration_ms, error = %e, "scenario failed"),
            }

            results.push(ScenarioResult {
                name: scenario.name.to_string(),
                marker: scenario.marker,
                passed: outcome.is_ok(),
                error: outcome.err().map(|e| e.to_string()),
                duration_ms,
            });
        }

        SuiteResults {
            suite: self.name.clone(),
            results,
            duration_ms: suite_start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn noop<'a>(_ctx: &'a SessionContext, _page: &'a mut Page) -> ScenarioFuture<'a> {
        Box::pin(async { Ok(()) })
    }

    fn sample_suite() -> Suite {
        Suite::new("sample")
            .with_scenario(Scenario::new("successful_login", Marker::Smoke, noop))
            .with_scenario(Scenario::new("signup_link", Marker::Regression, noop))
            .with_scenario(Scenario::new("invalid_credentials", Marker::Smoke, noop))
    }

    mod marker_tests {
        use super::*;

        #[test]
        fn test_parse_round_trip() {
            assert_eq!("smoke".parse::<Marker>().unwrap(), Marker::Smoke);
            assert_eq!("REGRESSION".parse::<Marker>().unwrap(), Marker::Regression);
            assert!("flaky".parse::<Marker>().is_err());
            assert_eq!(Marker::Smoke.to_string(), "smoke");
        }

        #[test]
        fn test_serializes_lowercase() {
            assert_eq!(
                serde_json::to_string(&Marker::Regression).unwrap(),
                "\"regression\""
            );
        }
    }

    mod filter_tests {
        use super::*;

        #[test]
        fn test_marker_filter() {
            let suite = sample_suite().filtered(Some(Marker::Smoke), None);
            assert_eq!(suite.len(), 2);
            assert!(suite.scenarios().iter().all(|s| s.marker == Marker::Smoke));
        }

        #[test]
        fn test_name_filter() {
            let suite = sample_suite().filtered(None, Some("login"));
            assert_eq!(suite.len(), 1);
            assert_eq!(suite.scenarios()[0].name, "successful_login");
        }

        #[test]
        fn test_no_filter_keeps_everything() {
            assert_eq!(sample_suite().filtered(None, None).len(), 3);
        }
    }

    mod results_tests {
        use super::*;

        fn result(name: &str, passed: bool) -> ScenarioResult {
            ScenarioResult {
                name: name.to_string(),
                marker: Marker::Smoke,
                passed,
                error: (!passed).then(|| "boom".to_string()),
                duration_ms: 1,
            }
        }

        #[test]
        fn test_counters() {
            let results = SuiteResults {
                suite: "sample".to_string(),
                results: vec![result("a", true), result("b", false), result("c", true)],
                duration_ms: 3,
            };
            assert!(!results.all_passed());
            assert_eq!(results.passed_count(), 2);
            assert_eq!(results.failed_count(), 1);
            assert_eq!(results.total(), 3);
            assert_eq!(results.failures()[0].name, "b");
        }
    }

    #[cfg(not(feature = "browser"))]
    mod run_tests {
        use super::*;
        use crate::result::PilotarError;
        use std::fs;
        use tempfile::TempDir;

        fn context(dir: &TempDir) -> SessionContext {
            fs::write(dir.path().join("env.yaml"), "staging: {}\n").unwrap();
            fs::write(dir.path().join("credentials.yaml"), "test_users: {}\n").unwrap();
            fs::write(dir.path().join("tenants.yaml"), "{}\n").unwrap();
            SessionContext::load(dir.path(), "staging").unwrap()
        }

        fn check_url<'a>(_ctx: &'a SessionContext, page: &'a mut Page) -> ScenarioFuture<'a> {
            Box::pin(async move {
                page.navigate("/login").await?;
                if page.current_url().ends_with("/login") {
                    Ok(())
                } else {
                    Err(PilotarError::assertion("unexpected url"))
                }
            })
        }

        fn failing<'a>(_ctx: &'a SessionContext, _page: &'a mut Page) -> ScenarioFuture<'a> {
            Box::pin(async { Err(PilotarError::assertion("expected failure")) })
        }

        #[tokio::test]
        async fn test_run_isolates_sessions_and_records_results() {
            let config_dir = TempDir::new().unwrap();
            let shots_dir = TempDir::new().unwrap();
            let ctx = context(&config_dir);

            let suite = Suite::new("login")
                .with_scenario(Scenario::new("check_url", Marker::Smoke, check_url))
                .with_scenario(Scenario::new("failing", Marker::Smoke, failing));

            let results = suite.run(&ctx, shots_dir.path()).await;
            assert_eq!(results.total(), 2);
            assert_eq!(results.passed_count(), 1);
            assert_eq!(results.failed_count(), 1);
            assert!(results.failures()[0].error.as_deref().unwrap().contains("expected failure"));

            // One teardown screenshot per scenario, pass or fail
            assert_eq!(fs::read_dir(shots_dir.path()).unwrap().count(), 2);
        }
    }
}
