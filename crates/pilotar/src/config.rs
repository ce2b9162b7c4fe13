//! Layered YAML configuration: environment settings, credentials, tenants.
//!
//! Three documents live in a config directory: `env.yaml`,
//! `credentials.yaml`, `tenants.yaml`. The loader performs no schema
//! validation; documents are kept as raw YAML values and read through
//! defaulting accessors. Results are not cached here, so repeated calls
//! re-read from disk. Callers cache through [`crate::SessionContext`].

use serde_yaml_ng::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::result::{PilotarError, PilotarResult};

/// Environment settings file name
pub const ENV_FILE: &str = "env.yaml";
/// Credentials file name
pub const CREDENTIALS_FILE: &str = "credentials.yaml";
/// Tenant definitions file name
pub const TENANTS_FILE: &str = "tenants.yaml";

/// Base URL used when `env.yaml` does not provide one
pub const DEFAULT_BASE_URL: &str = "https://staging.workflowpro.com";

/// Reads the three configuration documents from a directory.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    dir: PathBuf,
}

impl ConfigLoader {
    /// Create a loader rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this loader reads from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load environment settings for the named environment.
    ///
    /// When the document's top level holds a mapping under `environment`,
    /// that subsection becomes the active config; a flat document applies
    /// to every environment as-is.
    ///
    /// # Errors
    ///
    /// `ConfigNotFound` when `env.yaml` is absent, `ConfigParseError`
    /// when it is not valid YAML.
    pub fn env_config(&self, environment: &str) -> PilotarResult<EnvConfig> {
        let doc = self.read_document(ENV_FILE)?;
        Ok(EnvConfig::from_document(doc, environment))
    }

    /// Load credentials.
    ///
    /// # Errors
    ///
    /// `ConfigNotFound` / `ConfigParseError` as for [`Self::env_config`].
    pub fn credentials(&self) -> PilotarResult<Credentials> {
        Ok(Credentials {
            doc: self.read_document(CREDENTIALS_FILE)?,
        })
    }

    /// Load tenant definitions.
    ///
    /// # Errors
    ///
    /// `ConfigNotFound` / `ConfigParseError` as for [`Self::env_config`].
    pub fn tenants(&self) -> PilotarResult<TenantSet> {
        Ok(TenantSet {
            doc: self.read_document(TENANTS_FILE)?,
        })
    }

    fn read_document(&self, file: &str) -> PilotarResult<Value> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Err(PilotarError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let raw = fs::read_to_string(&path)?;
        serde_yaml_ng::from_str(&raw).map_err(|e| PilotarError::ConfigParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Environment settings with defaulting accessors.
///
/// Keys are read defensively: a missing or mistyped key yields the
/// documented default rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    doc: Value,
}

impl EnvConfig {
    /// Build from a parsed document, selecting the environment subsection
    /// when one exists.
    #[must_use]
    pub fn from_document(doc: Value, environment: &str) -> Self {
        let doc = match doc.get(environment) {
            Some(section) if section.is_mapping() => section.clone(),
            _ => doc,
        };
        Self { doc }
    }

    /// Browser engine name (default `"chromium"`).
    #[must_use]
    pub fn engine(&self) -> &str {
        self.doc
            .get("browser")
            .and_then(Value::as_str)
            .unwrap_or("chromium")
    }

    /// Headless flag (default `false`).
    #[must_use]
    pub fn headless(&self) -> bool {
        self.doc
            .get("headless")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Viewport width in pixels (default 1920).
    #[must_use]
    pub fn viewport_width(&self) -> u32 {
        self.doc
            .get("viewport_width")
            .and_then(Value::as_u64)
            .map_or(1920, |v| v as u32)
    }

    /// Viewport height in pixels (default 1080).
    #[must_use]
    pub fn viewport_height(&self) -> u32 {
        self.doc
            .get("viewport_height")
            .and_then(Value::as_u64)
            .map_or(1080, |v| v as u32)
    }

    /// Default interaction timeout in milliseconds (default 30000).
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.doc
            .get("timeout")
            .and_then(Value::as_u64)
            .unwrap_or(crate::wait::DEFAULT_TIMEOUT_MS)
    }

    /// Application base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.doc
            .get("base_url")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_BASE_URL)
    }

    /// Raw access for keys without a dedicated accessor.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.doc.get(key)
    }
}

/// An email/password pair for a seeded account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Login email
    pub email: String,
    /// Login password
    pub password: String,
}

/// Credentials mapping logical user roles to email/password pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    doc: Value,
}

impl Credentials {
    /// Look up the credential for a role under `test_users`.
    #[must_use]
    pub fn user(&self, role: &str) -> Option<Credential> {
        let entry = self.doc.get("test_users")?.get(role)?;
        Some(Credential {
            email: entry.get("email")?.as_str()?.to_string(),
            password: entry.get("password")?.as_str()?.to_string(),
        })
    }

    /// All roles defined under `test_users`.
    #[must_use]
    pub fn roles(&self) -> Vec<&str> {
        self.doc
            .get("test_users")
            .and_then(Value::as_mapping)
            .map(|m| m.keys().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Tenant identifiers mapped to tenant-specific settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TenantSet {
    doc: Value,
}

impl TenantSet {
    /// Settings mapping for one tenant.
    #[must_use]
    pub fn tenant(&self, id: &str) -> Option<&Value> {
        self.doc.get(id)
    }

    /// A single setting for one tenant.
    #[must_use]
    pub fn setting(&self, id: &str, key: &str) -> Option<&Value> {
        self.tenant(id)?.get(key)
    }

    /// All tenant identifiers.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.doc
            .as_mapping()
            .map(|m| m.keys().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_dir(env: &str, credentials: &str, tenants: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(ENV_FILE), env).unwrap();
        fs::write(dir.path().join(CREDENTIALS_FILE), credentials).unwrap();
        fs::write(dir.path().join(TENANTS_FILE), tenants).unwrap();
        dir
    }

    const ENV_YAML: &str = "\
staging:
  browser: chromium
  headless: true
  viewport_width: 1280
  viewport_height: 720
  timeout: 15000
  base_url: https://staging.example.com
production:
  base_url: https://app.example.com
";

    const CREDENTIALS_YAML: &str = "\
test_users:
  admin:
    email: admin@x.com
    password: Secret1
  member:
    email: member@x.com
    password: Secret2
";

    const TENANTS_YAML: &str = "\
acme:
  name: Acme Corporation
  plan: enterprise
globex:
  name: Globex
  plan: starter
";

    mod loader_tests {
        use super::*;

        #[test]
        fn test_missing_file_is_config_not_found() {
            let dir = TempDir::new().unwrap();
            let loader = ConfigLoader::new(dir.path());
            let err = loader.env_config("staging").unwrap_err();
            assert!(matches!(err, PilotarError::ConfigNotFound { .. }));
        }

        #[test]
        fn test_malformed_yaml_is_parse_error() {
            let dir = config_dir("browser: [unclosed", "{}", "{}");
            let loader = ConfigLoader::new(dir.path());
            let err = loader.env_config("staging").unwrap_err();
            assert!(matches!(err, PilotarError::ConfigParseError { .. }));
        }

        #[test]
        fn test_repeated_loads_are_identical() {
            let dir = config_dir(ENV_YAML, CREDENTIALS_YAML, TENANTS_YAML);
            let loader = ConfigLoader::new(dir.path());
            assert_eq!(
                loader.env_config("staging").unwrap(),
                loader.env_config("staging").unwrap()
            );
            assert_eq!(
                loader.credentials().unwrap(),
                loader.credentials().unwrap()
            );
            assert_eq!(loader.tenants().unwrap(), loader.tenants().unwrap());
        }
    }

    mod env_config_tests {
        use super::*;

        #[test]
        fn test_environment_section_selected() {
            let dir = config_dir(ENV_YAML, CREDENTIALS_YAML, TENANTS_YAML);
            let loader = ConfigLoader::new(dir.path());
            let env = loader.env_config("staging").unwrap();

            assert_eq!(env.engine(), "chromium");
            assert!(env.headless());
            assert_eq!(env.viewport_width(), 1280);
            assert_eq!(env.viewport_height(), 720);
            assert_eq!(env.timeout_ms(), 15_000);
            assert_eq!(env.base_url(), "https://staging.example.com");
        }

        #[test]
        fn test_unknown_environment_falls_back_to_whole_document() {
            let dir = config_dir("base_url: https://flat.example.com\n", "{}", "{}");
            let loader = ConfigLoader::new(dir.path());
            let env = loader.env_config("staging").unwrap();
            assert_eq!(env.base_url(), "https://flat.example.com");
        }

        #[test]
        fn test_missing_keys_use_defaults() {
            let dir = config_dir("staging: {}\n", "{}", "{}");
            let loader = ConfigLoader::new(dir.path());
            let env = loader.env_config("staging").unwrap();

            assert_eq!(env.engine(), "chromium");
            assert!(!env.headless());
            assert_eq!(env.viewport_width(), 1920);
            assert_eq!(env.viewport_height(), 1080);
            assert_eq!(env.timeout_ms(), 30_000);
            assert_eq!(env.base_url(), DEFAULT_BASE_URL);
        }

        #[test]
        fn test_per_environment_override() {
            let dir = config_dir(ENV_YAML, CREDENTIALS_YAML, TENANTS_YAML);
            let loader = ConfigLoader::new(dir.path());
            let prod = loader.env_config("production").unwrap();
            assert_eq!(prod.base_url(), "https://app.example.com");
        }
    }

    mod credentials_tests {
        use super::*;

        #[test]
        fn test_user_lookup() {
            let dir = config_dir(ENV_YAML, CREDENTIALS_YAML, TENANTS_YAML);
            let creds = ConfigLoader::new(dir.path()).credentials().unwrap();

            let admin = creds.user("admin").unwrap();
            assert_eq!(admin.email, "admin@x.com");
            assert_eq!(admin.password, "Secret1");
            assert!(creds.user("nonexistent").is_none());
        }

        #[test]
        fn test_roles() {
            let dir = config_dir(ENV_YAML, CREDENTIALS_YAML, TENANTS_YAML);
            let creds = ConfigLoader::new(dir.path()).credentials().unwrap();
            let roles = creds.roles();
            assert!(roles.contains(&"admin"));
            assert!(roles.contains(&"member"));
        }
    }

    mod tenant_tests {
        use super::*;

        #[test]
        fn test_tenant_lookup() {
            let dir = config_dir(ENV_YAML, CREDENTIALS_YAML, TENANTS_YAML);
            let tenants = ConfigLoader::new(dir.path()).tenants().unwrap();

            assert_eq!(
                tenants.setting("acme", "plan").and_then(Value::as_str),
                Some("enterprise")
            );
            assert!(tenants.tenant("missing").is_none());
            assert_eq!(tenants.ids().len(), 2);
        }
    }
}
