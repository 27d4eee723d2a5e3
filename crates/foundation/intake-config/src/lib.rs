//! Intake wizard configuration.
//!
//! Resolution order, later layers winning:
//!
//! 1. built-in defaults and the embedded reference flow
//! 2. a YAML file (`--config`, else `<config dir>/intake/config.yaml` when present)
//! 3. `INTAKE_ENDPOINT_URL` / `INTAKE_REQUEST_TIMEOUT_SECS`
//! 4. explicit overrides from the caller (e.g. CLI flags)

use intake_core::{Registry, Step};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Embedded 15-step reference flow
pub const REFERENCE_FLOW: &str = include_str!("../assets/reference_flow.yaml");

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5678/webhook/user-registration";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TICK_RATE_MS: u64 = 33;

pub const ENV_ENDPOINT: &str = "INTAKE_ENDPOINT_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "INTAKE_REQUEST_TIMEOUT_SECS";

/// Result type for intake-config operations
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid endpoint URL {value:?}: {source}")]
    Url {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Endpoint must use http or https, got {0}")]
    Scheme(String),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Registry has {actual} steps but total_steps is {expected}")]
    StepCount { expected: usize, actual: usize },

    #[error(transparent)]
    Registry(#[from] intake_core::Error),
}

/// On-disk configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    endpoint: Option<String>,
    request_timeout_secs: Option<u64>,
    tick_rate_ms: Option<u64>,
    total_steps: Option<usize>,
    /// Relative paths resolve against the config file's directory
    registry_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    steps: Vec<Step>,
}

/// Resolved configuration for one wizard session
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub endpoint: Url,
    pub request_timeout: Duration,
    pub tick_rate: Duration,
    pub registry: Arc<Registry>,
}

impl IntakeConfig {
    /// Defaults with the embedded reference flow.
    pub fn reference() -> Result<Self> {
        Ok(Self {
            endpoint: parse_endpoint(DEFAULT_ENDPOINT)?,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            tick_rate: Duration::from_millis(DEFAULT_TICK_RATE_MS),
            registry: Arc::new(reference_registry()?),
        })
    }

    /// `<config dir>/intake/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("intake").join("config.yaml"))
    }

    /// Load from `path` (or the default location if it exists) and the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    pub fn load_with_env(path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::reference()?;

        let path = path
            .map(Path::to_path_buf)
            .or_else(|| Self::default_path().filter(|p| p.exists()));

        if let Some(path) = path {
            tracing::info!(path = %path.display(), "loading configuration");
            let raw = read(&path)?;
            let file: ConfigFile = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
                origin: path.display().to_string(),
                source,
            })?;
            config.apply_file(file, path.parent().unwrap_or_else(|| Path::new(".")))?;
        }

        config.apply_env(env)?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile, base_dir: &Path) -> Result<()> {
        if let Some(endpoint) = file.endpoint {
            self.endpoint = parse_endpoint(&endpoint)?;
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(non_zero("request_timeout_secs", secs)?);
        }
        if let Some(ms) = file.tick_rate_ms {
            self.tick_rate = Duration::from_millis(non_zero("tick_rate_ms", ms)?);
        }
        if let Some(registry_path) = file.registry_path {
            let registry_path = if registry_path.is_relative() {
                base_dir.join(registry_path)
            } else {
                registry_path
            };
            let raw = read(&registry_path)?;
            self.registry = Arc::new(parse_registry(&raw, &registry_path.display().to_string())?);
        }
        if let Some(expected) = file.total_steps {
            let actual = self.registry.len();
            if expected != actual {
                return Err(ConfigError::StepCount { expected, actual });
            }
        }
        Ok(())
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(endpoint) = env(ENV_ENDPOINT).filter(|v| !v.is_empty()) {
            self.endpoint = parse_endpoint(&endpoint)?;
        }
        if let Some(raw) = env(ENV_REQUEST_TIMEOUT).filter(|v| !v.is_empty()) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_REQUEST_TIMEOUT.to_string(),
                    value: raw.clone(),
                })?;
            self.request_timeout = Duration::from_secs(secs);
        }
        Ok(())
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }

    /// Total step count N.
    pub fn total_steps(&self) -> usize {
        self.registry.len()
    }
}

/// Parse and validate a registry document (`steps: [...]`).
pub fn parse_registry(yaml: &str, origin: &str) -> Result<Registry> {
    let file: RegistryFile = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Yaml {
        origin: origin.to_string(),
        source,
    })?;
    Ok(Registry::new(file.steps)?)
}

pub fn reference_registry() -> Result<Registry> {
    parse_registry(REFERENCE_FLOW, "reference flow")
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::Url {
        value: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Scheme(other.to_string())),
    }
}

fn non_zero(key: &str, value: u64) -> Result<u64> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::{FieldKind, StepRule};
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_reference_registry_has_fifteen_steps() {
        let registry = reference_registry().expect("reference flow");
        assert_eq!(registry.len(), 15);

        let domains = registry.step(13).unwrap();
        assert_eq!(
            domains.rule,
            Some(StepRule::AtLeastOne {
                field: "domains".into()
            })
        );
        assert_eq!(domains.fields[0].kind, FieldKind::MultiChoice);
        assert_eq!(domains.fields[0].choices.len(), 7);

        assert_eq!(registry.step(1).unwrap().fields[0].kind, FieldKind::Email);
        assert_eq!(registry.step(10).unwrap().fields[0].kind, FieldKind::Number);
        assert_eq!(registry.step(11).unwrap().fields[0].kind, FieldKind::File);
    }

    #[test]
    fn test_reference_defaults() {
        let config = IntakeConfig::reference().expect("config");
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.total_steps(), 15);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "endpoint: https://hooks.example.com/intake").unwrap();
        writeln!(file, "request_timeout_secs: 5").unwrap();
        writeln!(file, "total_steps: 15").unwrap();

        let config = IntakeConfig::load_with_env(Some(&path), no_env).expect("config");
        assert_eq!(config.endpoint.as_str(), "https://hooks.example.com/intake");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_relative_registry_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("flow.yaml"),
            "steps:\n  - title: Email\n    fields:\n      - { name: email, kind: email, required: true }\n",
        )
        .unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "registry_path: flow.yaml\ntotal_steps: 1\n").unwrap();

        let config = IntakeConfig::load_with_env(Some(&path), no_env).expect("config");
        assert_eq!(config.total_steps(), 1);
    }

    #[test]
    fn test_step_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "total_steps: 12\n").unwrap();

        let err = IntakeConfig::load_with_env(Some(&path), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::StepCount { expected: 12, actual: 15 }));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "endpont: https://typo.example.com\n").unwrap();

        let err = IntakeConfig::load_with_env(Some(&path), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "endpoint: https://file.example.com/hook\n").unwrap();

        let env = |key: &str| match key {
            ENV_ENDPOINT => Some("https://env.example.com/hook".to_string()),
            ENV_REQUEST_TIMEOUT => Some("12".to_string()),
            _ => None,
        };
        let config = IntakeConfig::load_with_env(Some(&path), env).expect("config");
        assert_eq!(config.endpoint.as_str(), "https://env.example.com/hook");
        assert_eq!(config.request_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_bad_env_timeout() {
        let env = |key: &str| (key == ENV_REQUEST_TIMEOUT).then(|| "soon".to_string());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "{}\n").unwrap();

        let err = IntakeConfig::load_with_env(Some(&path), env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_endpoint_scheme_checked() {
        let config = IntakeConfig::reference().unwrap();
        assert!(matches!(
            config.clone().with_endpoint("ftp://example.com/hook"),
            Err(ConfigError::Scheme(_))
        ));
        assert!(matches!(
            config.with_endpoint("not a url"),
            Err(ConfigError::Url { .. })
        ));
    }

    #[test]
    fn test_invalid_registry_surfaces_core_error() {
        let yaml = "steps:\n  - title: Domains\n    rule: { kind: at_least_one, field: missing }\n    fields:\n      - { name: location, kind: text }\n";
        let err = parse_registry(yaml, "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Registry(intake_core::Error::InvalidRule { .. })));
    }
}
