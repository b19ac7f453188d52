//! Server configuration.
//!
//! Loads configuration from an optional TOML file with support for
//! environment variable expansion in values. Variables use `$VAR` or
//! `${VAR}` syntax. Environment variables override file values, which
//! override the defaults.
//!
//! # Example Configuration
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! max_concurrent_jobs = 10
//! job_timeout_ms = "$JOB_RETENTION_MS"
//! expire_failed_jobs = false
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to configuration file (default: `config.toml`)
//! - `HOST` - Bind address (default: `127.0.0.1`, or `0.0.0.0` when
//!   `NODE_ENV` or `APP_ENV` is `production`)
//! - `PORT` - Port (default: `8080`)
//! - `MAX_CONCURRENT_JOBS` - Advisory job ceiling (default: `10`)
//! - `JOB_TIMEOUT_MS` - How long finished jobs stay pollable (default: `30000`)
//! - `EXPIRE_FAILED_JOBS` - Also expire failed jobs (default: `false`)

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use qrpay::job::{FailedJobPolicy, JobConfig};
use serde::{Deserialize, Serialize};

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file (after variable expansion) is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Resolved server configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerConfig {
    /// Bind address.
    pub host: IpAddr,
    /// Bind port. The next free port is tried if it is taken.
    pub port: u16,
    /// Advisory ceiling reported by `/availability`.
    pub max_concurrent_jobs: usize,
    /// Retention of finished jobs, in milliseconds.
    pub job_timeout_ms: u64,
    /// Whether failed jobs expire like completed ones.
    pub expire_failed_jobs: bool,
}

/// File layout; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    host: Option<IpAddr>,
    #[serde(deserialize_with = "lenient::option")]
    port: Option<u16>,
    #[serde(deserialize_with = "lenient::option")]
    max_concurrent_jobs: Option<usize>,
    #[serde(deserialize_with = "lenient::option")]
    job_timeout_ms: Option<u64>,
    #[serde(deserialize_with = "lenient::option")]
    expire_failed_jobs: Option<bool>,
}

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_JOBS: usize = 10;
const DEFAULT_JOB_TIMEOUT_MS: u64 = 30_000;

impl ServerConfig {
    /// Loads configuration from the path given by the `CONFIG` environment
    /// variable, falling back to `config.toml` in the current directory.
    ///
    /// A missing file is not an error; defaults and environment apply.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| "config.toml".to_owned());
        Self::load_from(path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = if path.exists() {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_owned(),
                source,
            })?
        } else {
            String::new()
        };
        Self::from_toml(&content, |key| std::env::var(key).ok())
    }

    /// Builds configuration from TOML text and an environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the expanded text is invalid.
    pub fn from_toml<F>(content: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = expand_env_vars(content, &env);
        let file: FileConfig = toml::from_str(&expanded)?;

        let production = ["NODE_ENV", "APP_ENV"]
            .into_iter()
            .any(|key| env(key).is_some_and(|v| v.eq_ignore_ascii_case("production")));
        let default_host = if production {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        };

        Ok(Self {
            host: env_override(&env, "HOST")
                .or(file.host)
                .unwrap_or(default_host),
            port: env_override(&env, "PORT")
                .or(file.port)
                .unwrap_or(DEFAULT_PORT),
            max_concurrent_jobs: env_override(&env, "MAX_CONCURRENT_JOBS")
                .or(file.max_concurrent_jobs)
                .unwrap_or(DEFAULT_MAX_JOBS),
            job_timeout_ms: env_override(&env, "JOB_TIMEOUT_MS")
                .or(file.job_timeout_ms)
                .unwrap_or(DEFAULT_JOB_TIMEOUT_MS),
            expire_failed_jobs: env_override(&env, "EXPIRE_FAILED_JOBS")
                .or(file.expire_failed_jobs)
                .unwrap_or(false),
        })
    }

    /// Orchestrator settings derived from this configuration.
    #[must_use]
    pub const fn job_config(&self) -> JobConfig {
        JobConfig {
            max_jobs: self.max_concurrent_jobs,
            retention: Duration::from_millis(self.job_timeout_ms),
            failed_policy: if self.expire_failed_jobs {
                FailedJobPolicy::Expire
            } else {
                FailedJobPolicy::Retain
            },
        }
    }
}

/// Reads and parses an environment override; unparsable values are ignored.
fn env_override<T, F>(env: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = env(key)?;
    let value = raw.trim().parse().ok();
    if value.is_none() {
        tracing::warn!(key, value = %raw, "Ignoring unparsable environment override");
    }
    value
}

/// Scalars may be written as strings so they can come from `$VAR` expansion.
mod lenient {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Value(T),
        Text(String),
    }

    pub(super) fn option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
        T::Err: Display,
    {
        match Raw::<T>::deserialize(deserializer)? {
            Raw::Value(v) => Ok(Some(v)),
            Raw::Text(s) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

/// Expands `$VAR` and `${VAR}` patterns from `env`.
///
/// Unresolved variables are left as-is.
fn expand_env_vars<F>(input: &str, env: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let braced = chars.next_if_eq(&'{').is_some();
        let mut var_name = String::new();
        while let Some(&c) = chars.peek() {
            if braced {
                if c == '}' {
                    chars.next();
                    break;
                }
            } else if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            var_name.push(c);
            chars.next();
        }

        match env(&var_name).filter(|_| !var_name.is_empty()) {
            Some(val) => result.push_str(&val),
            None => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&var_name);
                if braced && !var_name.is_empty() {
                    result.push('}');
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = ServerConfig::from_toml("", env(&[])).unwrap();
        assert_eq!(
            config,
            ServerConfig {
                host: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: 8080,
                max_concurrent_jobs: 10,
                job_timeout_ms: 30_000,
                expire_failed_jobs: false,
            }
        );
        assert_eq!(config.job_config().failed_policy, FailedJobPolicy::Retain);
    }

    #[test]
    fn test_production_binds_all_interfaces() {
        let config = ServerConfig::from_toml("", env(&[("NODE_ENV", "production")])).unwrap();
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let config = ServerConfig::from_toml("", env(&[("APP_ENV", "Production")])).unwrap();
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn test_env_overrides_file() {
        let toml = "port = 9000\nmax_concurrent_jobs = 3\n";
        let config = ServerConfig::from_toml(
            toml,
            env(&[("PORT", "9100"), ("EXPIRE_FAILED_JOBS", "true")]),
        )
        .unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.max_concurrent_jobs, 3);
        assert_eq!(config.job_config().failed_policy, FailedJobPolicy::Expire);
    }

    #[test]
    fn test_unparsable_env_override_is_ignored() {
        let config = ServerConfig::from_toml("port = 9000", env(&[("PORT", "eighty")])).unwrap();
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_file_values_expand_variables() {
        let toml = "host = \"${BIND}\"\njob_timeout_ms = \"$RETENTION\"\n";
        let config = ServerConfig::from_toml(
            toml,
            env(&[("BIND", "0.0.0.0"), ("RETENTION", "500")]),
        )
        .unwrap();
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.job_config().retention, Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        assert!(matches!(
            ServerConfig::from_toml("port = \"abc\"", env(&[])),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ServerConfig::from_toml("unknown_key = 1", env(&[])),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_expand_leaves_unresolved_variables() {
        let lookup = env(&[("A", "1")]);
        assert_eq!(expand_env_vars("$A ${A} $B ${B} $ x", &lookup), "1 1 $B ${B} $ x");
    }
}
