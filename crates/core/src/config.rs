//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! services. Nothing in the request path reads process-wide environment
//! variables.

use crate::constants::{
    DEFAULT_HTTP_TIMEOUT, DEFAULT_ORGANISATION_NAME, DEFAULT_REFRESH_INTERVAL, DEFAULT_REST_ADDR,
};
use crate::{TriageError, TriageResult};
use std::time::Duration;

pub const ENV_BACKEND_URL: &str = "TRIAGE_BACKEND_URL";
pub const ENV_REST_ADDR: &str = "TRIAGE_REST_ADDR";
pub const ENV_REFRESH_INTERVAL_SECS: &str = "TRIAGE_REFRESH_INTERVAL_SECS";
pub const ENV_ORGANISATION_NAME: &str = "TRIAGE_ORGANISATION_NAME";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "TRIAGE_HTTP_TIMEOUT_SECS";

/// Triage configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct TriageConfig {
    backend_base_url: String,
    rest_addr: String,
    refresh_interval: Duration,
    organisation_name: String,
    http_timeout: Duration,
}

impl TriageConfig {
    /// Create a new `TriageConfig`.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::InvalidInput` if:
    /// - `backend_base_url` is empty or not an `http(s)://` URL,
    /// - `organisation_name` is blank,
    /// - either duration is zero.
    pub fn new(
        backend_base_url: String,
        rest_addr: String,
        refresh_interval: Duration,
        organisation_name: String,
        http_timeout: Duration,
    ) -> TriageResult<Self> {
        let backend_base_url = backend_base_url.trim().trim_end_matches('/').to_string();
        if backend_base_url.is_empty() {
            return Err(TriageError::InvalidInput(
                "backend base URL cannot be empty".into(),
            ));
        }
        if !(backend_base_url.starts_with("http://") || backend_base_url.starts_with("https://")) {
            return Err(TriageError::InvalidInput(format!(
                "backend base URL must start with http:// or https://, got {backend_base_url}"
            )));
        }
        if organisation_name.trim().is_empty() {
            return Err(TriageError::InvalidInput(
                "organisation name cannot be empty".into(),
            ));
        }
        if refresh_interval.is_zero() {
            return Err(TriageError::InvalidInput(
                "refresh interval must be greater than zero".into(),
            ));
        }
        if http_timeout.is_zero() {
            return Err(TriageError::InvalidInput(
                "HTTP timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            backend_base_url,
            rest_addr,
            refresh_interval,
            organisation_name: organisation_name.trim().to_string(),
            http_timeout,
        })
    }

    /// Resolve the configuration from a key lookup, normally `std::env::var`.
    ///
    /// Only [`ENV_BACKEND_URL`] is required; every other key falls back to its default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> TriageResult<Self> {
        let backend_base_url = lookup(ENV_BACKEND_URL)
            .ok_or_else(|| TriageError::InvalidInput(format!("{ENV_BACKEND_URL} is not set")))?;
        let rest_addr = non_blank(lookup(ENV_REST_ADDR)).unwrap_or_else(|| DEFAULT_REST_ADDR.into());
        let refresh_interval = duration_secs_from_env_value(
            ENV_REFRESH_INTERVAL_SECS,
            lookup(ENV_REFRESH_INTERVAL_SECS),
            DEFAULT_REFRESH_INTERVAL,
        )?;
        let organisation_name = organisation_name_from_lookup(&lookup);
        let http_timeout = duration_secs_from_env_value(
            ENV_HTTP_TIMEOUT_SECS,
            lookup(ENV_HTTP_TIMEOUT_SECS),
            DEFAULT_HTTP_TIMEOUT,
        )?;

        Self::new(
            backend_base_url,
            rest_addr,
            refresh_interval,
            organisation_name,
            http_timeout,
        )
    }

    pub fn backend_base_url(&self) -> &str {
        &self.backend_base_url
    }

    pub fn rest_addr(&self) -> &str {
        &self.rest_addr
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn organisation_name(&self) -> &str {
        &self.organisation_name
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Organisation name used to sign document requests, or the default when unset or blank.
///
/// Usable on its own by tools that do not need a backend URL.
pub fn organisation_name_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> String {
    non_blank(lookup(ENV_ORGANISATION_NAME)).unwrap_or_else(|| DEFAULT_ORGANISATION_NAME.into())
}

/// Parse a whole number of seconds from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `default`.
pub fn duration_secs_from_env_value(
    key: &str,
    value: Option<String>,
    default: Duration,
) -> TriageResult<Duration> {
    let Some(value) = non_blank(value) else {
        return Ok(default);
    };

    let secs = value.parse::<u64>().map_err(|_| {
        TriageError::InvalidInput(format!("{key} must be a whole number of seconds, got {value}"))
    })?;

    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_backend_is_set() {
        let cfg = TriageConfig::from_lookup(lookup_from(&[(
            ENV_BACKEND_URL,
            "http://localhost:8000/",
        )]))
        .expect("config should resolve");

        assert_eq!(cfg.backend_base_url(), "http://localhost:8000");
        assert_eq!(cfg.rest_addr(), DEFAULT_REST_ADDR);
        assert_eq!(cfg.refresh_interval(), DEFAULT_REFRESH_INTERVAL);
        assert_eq!(cfg.organisation_name(), DEFAULT_ORGANISATION_NAME);
        assert_eq!(cfg.http_timeout(), DEFAULT_HTTP_TIMEOUT);
    }

    #[test]
    fn organisation_name_needs_no_backend_url() {
        assert_eq!(
            organisation_name_from_lookup(lookup_from(&[])),
            DEFAULT_ORGANISATION_NAME
        );
        assert_eq!(
            organisation_name_from_lookup(lookup_from(&[(ENV_ORGANISATION_NAME, "  ")])),
            DEFAULT_ORGANISATION_NAME
        );
        assert_eq!(
            organisation_name_from_lookup(lookup_from(&[(ENV_ORGANISATION_NAME, " Lakeside ")])),
            "Lakeside"
        );
    }

    #[test]
    fn missing_backend_url_is_rejected() {
        let err = TriageConfig::from_lookup(lookup_from(&[])).expect_err("backend is required");
        assert!(err.to_string().contains(ENV_BACKEND_URL));
    }

    #[test]
    fn refresh_interval_is_injectable() {
        let cfg = TriageConfig::from_lookup(lookup_from(&[
            (ENV_BACKEND_URL, "https://triage.example"),
            (ENV_REFRESH_INTERVAL_SECS, "30"),
        ]))
        .expect("config should resolve");
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(30));
    }

    #[test]
    fn zero_or_garbage_interval_is_rejected() {
        for bad in ["0", "soon", "-5"] {
            let result = TriageConfig::from_lookup(lookup_from(&[
                (ENV_BACKEND_URL, "https://triage.example"),
                (ENV_REFRESH_INTERVAL_SECS, bad),
            ]));
            assert!(result.is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn non_http_backend_is_rejected() {
        let result = TriageConfig::new(
            "ftp://triage.example".into(),
            DEFAULT_REST_ADDR.into(),
            DEFAULT_REFRESH_INTERVAL,
            DEFAULT_ORGANISATION_NAME.into(),
            DEFAULT_HTTP_TIMEOUT,
        );
        assert!(matches!(result, Err(TriageError::InvalidInput(_))));
    }
}
