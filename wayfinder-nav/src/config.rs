//! Navigator configuration.
//!
//! Every field has a default, so an empty JSON object (or a missing file)
//! yields the stock behaviour. Durations are written in milliseconds:
//!
//! ```json
//! {
//!   "prefer_fast_first_fix": true,
//!   "acquisition": { "max_retries": 3, "retry_delay_ms": 2000 },
//!   "route_style": { "color": "#3B82F6", "padding_px": 50 }
//! }
//! ```

use std::io;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use wayfinder_core::{ClientProfile, PolylineStyle};

/// Errors raised while loading a [`NavigatorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("failed to read navigator config {path}: {source}")]
    Io {
        /// File involved.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file is not valid configuration JSON.
    #[error("failed to parse navigator config {path}: {source}")]
    Parse {
        /// File involved.
        path: Utf8PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The values parsed but cannot drive the navigator.
    #[error("invalid navigator config: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

/// Top-level navigator settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct NavigatorConfig {
    /// Trade accuracy for latency on the first fix. Mobile clients set this.
    pub prefer_fast_first_fix: bool,
    /// Retry and restart timing.
    pub acquisition: AcquisitionPolicy,
    /// How routes are drawn.
    pub route_style: RouteStyle,
}

impl NavigatorConfig {
    /// Defaults tuned for the detected client.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfinder_core::ClientProfile;
    /// use wayfinder_nav::NavigatorConfig;
    ///
    /// let phone = ClientProfile::from_user_agent("Mozilla/5.0 (Linux; Android 14) Mobile");
    /// assert!(NavigatorConfig::for_client(phone).prefer_fast_first_fix);
    /// ```
    #[must_use]
    pub fn for_client(profile: ClientProfile) -> Self {
        Self {
            prefer_fast_first_fix: profile.is_mobile,
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, does not parse,
    /// or fails [`validate`](Self::validate).
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents =
            wayfinder_fs::read_optional_utf8(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let Some(text) = contents else {
            debug!("no navigator config at {path}; using defaults");
            return Ok(Self::default());
        };
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let policy = &self.acquisition;
        if policy.restart_delay.is_zero() {
            return Err(invalid("acquisition.restart_delay_ms must be positive"));
        }
        if policy.restart_delay_cap < policy.restart_delay {
            return Err(invalid(
                "acquisition.restart_delay_cap_ms must not be below restart_delay_ms",
            ));
        }
        if !(0.0..=1.0).contains(&self.route_style.opacity) {
            return Err(invalid("route_style.opacity must lie in [0, 1]"));
        }
        if !self.route_style.weight.is_finite() || self.route_style.weight <= 0.0 {
            return Err(invalid("route_style.weight must be positive"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// Timing of the acquisition retry loop and watch restarts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AcquisitionPolicy {
    /// Retries after the fallback request fails transiently.
    pub max_retries: u32,
    /// Pause before each retry.
    #[serde(rename = "retry_delay_ms", deserialize_with = "millis")]
    pub retry_delay: Duration,
    /// Retry timeout before the per-attempt step is added.
    #[serde(rename = "retry_timeout_base_ms", deserialize_with = "millis")]
    pub retry_timeout_base: Duration,
    /// Added to the retry timeout for every attempt.
    #[serde(rename = "retry_timeout_step_ms", deserialize_with = "millis")]
    pub retry_timeout_step: Duration,
    /// Timeout of the single fallback request.
    #[serde(rename = "fallback_timeout_ms", deserialize_with = "millis")]
    pub fallback_timeout: Duration,
    /// Pause before restarting after the first watch timeout.
    #[serde(rename = "restart_delay_ms", deserialize_with = "millis")]
    pub restart_delay: Duration,
    /// Ceiling for the doubling restart pause.
    #[serde(rename = "restart_delay_cap_ms", deserialize_with = "millis")]
    pub restart_delay_cap: Duration,
}

impl Default for AcquisitionPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(2000),
            retry_timeout_base: Duration::from_secs(20),
            retry_timeout_step: Duration::from_secs(5),
            fallback_timeout: Duration::from_secs(30),
            restart_delay: Duration::from_millis(1000),
            restart_delay_cap: Duration::from_secs(30),
        }
    }
}

/// Presentation of computed routes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteStyle {
    /// Stroke colour.
    pub color: String,
    /// Stroke width in pixels.
    pub weight: f64,
    /// Stroke opacity.
    pub opacity: f64,
    /// Padding around the route when fitting the viewport.
    pub padding_px: u32,
}

impl Default for RouteStyle {
    fn default() -> Self {
        let stroke = PolylineStyle::default();
        Self {
            color: stroke.color,
            weight: stroke.weight,
            opacity: stroke.opacity,
            padding_px: 50,
        }
    }
}

impl RouteStyle {
    /// Stroke style handed to the map.
    #[must_use]
    pub fn polyline(&self) -> PolylineStyle {
        PolylineStyle {
            color: self.color.clone(),
            weight: self.weight,
            opacity: self.opacity,
        }
    }
}

fn millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().unwrap_or_else(|err| panic!("create temp dir: {err}"))
    }

    fn config_path(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join("navigator.json"))
            .unwrap_or_else(|path| panic!("temp path is not UTF-8: {path:?}"))
    }

    #[rstest]
    fn missing_file_yields_defaults(temp_dir: TempDir) {
        let config = NavigatorConfig::load(&config_path(&temp_dir))
            .unwrap_or_else(|err| panic!("load: {err}"));
        assert_eq!(config, NavigatorConfig::default());
        assert_eq!(config.acquisition.max_retries, 3);
        assert_eq!(config.route_style.padding_px, 50);
    }

    #[rstest]
    fn partial_files_keep_other_defaults(temp_dir: TempDir) {
        let path = config_path(&temp_dir);
        wayfinder_fs::replace_utf8(
            &path,
            r#"{"prefer_fast_first_fix": true, "acquisition": {"retry_delay_ms": 500}}"#,
        )
        .unwrap_or_else(|err| panic!("seed: {err}"));

        let config = NavigatorConfig::load(&path).unwrap_or_else(|err| panic!("load: {err}"));

        assert!(config.prefer_fast_first_fix);
        assert_eq!(config.acquisition.retry_delay, Duration::from_millis(500));
        assert_eq!(config.acquisition.fallback_timeout, Duration::from_secs(30));
    }

    #[rstest]
    #[case(r#"{"acquisition": {"retry_delay": 500}}"#)]
    #[case("[1, 2]")]
    fn malformed_files_are_parse_errors(temp_dir: TempDir, #[case] contents: &str) {
        let path = config_path(&temp_dir);
        wayfinder_fs::replace_utf8(&path, contents).unwrap_or_else(|err| panic!("seed: {err}"));
        assert!(matches!(
            NavigatorConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[rstest]
    #[case(r#"{"acquisition": {"restart_delay_ms": 0}}"#)]
    #[case(r#"{"acquisition": {"restart_delay_ms": 5000, "restart_delay_cap_ms": 1000}}"#)]
    #[case(r#"{"route_style": {"opacity": 1.5}}"#)]
    #[case(r#"{"route_style": {"weight": 0}}"#)]
    fn unusable_values_are_rejected(temp_dir: TempDir, #[case] contents: &str) {
        let path = config_path(&temp_dir);
        wayfinder_fs::replace_utf8(&path, contents).unwrap_or_else(|err| panic!("seed: {err}"));
        assert!(matches!(
            NavigatorConfig::load(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[rstest]
    fn desktop_clients_prefer_accuracy() {
        let desktop = ClientProfile::from_user_agent(
            "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
        );
        assert!(!NavigatorConfig::for_client(desktop).prefer_fast_first_fix);
    }
}
