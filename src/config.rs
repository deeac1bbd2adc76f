//! Configuration types for document scanning.
//!
//! Every knob lives in [`ScanConfig`], built through [`ScanConfigBuilder`] or
//! read from the environment with [`ScanConfig::from_env`]. The CLI maps its
//! flags onto the same builder, so library users and the binary share one set
//! of defaults.

use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tracing::warn;

/// Env var that skips the engine's startup model-source check.
pub const ENV_DISABLE_SOURCE_CHECK: &str = "DOCSCAN_DISABLE_MODEL_SOURCE_CHECK";

/// Configuration for a scanning process.
///
/// # Example
/// ```rust
/// use docscan::ScanConfig;
///
/// let config = ScanConfig::builder()
///     .pdf_scale(2.0)
///     .engine_url("http://127.0.0.1:8080")
///     .skip_model_source_check(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.pdf_scale, 2.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Scale factor applied when rasterising the first page of a PDF.
    /// Range: 0.5–6.0. Default: 2.0.
    ///
    /// pdfium renders at 72 points per inch, so 2.0 yields a 144 DPI raster,
    /// enough for the structure engine to read body text and table rules.
    pub pdf_scale: f32,

    /// Base URL of the structure engine's serving endpoint. Default: `http://127.0.0.1:8080`.
    pub engine_url: String,

    /// Skip the engine's model-source check at startup. Default: false.
    ///
    /// Only affects start-up time; results are identical either way.
    pub skip_model_source_check: bool,

    /// Address the web UI binds to. Default: `127.0.0.1:8501`.
    pub bind: SocketAddr,

    /// Largest accepted upload body in bytes. Default: 200 MiB.
    pub max_upload_bytes: usize,

    /// Number of browser sessions kept in memory before the least recently
    /// used one is dropped. Default: 64.
    pub max_sessions: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            pdf_scale: 2.0,
            engine_url: "http://127.0.0.1:8080".to_string(),
            skip_model_source_check: false,
            bind: SocketAddr::from(([127, 0, 0, 1], 8501)),
            max_upload_bytes: 200 * 1024 * 1024,
            max_sessions: 64,
        }
    }
}

impl ScanConfig {
    /// Create a new builder for `ScanConfig`.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config from `DOCSCAN_*` environment variables.
    ///
    /// Unparseable values are logged and replaced by the default.
    pub fn from_env() -> Result<Self, ScanError> {
        Self::env_builder().build()
    }

    /// A builder pre-populated from `DOCSCAN_*` environment variables, for
    /// callers that layer their own overrides on top (the CLI does).
    pub fn env_builder() -> ScanConfigBuilder {
        Self::builder_from(|key| std::env::var(key).ok())
    }

    /// Same as [`env_builder`](Self::env_builder), reading variables through
    /// `lookup` instead of the process environment.
    pub fn builder_from<F>(lookup: F) -> ScanConfigBuilder
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = EnvLookup(lookup);
        let mut builder = Self::builder();

        if let Some(url) = vars.string("DOCSCAN_ENGINE_URL") {
            builder = builder.engine_url(url);
        }
        if let Some(bind) = vars.parse::<SocketAddr>("DOCSCAN_BIND") {
            builder = builder.bind(bind);
        }
        if let Some(scale) = vars.parse::<f32>("DOCSCAN_PDF_SCALE") {
            builder = builder.pdf_scale(scale);
        }
        if let Some(mb) = vars.parse::<usize>("DOCSCAN_MAX_UPLOAD_MB") {
            builder = builder.max_upload_bytes(mb.saturating_mul(1024 * 1024));
        }
        if let Some(n) = vars.parse::<usize>("DOCSCAN_MAX_SESSIONS") {
            builder = builder.max_sessions(n);
        }
        if let Some(flag) = vars.string(ENV_DISABLE_SOURCE_CHECK) {
            builder = builder.skip_model_source_check(is_truthy(&flag));
        }
        builder
    }
}

/// Builder for [`ScanConfig`].
#[derive(Debug)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfigBuilder {
    pub fn pdf_scale(mut self, scale: f32) -> Self {
        self.config.pdf_scale = scale;
        self
    }

    pub fn engine_url(mut self, url: impl Into<String>) -> Self {
        self.config.engine_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn skip_model_source_check(mut self, v: bool) -> Self {
        self.config.skip_model_source_check = v;
        self
    }

    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.config.bind = addr;
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn max_sessions(mut self, n: usize) -> Self {
        self.config.max_sessions = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ScanConfig, ScanError> {
        let c = &self.config;
        if !(0.5..=6.0).contains(&c.pdf_scale) {
            return Err(ScanError::InvalidConfig(format!(
                "PDF scale must be 0.5–6.0, got {}",
                c.pdf_scale
            )));
        }
        if c.engine_url.is_empty() {
            return Err(ScanError::InvalidConfig("Engine URL must not be empty".into()));
        }
        if c.max_upload_bytes == 0 {
            return Err(ScanError::InvalidConfig(
                "Upload limit must be ≥ 1 byte".into(),
            ));
        }
        if c.max_sessions == 0 {
            return Err(ScanError::InvalidConfig("Session limit must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

struct EnvLookup<F>(F);

impl<F: Fn(&str) -> Option<String>> EnvLookup<F> {
    fn string(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.string(key)?;
        match raw.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring {}={:?}: not a valid value", key, raw);
                None
            }
        }
    }
}

/// `"1"`, `"true"`, `"yes"`, `"on"` (any case) are true.
pub(crate) fn is_truthy(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        let c = ScanConfig::builder().build().expect("defaults build");
        assert_eq!(c.pdf_scale, 2.0);
        assert!(!c.skip_model_source_check);
        assert_eq!(c.bind.port(), 8501);
    }

    #[test]
    fn scale_out_of_range_rejected() {
        let err = ScanConfig::builder().pdf_scale(10.0).build().unwrap_err();
        assert!(err.to_string().contains("PDF scale"), "got: {err}");
    }

    #[test]
    fn zero_sessions_rejected() {
        assert!(ScanConfig::builder().max_sessions(0).build().is_err());
    }

    #[test]
    fn engine_url_trailing_slash_trimmed() {
        let c = ScanConfig::builder()
            .engine_url("http://engine:8080/")
            .build()
            .unwrap();
        assert_eq!(c.engine_url, "http://engine:8080");
    }

    #[test]
    fn env_overrides_defaults() {
        let vars = HashMap::from([
            ("DOCSCAN_MAX_SESSIONS", "7"),
            ("DOCSCAN_PDF_SCALE", "not-a-number"),
            ("DOCSCAN_ENGINE_URL", "http://ocr:9000/"),
            (ENV_DISABLE_SOURCE_CHECK, "yes"),
            ("DOCSCAN_BIND", "  "),
        ]);
        let c = ScanConfig::builder_from(|k| vars.get(k).map(|v| v.to_string()))
            .build()
            .unwrap();
        assert_eq!(c.max_sessions, 7);
        assert_eq!(c.pdf_scale, 2.0);
        assert_eq!(c.engine_url, "http://ocr:9000");
        assert!(c.skip_model_source_check);
        assert_eq!(c.bind.port(), 8501);
    }

    #[test]
    fn truthy_values() {
        for v in ["1", "true", "True", " yes ", "ON"] {
            assert!(is_truthy(v), "{v} should be truthy");
        }
        for v in ["0", "false", "", "no"] {
            assert!(!is_truthy(v), "{v} should be falsy");
        }
    }
}
