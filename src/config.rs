use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::source::DEFAULT_TEMPLATE_ENDPOINT;
use crate::encode::jpeg::DEFAULT_JPEG_QUALITY;
use crate::foundation::error::{MemeError, MemeResult};
use crate::render::compositor::CompositorOpts;
use crate::session::export::DEFAULT_EXPORT_FILE_NAME;

/// Environment variable overriding [`StudioConfig::template_endpoint`].
pub const ENV_TEMPLATE_URL: &str = "MEMEFORGE_TEMPLATE_URL";
/// Environment variable overriding [`StudioConfig::http_timeout`] (whole seconds).
pub const ENV_HTTP_TIMEOUT_SECS: &str = "MEMEFORGE_HTTP_TIMEOUT_SECS";
/// Environment variable overriding [`StudioConfig::jpeg_quality`].
pub const ENV_JPEG_QUALITY: &str = "MEMEFORGE_JPEG_QUALITY";
/// Environment variable adding one entry to [`StudioConfig::font_dirs`].
pub const ENV_FONT_DIR: &str = "MEMEFORGE_FONT_DIR";
/// Environment variable setting [`StudioConfig::seed`].
pub const ENV_SEED: &str = "MEMEFORGE_SEED";

/// Settings for a meme-editing run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudioConfig {
    /// URL of the template listing.
    pub template_endpoint: String,
    /// Timeout for every HTTP request.
    pub http_timeout: Duration,
    /// JPEG quality for exports, `1..=100`.
    pub jpeg_quality: u8,
    /// File name used when exporting without an explicit path.
    pub output_name: String,
    /// Extra font directories for captions.
    pub font_dirs: Vec<PathBuf>,
    /// Seed for template draws; `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            template_endpoint: DEFAULT_TEMPLATE_ENDPOINT.to_string(),
            http_timeout: Duration::from_secs(15),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            output_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            font_dirs: Vec::new(),
            seed: None,
        }
    }
}

impl StudioConfig {
    /// Defaults overridden by `MEMEFORGE_*` environment variables.
    pub fn from_env() -> MemeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `MEMEFORGE_*` keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MemeResult<Self> {
        let mut cfg = Self::default();

        if let Some(url) = lookup(ENV_TEMPLATE_URL).filter(|v| !v.trim().is_empty()) {
            cfg.template_endpoint = url.trim().to_string();
        }
        if let Some(v) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            let secs = v.trim().parse::<u64>().map_err(|_| {
                MemeError::validation(format!("{ENV_HTTP_TIMEOUT_SECS} must be whole seconds, got '{v}'"))
            })?;
            cfg.http_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = lookup(ENV_JPEG_QUALITY) {
            cfg.jpeg_quality = v.trim().parse::<u8>().map_err(|_| {
                MemeError::validation(format!("{ENV_JPEG_QUALITY} must be 1..=100, got '{v}'"))
            })?;
        }
        if let Some(dir) = lookup(ENV_FONT_DIR).filter(|v| !v.trim().is_empty()) {
            cfg.font_dirs.push(PathBuf::from(dir));
        }
        if let Some(v) = lookup(ENV_SEED) {
            cfg.seed = Some(v.trim().parse::<u64>().map_err(|_| {
                MemeError::validation(format!("{ENV_SEED} must be an unsigned integer, got '{v}'"))
            })?);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values no run could use.
    pub fn validate(&self) -> MemeResult<()> {
        if self.template_endpoint.trim().is_empty() {
            return Err(MemeError::validation("template endpoint must not be empty"));
        }
        if self.http_timeout.is_zero() {
            return Err(MemeError::validation("http timeout must be > 0"));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(MemeError::validation(format!(
                "jpeg quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.output_name.trim().is_empty() {
            return Err(MemeError::validation("output file name must not be empty"));
        }
        Ok(())
    }

    /// Compositor options derived from this configuration.
    pub fn compositor_opts(&self) -> CompositorOpts {
        CompositorOpts {
            jpeg_quality: self.jpeg_quality,
            font_dirs: self.font_dirs.clone(),
            file_name: self.output_name.clone(),
            ..CompositorOpts::default()
        }
    }
}
