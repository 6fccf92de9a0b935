//! Pipeline tuning knobs, read once at startup.

use std::env;

/// Fixed parameters of a screening run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Seconds between sampled frames.
    pub interval_secs: u32,
    /// Hard ceiling on concurrent classification calls. Exceeding it
    /// risks upstream rate-limit errors.
    pub max_concurrent_analyses: usize,
    /// Deadline for one classification call.
    pub classify_timeout_secs: u64,
    /// Largest accepted upload.
    pub max_upload_bytes: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            max_concurrent_analyses: 10,
            classify_timeout_secs: 120,
            max_upload_bytes: 512 * 1024 * 1024,
        }
    }
}

impl PipelineConfig {
    /// Read configuration from the environment, falling back to the
    /// defaults above for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            interval_secs: env_parsed("FRAMEGATE_INTERVAL_SECS", defaults.interval_secs),
            max_concurrent_analyses: env_parsed(
                "FRAMEGATE_MAX_CONCURRENT_ANALYSES",
                defaults.max_concurrent_analyses,
            ),
            classify_timeout_secs: env_parsed(
                "FRAMEGATE_CLASSIFY_TIMEOUT_SECS",
                defaults.classify_timeout_secs,
            ),
            max_upload_bytes: env_parsed("FRAMEGATE_MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(var = name, value = %raw, "Ignoring unparseable env var");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_operating_envelope() {
        let config = PipelineConfig::default();
        assert_eq!(config.interval_secs, 5);
        assert_eq!(config.max_concurrent_analyses, 10);
        assert_eq!(config.classify_timeout_secs, 120);
    }
}
