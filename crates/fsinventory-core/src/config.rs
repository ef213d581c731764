//! Run configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::record::DigestKind;

/// Default number of concurrent digest workers.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Upper bound applied to the worker count.
pub const MAX_CONCURRENCY: usize = 512;

/// Default report destination.
pub const DEFAULT_OUTPUT: &str = "file_data.json";

/// Immutable snapshot of the operator-supplied parameters for one run.
///
/// Serialized into the report as `flag_data`.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct RunConfig {
    /// Enable per-file progress logging.
    #[builder(default = "false")]
    #[serde(default)]
    pub debug: bool,

    /// Directory (or single file) to inventory.
    #[builder(default = "PathBuf::from(\".\")")]
    pub start_dir: PathBuf,

    /// Descend into nested subdirectories.
    #[builder(default = "true")]
    #[serde(rename = "scan_sub_dirs", default = "default_true")]
    pub recurse: bool,

    /// Report destination.
    #[builder(default = "PathBuf::from(DEFAULT_OUTPUT)")]
    #[serde(rename = "output_file")]
    pub output: PathBuf,

    /// Maximum number of digest tasks in flight.
    #[builder(default = "DEFAULT_CONCURRENCY")]
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Digest kinds computed for every file.
    #[builder(default = "DigestKind::DEFAULT.to_vec()")]
    #[serde(default = "default_digests")]
    pub digests: Vec<DigestKind>,
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_digests() -> Vec<DigestKind> {
    DigestKind::DEFAULT.to_vec()
}

impl RunConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref start_dir) = self.start_dir
            && start_dir.as_os_str().is_empty()
        {
            return Err("Start directory cannot be empty".to_string());
        }
        if let Some(ref output) = self.output
            && output.as_os_str().is_empty()
        {
            return Err("Output path cannot be empty".to_string());
        }
        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }
        if let Some(ref digests) = self.digests
            && digests.is_empty()
        {
            return Err("At least one digest kind is required".to_string());
        }
        Ok(())
    }
}

impl RunConfig {
    /// Create a new run config builder.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Create a config with default settings for a start directory.
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            debug: false,
            start_dir: start_dir.into(),
            recurse: true,
            output: PathBuf::from(DEFAULT_OUTPUT),
            concurrency: DEFAULT_CONCURRENCY,
            digests: DigestKind::DEFAULT.to_vec(),
        }
    }

    /// Worker count actually used by the pool, clamped to `1..=MAX_CONCURRENCY`.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }

    /// Requested digest kinds with duplicates removed, in request order.
    pub fn digest_kinds(&self) -> Vec<DigestKind> {
        let mut kinds = Vec::with_capacity(self.digests.len());
        for kind in &self.digests {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        kinds
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = RunConfig::builder()
            .start_dir("/srv/data")
            .concurrency(4usize)
            .recurse(false)
            .build()
            .unwrap();

        assert_eq!(config.start_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.concurrency, 4);
        assert!(!config.recurse);
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.digests, DigestKind::DEFAULT.to_vec());
    }

    #[test]
    fn test_config_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.start_dir, PathBuf::from("."));
        assert!(config.recurse);
        assert!(!config.debug);
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let result = RunConfig::builder().concurrency(0usize).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_digests_rejected() {
        let result = RunConfig::builder().digests(Vec::<DigestKind>::new()).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_effective_concurrency_clamped() {
        let mut config = RunConfig::new("/tmp");
        config.concurrency = 100_000;
        assert_eq!(config.effective_concurrency(), MAX_CONCURRENCY);

        config.concurrency = 0;
        assert_eq!(config.effective_concurrency(), 1);
    }

    #[test]
    fn test_digest_kinds_deduplicated() {
        let config = RunConfig::builder()
            .digests(vec![DigestKind::Sha256, DigestKind::Md5, DigestKind::Sha256])
            .build()
            .unwrap();

        assert_eq!(config.digest_kinds(), vec![DigestKind::Sha256, DigestKind::Md5]);
    }
}
