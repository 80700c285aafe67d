use std::fs;
use std::path::{Path, PathBuf};

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::TriageError;

pub const DEFAULT_OUTPUT_DIR: &str = "kingdom_triage";
pub const DEFAULT_THREADS: usize = 8;
pub const DEFAULT_CONFIDENCE: f64 = 0.1;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TriageConfig {
    #[serde(default)]
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub output_dir: Option<Utf8PathBuf>,
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub keep_intermediates: Option<bool>,
}

impl TriageConfig {
    pub fn merge(self, overrides: TriageConfig) -> TriageConfig {
        TriageConfig {
            database: overrides.database.or(self.database),
            output_dir: overrides.output_dir.or(self.output_dir),
            threads: overrides.threads.or(self.threads),
            confidence: overrides.confidence.or(self.confidence),
            keep_intermediates: overrides.keep_intermediates.or(self.keep_intermediates),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageOptions {
    pub database: PathBuf,
    pub output_dir: Utf8PathBuf,
    pub threads: usize,
    pub confidence: f64,
    pub keep_intermediates: bool,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> Result<TriageConfig, TriageError> {
        let content =
            fs::read_to_string(path).map_err(|_| TriageError::ConfigRead(path.to_path_buf()))?;
        serde_json::from_str(&content).map_err(|err| TriageError::ConfigParse(err.to_string()))
    }

    pub fn resolve(
        path: Option<&Path>,
        overrides: TriageConfig,
    ) -> Result<TriageOptions, TriageError> {
        let base = match path {
            Some(path) => Self::load(path)?,
            None => TriageConfig::default(),
        };
        Self::resolve_config(base.merge(overrides))
    }

    pub fn resolve_config(config: TriageConfig) -> Result<TriageOptions, TriageError> {
        let database = config.database.ok_or(TriageError::MissingDatabase)?;

        let threads = config.threads.unwrap_or(DEFAULT_THREADS);
        if threads == 0 {
            return Err(TriageError::InvalidThreads);
        }

        let confidence = config.confidence.unwrap_or(DEFAULT_CONFIDENCE);
        if !(0.0..=1.0).contains(&confidence) {
            return Err(TriageError::InvalidConfidence(confidence));
        }

        Ok(TriageOptions {
            database,
            output_dir: config
                .output_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR)),
            threads,
            confidence,
            keep_intermediates: config.keep_intermediates.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let config = TriageConfig {
            database: Some(PathBuf::from("k2_standard")),
            ..TriageConfig::default()
        };

        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert_eq!(resolved.output_dir, DEFAULT_OUTPUT_DIR);
        assert_eq!(resolved.threads, DEFAULT_THREADS);
        assert_eq!(resolved.confidence, DEFAULT_CONFIDENCE);
        assert!(!resolved.keep_intermediates);
    }
}
