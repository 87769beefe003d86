use crate::config::read_names_file;
use crate::core::retry::{DelaySchedule, RetryPolicy};
use crate::core::ConfigProvider;
use crate::utils::error::{Result, WikidataError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// TOML job file for unattended harvests.
///
/// ```toml
/// [job]
/// name = "dutch-painters"
///
/// [source]
/// endpoint = "https://query.wikidata.org/sparql"
/// retry_attempts = 3
/// retry_delays_seconds = [1, 20, 60]
///
/// [extract]
/// names_file = "painters.txt"
/// chunk_size = 150
///
/// [load]
/// output_path = "./output"
/// archive = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    pub job: JobConfig,
    pub source: SourceConfig,
    pub extract: ExtractConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: String,
    pub retry_attempts: Option<u32>,
    pub retry_delays_seconds: Option<Vec<u64>>,
    pub retry_on_timeout: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub names: Option<Vec<String>>,
    pub names_file: Option<String>,
    pub by_ids: Option<bool>,
    pub chunk_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub archive: Option<bool>,
}

impl HarvestConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| WikidataError::ConfigError {
            message: format!("Failed to parse TOML config: {}", e),
        })
    }

    /// Fold the names file, if any, into the inline name list.
    pub fn resolve_names(&mut self) -> Result<()> {
        if let Some(path) = self.extract.names_file.clone() {
            let mut names = self.extract.names.take().unwrap_or_default();
            names.extend(read_names_file(&path)?);
            self.extract.names = Some(names);
        }
        Ok(())
    }

    /// Retry policy from the `[source]` table; a delay ladder in the file
    /// replaces the default staged schedule.
    pub fn retry_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::default();
        if let Some(attempts) = self.source.retry_attempts {
            policy.max_attempts = attempts;
        }
        if let Some(delays) = &self.source.retry_delays_seconds {
            if !delays.is_empty() {
                policy.schedule =
                    DelaySchedule::Staged(delays.iter().map(|s| Duration::from_secs(*s)).collect());
            }
        }
        if self.source.retry_on_timeout.unwrap_or(false) {
            policy.retry_on_timeout = true;
        }
        policy
    }
}

impl ConfigProvider for HarvestConfig {
    fn endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn names(&self) -> &[String] {
        self.extract.names.as_deref().unwrap_or(&[])
    }

    fn by_ids(&self) -> bool {
        self.extract.by_ids.unwrap_or(false)
    }

    fn chunk_size(&self) -> usize {
        self.extract.chunk_size.unwrap_or(150)
    }

    fn retries(&self) -> u32 {
        self.source.retry_attempts.unwrap_or(3)
    }

    fn archive(&self) -> bool {
        self.load.archive.unwrap_or(false)
    }
}

impl Validate for HarvestConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("job.name", &self.job.name)?;
        validation::validate_url("source.endpoint", &self.source.endpoint)?;
        validation::validate_non_empty_string("load.output_path", &self.load.output_path)?;
        if self.extract.names.is_none() {
            validation::validate_required_field("extract.names_file", &self.extract.names_file)?;
        }
        if let Some(chunk_size) = self.extract.chunk_size {
            validation::validate_positive_number("extract.chunk_size", chunk_size, 1)?;
        }
        if let Some(attempts) = self.source.retry_attempts {
            validation::validate_range("source.retry_attempts", attempts, 1, 10)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [job]
        name = "dutch-painters"
        description = "Golden Age painters"

        [source]
        endpoint = "https://query.wikidata.org/sparql"
        retry_attempts = 4
        retry_delays_seconds = [1, 5]
        retry_on_timeout = true

        [extract]
        names = ["Rembrandt", "Johannes Vermeer"]
        chunk_size = 50

        [load]
        output_path = "./output"
        archive = true
    "#;

    #[test]
    fn parses_and_validates_sample() {
        let config = HarvestConfig::from_toml(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.names().len(), 2);
        assert_eq!(config.chunk_size(), 50);
        assert!(config.archive());
        assert!(!config.by_ids());
    }

    #[test]
    fn retry_policy_uses_configured_ladder() {
        let config = HarvestConfig::from_toml(SAMPLE).unwrap();
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 4);
        assert!(policy.retry_on_timeout);
        assert_eq!(policy.delay_for(0, None), Duration::from_secs(1));
        assert_eq!(policy.delay_for(3, None), Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_endpoint_scheme() {
        let bad = SAMPLE.replace("https://query.wikidata.org/sparql", "ftp://x");
        let config = HarvestConfig::from_toml(&bad).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(HarvestConfig::from_toml("job = ").is_err());
    }

    #[test]
    fn requires_names_or_names_file() {
        let mut config = HarvestConfig::from_toml(SAMPLE).unwrap();
        config.extract.names = None;
        assert!(config.validate().is_err());
        config.extract.names_file = Some("painters.txt".to_string());
        assert!(config.validate().is_ok());
    }
}
