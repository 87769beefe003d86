pub mod cli;
pub mod toml_config;

use crate::utils::error::Result;

#[cfg(feature = "cli")]
use crate::core::query::WIKIDATA_ENDPOINT;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "wikidata-people")]
#[command(about = "Harvest per-person records from Wikidata's SPARQL endpoint")]
pub struct CliConfig {
    #[arg(long, default_value = WIKIDATA_ENDPOINT)]
    pub endpoint: String,

    #[arg(long, value_delimiter = ',', help = "Person names (or Wikidata IDs) to harvest")]
    pub names: Vec<String>,

    #[arg(long, help = "File with one person name (or Wikidata ID) per line")]
    pub names_file: Option<String>,

    #[arg(long, help = "Treat input values as Wikidata IDs instead of names")]
    pub by_ids: bool,

    #[arg(long, help = "TOML job file; overrides the other options")]
    pub config: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "150")]
    pub chunk_size: usize,

    #[arg(long, default_value = "3")]
    pub retries: u32,

    #[arg(long, help = "Bundle outputs into a zip archive")]
    pub archive: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process resource usage between stages")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Fold the names file, if any, into `names`.
    pub fn resolve_names(&mut self) -> Result<()> {
        if let Some(path) = &self.names_file {
            self.names.extend(read_names_file(path)?);
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn names(&self) -> &[String] {
        &self.names
    }

    fn by_ids(&self) -> bool {
        self.by_ids
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn retries(&self) -> u32 {
        self.retries
    }

    fn archive(&self) -> bool {
        self.archive
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("endpoint", &self.endpoint)?;
        validation::validate_non_empty_string("output_path", &self.output_path)?;
        validation::validate_positive_number("chunk_size", self.chunk_size, 1)?;
        validation::validate_range("retries", self.retries, 1, 10)?;
        Ok(())
    }
}

/// One name per line, blank lines and surrounding whitespace dropped.
pub fn read_names_file(path: &str) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn names_file_drops_blank_lines_and_whitespace() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Vincent van Gogh\n\n  Claude Monet  \n").unwrap();
        let names = read_names_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(names, vec!["Vincent van Gogh", "Claude Monet"]);
    }

    #[test]
    fn missing_names_file_is_an_error() {
        assert!(read_names_file("/no/such/file.txt").is_err());
    }
}
