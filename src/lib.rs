pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use config::toml_config::HarvestConfig;
pub use core::client::SparqlClient;
pub use core::harvest::WikidataClient;
pub use core::query::{Language, PersonQuery, WIKIDATA_ENDPOINT};
pub use core::retry::{DelaySchedule, RetryPolicy};
pub use core::{engine::HarvestEngine, pipeline::PeoplePipeline};
pub use domain::model::{IdHarvest, PersonInfo, WorkLocation};
pub use utils::error::{Result, WikidataError};
