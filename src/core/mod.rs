pub mod client;
pub mod engine;
pub mod harvest;
pub mod mapper;
pub mod pipeline;
pub mod query;
pub mod retry;

pub use crate::domain::model::{Binding, HarvestOutput, IdHarvest, PersonInfo, WorkLocation};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
