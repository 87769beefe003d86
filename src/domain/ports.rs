use crate::domain::model::{HarvestOutput, PersonInfo};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    fn names(&self) -> &[String];
    fn by_ids(&self) -> bool;
    fn chunk_size(&self) -> usize;
    fn retries(&self) -> u32;
    fn archive(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<PersonInfo>>;
    async fn transform(&self, records: Vec<PersonInfo>) -> Result<HarvestOutput>;
    async fn load(&self, output: HarvestOutput) -> Result<String>;
}
