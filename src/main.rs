use clap::Parser;
use wikidata_people::utils::{logger, validation::Validate};
use wikidata_people::{
    CliConfig, HarvestConfig, HarvestEngine, LocalStorage, PeoplePipeline,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting wikidata-people CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let monitor_enabled = config.monitor;

    let output_path = if let Some(job_file) = config.config.clone() {
        run_job_file(&job_file, monitor_enabled).await?
    } else {
        config.resolve_names()?;

        if let Err(e) = config.validate() {
            tracing::error!("Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
        if config.names.is_empty() {
            eprintln!("❌ No names given; use --names, --names-file or --config");
            std::process::exit(1);
        }

        let storage = LocalStorage::new(config.output_path.clone());
        let pipeline = PeoplePipeline::new(storage, config)?;
        let engine = HarvestEngine::new_with_monitoring(pipeline, monitor_enabled);
        engine.run().await?
    };

    tracing::info!("Harvest completed successfully");
    println!("✅ Harvest completed successfully!");
    println!("📁 Output saved to: {}", output_path);

    Ok(())
}

async fn run_job_file(path: &str, monitor_enabled: bool) -> anyhow::Result<String> {
    let mut job = HarvestConfig::from_file(path)?;
    job.resolve_names()?;

    if let Err(e) = job.validate() {
        tracing::error!("Job file validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    tracing::info!(job = %job.job.name, "Running harvest job from {}", path);

    let retry = job.retry_policy();
    let storage = LocalStorage::new(job.load.output_path.clone());
    let pipeline = PeoplePipeline::new_with_policy(storage, job, retry)?;
    let engine = HarvestEngine::new_with_monitoring(pipeline, monitor_enabled);
    Ok(engine.run().await?)
}
