use learnmate_progress::config::ServiceConfig;
use learnmate_progress::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load()?;
    logging::init_logging(&config)?;

    learnmate_progress::run(config).await?;
    Ok(())
}
