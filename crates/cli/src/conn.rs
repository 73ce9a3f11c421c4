use crate::{config::LoaderConfig, error::CliError};
use connectors::sql::{mysql::adapter::MySqlAdapter, postgres::adapter::PgAdapter};
use tracing::{error, info};

pub async fn ping_all(config: &LoaderConfig) -> Result<(), CliError> {
    info!("Pinging MySQL source");
    let source = MySqlAdapter::connect(&config.source_url)?;
    if let Err(e) = source.ping().await {
        error!("MySQL ping failed: {}", e);
        return Err(e.into());
    }
    source.disconnect().await?;
    info!("MySQL ping succeeded");

    info!("Pinging Postgres target");
    let target = PgAdapter::connect(&config.target_url, 1)?;
    let result = target.ping().await;
    target.close();
    if let Err(e) = result {
        error!("Postgres ping failed: {}", e);
        return Err(e.into());
    }
    info!("Postgres ping succeeded");
    Ok(())
}
