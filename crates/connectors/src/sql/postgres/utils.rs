use crate::sql::base::error::ConnectorError;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::{Config, NoTls, config::SslMode};
use tracing::debug;

pub(crate) fn build_pool(url: &str, max_size: usize) -> Result<Pool, ConnectorError> {
    let config = url
        .parse::<Config>()
        .map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;
    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };

    // With a TLS connector, `prefer` still falls back to plaintext when the
    // server declines SSL.
    let manager = match config.get_ssl_mode() {
        SslMode::Disable => {
            debug!("Postgres pool without TLS");
            Manager::from_config(config, NoTls, manager_config)
        }
        _ => {
            let connector = TlsConnector::builder().build()?;
            Manager::from_config(config, MakeTlsConnector::new(connector), manager_config)
        }
    };

    Pool::builder(manager)
        .max_size(max_size.max(1))
        .build()
        .map_err(|e| ConnectorError::Pool(e.to_string()))
}
