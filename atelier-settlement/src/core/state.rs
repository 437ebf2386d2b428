//! Application state shared by every handler

use std::sync::Arc;

use shared::error::AppResult;
use sqlx::SqlitePool;

use super::Config;
use crate::gateways::{
    ArchivalGateway, DisabledArchivalGateway, HttpArchivalGateway, NotificationGateway,
    SesNotificationGateway,
};
use crate::settlement::SettlementService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// SQLite connection pool
    pub pool: SqlitePool,
    pub settlement: SettlementService,
}

impl AppState {
    /// Wire the production gateways described by `config`
    pub async fn new(config: Config, pool: SqlitePool) -> AppResult<Self> {
        let notifier: Arc<dyn NotificationGateway> = Arc::new(
            SesNotificationGateway::from_env(config.mail_from.clone(), config.ses_region.clone())
                .await,
        );

        let archive: Arc<dyn ArchivalGateway> = match &config.archive_url {
            Some(url) => {
                tracing::info!(url = %url, "Notice archival enabled");
                Arc::new(HttpArchivalGateway::new(
                    url.clone(),
                    config.archive_token.clone(),
                    config.gateway_timeout,
                )?)
            }
            None => {
                tracing::warn!("ARCHIVE_URL not set, notice archival disabled");
                Arc::new(DisabledArchivalGateway)
            }
        };

        Ok(Self::with_gateways(config, pool, notifier, archive))
    }

    /// Build with explicit gateways (tests, alternative deployments)
    pub fn with_gateways(
        config: Config,
        pool: SqlitePool,
        notifier: Arc<dyn NotificationGateway>,
        archive: Arc<dyn ArchivalGateway>,
    ) -> Self {
        let settlement = SettlementService::new(pool.clone(), config.timezone, notifier, archive)
            .with_gateway_timeout(config.gateway_timeout)
            .with_memo_prefix(config.transfer_memo_prefix.clone());
        Self {
            config: Arc::new(config),
            pool,
            settlement,
        }
    }
}
