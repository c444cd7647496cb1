//! Application context - dependency injection container

use std::sync::Arc;

use quotesync_core::{SyncOrchestrator, WebhookReceiver};
use quotesync_domain::{Config, QuoteSyncError, Result};
use quotesync_infra::{
    BroadcastNotifier, DbManager, SqliteRepRepository, SqliteSalesRepository, SweepScheduler,
    SweepSchedulerConfig, ZohoEstimateClient, ZohoTokenProvider,
};
use tracing::info;

/// Every long-lived service, built once from a validated [`Config`].
pub struct AppContext {
    pub config: Arc<Config>,
    pub db: Arc<DbManager>,
    pub sales: Arc<SqliteSalesRepository>,
    pub reps: Arc<SqliteRepRepository>,
    pub orchestrator: Arc<SyncOrchestrator>,
    pub webhook: Arc<WebhookReceiver>,
    pub notifier: BroadcastNotifier,
}

impl AppContext {
    /// Open the database, apply migrations and wire the ports.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let sales = Arc::new(SqliteSalesRepository::new(Arc::clone(&db)));
        let reps = Arc::new(SqliteRepRepository::new(Arc::clone(&db)));
        let notifier = BroadcastNotifier::default();

        let tokens = Arc::new(ZohoTokenProvider::from_config(&config.provider)?);
        let estimates = Arc::new(ZohoEstimateClient::from_config(&config.provider)?);

        let orchestrator = Arc::new(
            SyncOrchestrator::new(
                Arc::clone(&config),
                tokens,
                estimates,
                reps.clone(),
                sales.clone(),
            )
            .with_notifier(Arc::new(notifier.clone())),
        );
        let webhook = Arc::new(
            WebhookReceiver::new(Arc::clone(&config), reps.clone(), sales.clone())
                .with_notifier(Arc::new(notifier.clone())),
        );

        info!(
            db_path = %db.path().display(),
            organizations = config.provider.organizations.len(),
            departments = config.departments.len(),
            "application context ready"
        );

        Ok(Self { config, db, sales, reps, orchestrator, webhook, notifier })
    }

    /// Upsert the reps listed in the configuration. Returns how many.
    pub async fn seed_reps(&self) -> Result<usize> {
        for rep in &self.config.seed_reps {
            self.reps.upsert_rep(rep).await?;
        }
        if !self.config.seed_reps.is_empty() {
            info!(count = self.config.seed_reps.len(), "seeded reps from configuration");
        }
        Ok(self.config.seed_reps.len())
    }

    /// A stopped scheduler that runs this context's orchestrator.
    pub fn sweep_scheduler(&self) -> SweepScheduler {
        SweepScheduler::new(
            SweepSchedulerConfig::from_sync_config(&self.config.sync),
            self.orchestrator.clone(),
        )
    }

    /// Store round trip, off the async runtime.
    pub async fn health_check(&self) -> Result<()> {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || db.health_check())
            .await
            .map_err(|err| QuoteSyncError::Internal(format!("health check task failed: {err}")))?
    }
}
