//! Main application orchestration.
//!
//! Owns the facade, the snapshot store and the two periodic tasks: price
//! reconciliation and the guard history sweep. Construction registers the
//! configured items and restores the last snapshot; shutdown writes a final
//! snapshot.

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::market::MarketPricing;
use bazaar_core::ItemId;
use bazaar_guard::{LogAlertSink, ManipulationGuard};
use bazaar_persistence::SnapshotStore;
use bazaar_telemetry::Metrics;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Main application.
pub struct Application {
    config: AppConfig,
    market: Arc<MarketPricing>,
    store: Arc<SnapshotStore>,
}

impl Application {
    /// Build the service: validate config, register items, restore the
    /// last snapshot.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let guard = Arc::new(ManipulationGuard::new(
            config.guard.clone(),
            Arc::new(LogAlertSink),
        ));
        let market = Arc::new(MarketPricing::new(config.pricing.clone(), guard)?);
        let store = Arc::new(SnapshotStore::new(&config.persistence.data_dir));

        for item in &config.items {
            // A rejected item keeps the rest of the catalog alive.
            if let Err(e) = market.register_item(
                ItemId::new(&item.id),
                item.base_price,
                item.min_price,
                item.max_price,
            ) {
                error!(item = %item.id, %e, "Item registration rejected");
            }
        }

        match store.load() {
            Ok(records) => market.restore_quotes(&records),
            Err(e) => warn!(%e, "Snapshot load failed, starting from base prices"),
        }

        Ok(Self {
            config,
            market,
            store,
        })
    }

    pub fn market(&self) -> Arc<MarketPricing> {
        self.market.clone()
    }

    /// Run the periodic tasks until shutdown.
    pub async fn run(self) -> AppResult<()> {
        info!(
            items = self.config.items.len(),
            interval_min = self.config.pricing.update_interval_minutes,
            "Starting bazaar pricing engine"
        );

        let reconcile_period = self.config.pricing.update_interval();
        let sweep_period = Duration::from_secs(self.config.guard.sweep_interval_seconds);

        // Skip the immediate first tick; there is nothing to reconcile yet.
        let start = tokio::time::Instant::now();
        let mut reconcile_interval = tokio::time::interval_at(start + reconcile_period, reconcile_period);
        let mut sweep_interval = tokio::time::interval_at(start + sweep_period, sweep_period);

        loop {
            tokio::select! {
                _ = reconcile_interval.tick() => {
                    let records = self.market.reconcile_now(Utc::now());
                    self.persist(records);
                }

                _ = sweep_interval.tick() => {
                    self.market.sweep_guard(Utc::now());
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        // Final snapshot so a restart resumes from current prices.
        let records = self.market.snapshot_records(Utc::now());
        if let Err(e) = self.store.save(&records) {
            error!(%e, "Final snapshot failed");
            Metrics::snapshot_failed();
        }
        info!("Shut down");
        Ok(())
    }

    /// Persist a cycle snapshot off the scheduling path.
    ///
    /// Fire-and-forget: a failure is logged and the next cycle retries with
    /// fresh state; in-memory prices stay authoritative.
    fn persist(&self, records: Vec<bazaar_core::PriceSnapshotRecord>) {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = store.save(&records) {
                error!(%e, "Snapshot save failed");
                Metrics::snapshot_failed();
            }
        });
    }
}
