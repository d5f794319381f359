mod channel;
mod dispatch_log;
mod dose_instance;
mod indicator_cache;
mod medicine;
mod schedule;
mod shared;

use channel::{INotificationChannelRepo, InMemoryNotificationChannelRepo, PostgresNotificationChannelRepo};
use dispatch_log::{IDispatchLogRepo, InMemoryDispatchLogRepo, PostgresDispatchLogRepo};
use dose_instance::{IDoseInstanceRepo, InMemoryDoseInstanceRepo, PostgresDoseInstanceRepo};
use indicator_cache::{IIndicatorCacheRepo, InMemoryIndicatorCacheRepo};
use medicine::{IMedicineRepo, InMemoryMedicineRepo, PostgresMedicineRepo};
use schedule::{IScheduleRepo, InMemoryScheduleRepo, PostgresScheduleRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub medicines: Arc<dyn IMedicineRepo>,
    pub schedules: Arc<dyn IScheduleRepo>,
    pub dose_instances: Arc<dyn IDoseInstanceRepo>,
    pub dispatch_log: Arc<dyn IDispatchLogRepo>,
    pub channels: Arc<dyn INotificationChannelRepo>,
    /// Not a durable store: computed month indicators are always
    /// rebuildable from dose instances, so the cache stays in process
    /// regardless of the storage backend
    pub indicator_cache: Arc<dyn IIndicatorCacheRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");
        Ok(Self {
            medicines: Arc::new(PostgresMedicineRepo::new(pool.clone())),
            schedules: Arc::new(PostgresScheduleRepo::new(pool.clone())),
            dose_instances: Arc::new(PostgresDoseInstanceRepo::new(pool.clone())),
            dispatch_log: Arc::new(PostgresDispatchLogRepo::new(pool.clone())),
            channels: Arc::new(PostgresNotificationChannelRepo::new(pool)),
            indicator_cache: Arc::new(InMemoryIndicatorCacheRepo::new()),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            medicines: Arc::new(InMemoryMedicineRepo::new()),
            schedules: Arc::new(InMemoryScheduleRepo::new()),
            dose_instances: Arc::new(InMemoryDoseInstanceRepo::new()),
            dispatch_log: Arc::new(InMemoryDispatchLogRepo::new()),
            channels: Arc::new(InMemoryNotificationChannelRepo::new()),
            indicator_cache: Arc::new(InMemoryIndicatorCacheRepo::new()),
        }
    }
}
