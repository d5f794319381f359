mod inmemory;
mod postgres;

use dosetrack_domain::{DoseSchedule, ID};
pub use inmemory::InMemoryScheduleRepo;
pub use postgres::PostgresScheduleRepo;

#[async_trait::async_trait]
pub trait IScheduleRepo: Send + Sync {
    async fn insert(&self, schedule: &DoseSchedule) -> anyhow::Result<()>;
    async fn save(&self, schedule: &DoseSchedule) -> anyhow::Result<()>;
    async fn find(&self, schedule_id: &ID) -> Option<DoseSchedule>;
    async fn find_many(&self, schedule_ids: &[ID]) -> Vec<DoseSchedule>;
    async fn find_by_medicine(&self, medicine_id: &ID) -> Vec<DoseSchedule>;
    /// All schedules that are not soft deleted, used by the daily
    /// window roll
    async fn find_active(&self) -> Vec<DoseSchedule>;
}
