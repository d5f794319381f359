mod inmemory;
mod postgres;

use dosetrack_domain::{Day, DoseInstance, ID};
pub use inmemory::InMemoryDoseInstanceRepo;
pub use postgres::PostgresDoseInstanceRepo;

#[async_trait::async_trait]
pub trait IDoseInstanceRepo: Send + Sync {
    /// Inserts the instance unless its `(schedule_id, date)` key is
    /// already occupied. Returns whether a row was created; a conflict
    /// is a no-op success so that regeneration never overwrites an
    /// instance that has already been acted upon.
    async fn upsert(&self, instance: &DoseInstance) -> anyhow::Result<bool>;
    async fn save(&self, instance: &DoseInstance) -> anyhow::Result<()>;
    async fn find(&self, instance_id: &ID) -> Option<DoseInstance>;
    /// Non deleted instances for the user with a date in `[from, to]`
    async fn find_by_user_in_range(&self, user_id: &ID, from: Day, to: Day) -> Vec<DoseInstance>;
    /// Non deleted instances still in scheduled status on any of the
    /// given dates, the candidate set for a dispatch scan
    async fn find_scheduled_in_dates(&self, dates: &[Day]) -> Vec<DoseInstance>;
    /// Removes instances of the given schedules with `date >= from` and
    /// returns the removed rows. Instances dated before `from` are the
    /// historical record and are never touched by this.
    async fn delete_from(&self, schedule_ids: &[ID], from: Day) -> anyhow::Result<Vec<DoseInstance>>;
}
