mod inmemory;
mod postgres;

use dosetrack_domain::{DispatchRecord, ID};
pub use inmemory::InMemoryDispatchLogRepo;
pub use postgres::PostgresDispatchLogRepo;

#[async_trait::async_trait]
pub trait IDispatchLogRepo: Send + Sync {
    /// Records the dispatch unless the `(instance_id, kind)` pair was
    /// already recorded. Returns whether the record was created; callers
    /// must skip the send when it was not, which is what keeps
    /// overlapping scan cycles from duplicate notifying.
    async fn insert(&self, record: &DispatchRecord) -> anyhow::Result<bool>;
    async fn find_by_instance(&self, instance_id: &ID) -> Vec<DispatchRecord>;
}
