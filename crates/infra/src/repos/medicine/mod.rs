mod inmemory;
mod postgres;

use dosetrack_domain::{Medicine, ID};
pub use inmemory::InMemoryMedicineRepo;
pub use postgres::PostgresMedicineRepo;

#[async_trait::async_trait]
pub trait IMedicineRepo: Send + Sync {
    async fn insert(&self, medicine: &Medicine) -> anyhow::Result<()>;
    async fn save(&self, medicine: &Medicine) -> anyhow::Result<()>;
    async fn find(&self, medicine_id: &ID) -> Option<Medicine>;
    async fn find_many(&self, medicine_ids: &[ID]) -> Vec<Medicine>;
    /// Medicines for the user that are not soft deleted
    async fn find_active_by_user(&self, user_id: &ID) -> Vec<Medicine>;
}
