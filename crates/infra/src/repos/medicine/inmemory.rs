use super::IMedicineRepo;
use crate::repos::shared::inmemory_repo::*;
use dosetrack_domain::{Medicine, ID};

pub struct InMemoryMedicineRepo {
    medicines: std::sync::Mutex<Vec<Medicine>>,
}

impl InMemoryMedicineRepo {
    pub fn new() -> Self {
        Self {
            medicines: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IMedicineRepo for InMemoryMedicineRepo {
    async fn insert(&self, medicine: &Medicine) -> anyhow::Result<()> {
        insert(medicine, &self.medicines);
        Ok(())
    }

    async fn save(&self, medicine: &Medicine) -> anyhow::Result<()> {
        save(medicine, &self.medicines);
        Ok(())
    }

    async fn find(&self, medicine_id: &ID) -> Option<Medicine> {
        find(medicine_id, &self.medicines)
    }

    async fn find_many(&self, medicine_ids: &[ID]) -> Vec<Medicine> {
        find_by(&self.medicines, |m| medicine_ids.contains(&m.id))
    }

    async fn find_active_by_user(&self, user_id: &ID) -> Vec<Medicine> {
        find_by(&self.medicines, |m| {
            m.user_id == *user_id && m.deleted_at.is_none()
        })
    }
}
