use super::IScheduleRepo;
use crate::repos::shared::inmemory_repo::*;
use dosetrack_domain::{DoseSchedule, ID};

pub struct InMemoryScheduleRepo {
    schedules: std::sync::Mutex<Vec<DoseSchedule>>,
}

impl InMemoryScheduleRepo {
    pub fn new() -> Self {
        Self {
            schedules: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IScheduleRepo for InMemoryScheduleRepo {
    async fn insert(&self, schedule: &DoseSchedule) -> anyhow::Result<()> {
        insert(schedule, &self.schedules);
        Ok(())
    }

    async fn save(&self, schedule: &DoseSchedule) -> anyhow::Result<()> {
        save(schedule, &self.schedules);
        Ok(())
    }

    async fn find(&self, schedule_id: &ID) -> Option<DoseSchedule> {
        find(schedule_id, &self.schedules)
    }

    async fn find_many(&self, schedule_ids: &[ID]) -> Vec<DoseSchedule> {
        find_by(&self.schedules, |s| schedule_ids.contains(&s.id))
    }

    async fn find_by_medicine(&self, medicine_id: &ID) -> Vec<DoseSchedule> {
        find_by(&self.schedules, |s| s.medicine_id == *medicine_id)
    }

    async fn find_active(&self) -> Vec<DoseSchedule> {
        find_by(&self.schedules, |s| s.deleted_at.is_none())
    }
}
