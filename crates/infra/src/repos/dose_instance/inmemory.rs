use super::IDoseInstanceRepo;
use crate::repos::shared::inmemory_repo::*;
use dosetrack_domain::{Day, DoseInstance, IntakeStatus, ID};

pub struct InMemoryDoseInstanceRepo {
    instances: std::sync::Mutex<Vec<DoseInstance>>,
}

impl InMemoryDoseInstanceRepo {
    pub fn new() -> Self {
        Self {
            instances: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IDoseInstanceRepo for InMemoryDoseInstanceRepo {
    async fn upsert(&self, instance: &DoseInstance) -> anyhow::Result<bool> {
        let mut instances = self.instances.lock().unwrap();
        let occupied = instances
            .iter()
            .any(|i| i.schedule_id == instance.schedule_id && i.date == instance.date);
        if occupied {
            return Ok(false);
        }
        instances.push(instance.clone());
        Ok(true)
    }

    async fn save(&self, instance: &DoseInstance) -> anyhow::Result<()> {
        save(instance, &self.instances);
        Ok(())
    }

    async fn find(&self, instance_id: &ID) -> Option<DoseInstance> {
        find(instance_id, &self.instances)
    }

    async fn find_by_user_in_range(&self, user_id: &ID, from: Day, to: Day) -> Vec<DoseInstance> {
        find_by(&self.instances, |i| {
            i.user_id == *user_id && i.deleted_at.is_none() && i.date >= from && i.date <= to
        })
    }

    async fn find_scheduled_in_dates(&self, dates: &[Day]) -> Vec<DoseInstance> {
        find_by(&self.instances, |i| {
            i.deleted_at.is_none()
                && i.status == IntakeStatus::Scheduled
                && dates.contains(&i.date)
        })
    }

    async fn delete_from(
        &self,
        schedule_ids: &[ID],
        from: Day,
    ) -> anyhow::Result<Vec<DoseInstance>> {
        Ok(find_and_delete_by(&self.instances, |i| {
            schedule_ids.contains(&i.schedule_id) && i.date >= from
        }))
    }
}
