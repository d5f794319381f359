use super::IDispatchLogRepo;
use crate::repos::shared::inmemory_repo::*;
use dosetrack_domain::{DispatchRecord, ID};

pub struct InMemoryDispatchLogRepo {
    records: std::sync::Mutex<Vec<DispatchRecord>>,
}

impl InMemoryDispatchLogRepo {
    pub fn new() -> Self {
        Self {
            records: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IDispatchLogRepo for InMemoryDispatchLogRepo {
    async fn insert(&self, record: &DispatchRecord) -> anyhow::Result<bool> {
        let mut records = self.records.lock().unwrap();
        let occupied = records
            .iter()
            .any(|r| r.instance_id == record.instance_id && r.kind == record.kind);
        if occupied {
            return Ok(false);
        }
        records.push(record.clone());
        Ok(true)
    }

    async fn find_by_instance(&self, instance_id: &ID) -> Vec<DispatchRecord> {
        find_by(&self.records, |r| r.instance_id == *instance_id)
    }
}
