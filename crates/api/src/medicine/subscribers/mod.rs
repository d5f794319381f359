use super::{
    create_medicine::{CreateMedicineUseCase, UseCaseRes as CreateMedicineRes},
    delete_medicine::{DeleteMedicineUseCase, UseCaseRes as DeleteMedicineRes},
    update_medicine::{UpdateMedicineUseCase, UseCaseRes as UpdateMedicineRes},
};
use crate::instance::sync_instances::{SyncInstancesTrigger, SyncInstancesUseCase};
use crate::shared::usecase::{execute, Subscriber};

pub struct SyncInstancesOnMedicineCreated;

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateMedicineUseCase> for SyncInstancesOnMedicineCreated {
    async fn notify(&self, e: &CreateMedicineRes, ctx: &dosetrack_infra::DoseTrackContext) {
        let sync_instances = SyncInstancesUseCase {
            request: SyncInstancesTrigger::ScheduleSaved {
                created: e.schedules.clone(),
                replaced: Vec::new(),
            },
        };

        // Sideeffect, ignore result
        let _ = execute(sync_instances, ctx).await;
    }
}

pub struct SyncInstancesOnMedicineUpdated;

#[async_trait::async_trait(?Send)]
impl Subscriber<UpdateMedicineUseCase> for SyncInstancesOnMedicineUpdated {
    async fn notify(&self, e: &UpdateMedicineRes, ctx: &dosetrack_infra::DoseTrackContext) {
        let sync_instances = SyncInstancesUseCase {
            request: SyncInstancesTrigger::ScheduleSaved {
                created: e.schedules.clone(),
                replaced: e.replaced.clone(),
            },
        };

        // Sideeffect, ignore result
        let _ = execute(sync_instances, ctx).await;
    }
}

pub struct SyncInstancesOnMedicineDeleted;

#[async_trait::async_trait(?Send)]
impl Subscriber<DeleteMedicineUseCase> for SyncInstancesOnMedicineDeleted {
    async fn notify(&self, e: &DeleteMedicineRes, ctx: &dosetrack_infra::DoseTrackContext) {
        let sync_instances = SyncInstancesUseCase {
            request: SyncInstancesTrigger::ScheduleSaved {
                created: Vec::new(),
                replaced: e.schedules.iter().map(|s| s.id.clone()).collect(),
            },
        };

        // Sideeffect, ignore result
        let _ = execute(sync_instances, ctx).await;
    }
}
