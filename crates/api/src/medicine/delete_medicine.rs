use super::subscribers::SyncInstancesOnMedicineDeleted;
use crate::error::DoseTrackError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpResponse};
use dosetrack_api_structs::delete_medicine::*;
use dosetrack_domain::{DoseSchedule, Medicine, ID};
use dosetrack_infra::DoseTrackContext;

pub async fn delete_medicine_controller(
    http_req: actix_web::HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<DoseTrackContext>,
) -> Result<HttpResponse, DoseTrackError> {
    let user_id = protect_route(&http_req)?;

    let usecase = DeleteMedicineUseCase {
        user_id,
        medicine_id: path.medicine_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res.medicine, res.schedules)))
        .map_err(DoseTrackError::from)
}

/// Soft deletes a medicine and its schedules. Upcoming instances are
/// removed by the subscriber; instances with a logged intake stay
/// around as history and are only hidden by the read side filters.
#[derive(Debug)]
pub struct DeleteMedicineUseCase {
    pub user_id: ID,
    pub medicine_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    NotOwner,
    StorageError,
}

impl From<UseCaseError> for DoseTrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(medicine_id) => Self::NotFound(format!(
                "The medicine with id: {}, was not found.",
                medicine_id
            )),
            UseCaseError::NotOwner => {
                Self::Forbidden("The medicine belongs to another user".into())
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub medicine: Medicine,
    pub schedules: Vec<DoseSchedule>,
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteMedicineUseCase {
    type Response = UseCaseRes;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteMedicine";

    async fn execute(&mut self, ctx: &DoseTrackContext) -> Result<Self::Response, Self::Error> {
        let mut medicine = match ctx.repos.medicines.find(&self.medicine_id).await {
            Some(medicine) if !medicine.is_deleted() => medicine,
            _ => return Err(UseCaseError::NotFound(self.medicine_id.clone())),
        };
        if medicine.user_id != self.user_id {
            return Err(UseCaseError::NotOwner);
        }

        let now = ctx.sys.get_timestamp_millis();
        medicine.deleted_at = Some(now);
        ctx.repos
            .medicines
            .save(&medicine)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let mut schedules = Vec::new();
        for mut schedule in ctx.repos.schedules.find_by_medicine(&medicine.id).await {
            if schedule.is_deleted() {
                continue;
            }
            schedule.deleted_at = Some(now);
            ctx.repos
                .schedules
                .save(&schedule)
                .await
                .map_err(|_| UseCaseError::StorageError)?;
            schedules.push(schedule);
        }

        Ok(UseCaseRes {
            medicine,
            schedules,
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(SyncInstancesOnMedicineDeleted)]
    }
}

#[cfg(test)]
mod test {
    use super::super::create_medicine::CreateMedicineUseCase;
    use super::*;
    use dosetrack_api_structs::dtos::ScheduleInput;
    use dosetrack_domain::{Day, IntakeStatus, RecurrencePattern, RecurrenceRule};
    use dosetrack_infra::{setup_context, ISys};
    use std::sync::Arc;

    struct StaticTimeSys;
    impl ISys for StaticTimeSys {
        fn get_timestamp_millis(&self) -> i64 {
            // 2025-01-01T12:00:00Z
            1735732800000
        }
    }

    async fn setup() -> (DoseTrackContext, Medicine) {
        let mut ctx = setup_context().await;
        ctx.sys = Arc::new(StaticTimeSys {});

        let usecase = CreateMedicineUseCase {
            user_id: ID::default(),
            name: "aspirin".into(),
            notes: None,
            schedules: vec![ScheduleInput {
                time: "08:00".into(),
                recurrence: RecurrencePattern {
                    rule: RecurrenceRule::Daily,
                    timezone: chrono_tz::UTC,
                },
                notify_enabled: true,
            }],
        };
        let res = execute(usecase, &ctx).await.unwrap();
        (ctx, res.medicine)
    }

    #[actix_web::test]
    async fn it_soft_deletes_the_medicine_and_drops_upcoming_instances() {
        let (ctx, medicine) = setup().await;
        let user_id = medicine.user_id.clone();

        // A dose taken on an earlier day, part of the historical record
        let schedule = ctx
            .repos
            .schedules
            .find_by_medicine(&medicine.id)
            .await
            .remove(0);
        let mut past = dosetrack_domain::DoseInstance::new(&schedule, Day::new(2024, 12, 28));
        past.mark(IntakeStatus::Taken, 7).unwrap();
        ctx.repos.dose_instances.upsert(&past).await.unwrap();

        let usecase = DeleteMedicineUseCase {
            user_id: user_id.clone(),
            medicine_id: medicine.id.clone(),
        };
        let res = execute(usecase, &ctx).await.unwrap();
        assert!(res.medicine.is_deleted());
        assert!(res.schedules.iter().all(|s| s.is_deleted()));

        // Instances from today onwards are gone, history survives
        let remaining = ctx
            .repos
            .dose_instances
            .find_by_user_in_range(&user_id, Day::new(2024, 1, 1), Day::new(2025, 12, 31))
            .await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].date, Day::new(2024, 12, 28));
        assert_eq!(remaining[0].status, IntakeStatus::Taken);
    }

    #[actix_web::test]
    async fn it_rejects_double_deletion() {
        let (ctx, medicine) = setup().await;

        let usecase = DeleteMedicineUseCase {
            user_id: medicine.user_id.clone(),
            medicine_id: medicine.id.clone(),
        };
        execute(usecase, &ctx).await.unwrap();

        let usecase = DeleteMedicineUseCase {
            user_id: medicine.user_id.clone(),
            medicine_id: medicine.id.clone(),
        };
        assert!(matches!(
            execute(usecase, &ctx).await.unwrap_err(),
            UseCaseError::NotFound(_)
        ));
    }
}
