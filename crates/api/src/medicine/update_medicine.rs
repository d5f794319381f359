use super::create_medicine::parse_schedule_inputs;
use super::subscribers::SyncInstancesOnMedicineUpdated;
use crate::error::DoseTrackError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpResponse};
use dosetrack_api_structs::dtos::ScheduleInput;
use dosetrack_api_structs::update_medicine::*;
use dosetrack_domain::{DoseSchedule, Medicine, ID};
use dosetrack_infra::DoseTrackContext;

pub async fn update_medicine_controller(
    http_req: actix_web::HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<DoseTrackContext>,
) -> Result<HttpResponse, DoseTrackError> {
    let user_id = protect_route(&http_req)?;

    let body = body.0;
    let usecase = UpdateMedicineUseCase {
        user_id,
        medicine_id: path.medicine_id.clone(),
        name: body.name,
        notes: body.notes,
        schedules: body.schedules,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res.medicine, res.schedules)))
        .map_err(DoseTrackError::from)
}

/// Edits a medicine. The previous dose schedules are soft deleted and
/// replaced by entirely new rows even when their values are unchanged;
/// the subscriber then drops the replaced schedules' future instances
/// and materializes the new ones. Historical instances keep referencing
/// the soft deleted schedule rows.
#[derive(Debug)]
pub struct UpdateMedicineUseCase {
    pub user_id: ID,
    pub medicine_id: ID,
    pub name: String,
    pub notes: Option<String>,
    pub schedules: Vec<ScheduleInput>,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    NotOwner,
    Invalid(super::create_medicine::UseCaseError),
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
            UseCaseError::Invalid(e) => e.into(),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub medicine: Medicine,
    pub schedules: Vec<DoseSchedule>,
    pub replaced: Vec<ID>,
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateMedicineUseCase {
    type Response = UseCaseRes;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateMedicine";

    async fn execute(&mut self, ctx: &DoseTrackContext) -> Result<Self::Response, Self::Error> {
        let mut medicine = match ctx.repos.medicines.find(&self.medicine_id).await {
            Some(medicine) if !medicine.is_deleted() => medicine,
            _ => return Err(UseCaseError::NotFound(self.medicine_id.clone())),
        };
        if medicine.user_id != self.user_id {
            return Err(UseCaseError::NotOwner);
        }
        if self.name.trim().is_empty() {
            return Err(UseCaseError::Invalid(
                super::create_medicine::UseCaseError::EmptyName,
            ));
        }
        let schedules = parse_schedule_inputs(&self.schedules, &medicine.id, &self.user_id)
            .map_err(UseCaseError::Invalid)?;

        medicine.name = self.name.trim().to_string();
        medicine.notes = self.notes.clone();
        ctx.repos
            .medicines
            .save(&medicine)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let now = ctx.sys.get_timestamp_millis();
        let old_schedules = ctx.repos.schedules.find_by_medicine(&medicine.id).await;
        let mut replaced = Vec::new();
        for mut old in old_schedules {
            if old.is_deleted() {
                continue;
            }
            old.deleted_at = Some(now);
            ctx.repos
                .schedules
                .save(&old)
                .await
                .map_err(|_| UseCaseError::StorageError)?;
            replaced.push(old.id);
        }

        for schedule in &schedules {
            ctx.repos
                .schedules
                .insert(schedule)
                .await
                .map_err(|_| UseCaseError::StorageError)?;
        }

        Ok(UseCaseRes {
            medicine,
            schedules,
            replaced,
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(SyncInstancesOnMedicineUpdated)]
    }
}
