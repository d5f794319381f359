use crate::error::DoseTrackError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use dosetrack_api_structs::set_intake_status::*;
use dosetrack_domain::{
    DoseInstance, IntakeStatus, InvalidStatusTransition, Medicine, ID,
};
use dosetrack_infra::DoseTrackContext;

pub async fn set_intake_status_controller(
    http_req: actix_web::HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<DoseTrackContext>,
) -> Result<HttpResponse, DoseTrackError> {
    let user_id = protect_route(&http_req)?;

    let usecase = SetIntakeStatusUseCase {
        user_id,
        instance_id: path.instance_id.clone(),
        status: body.0.status,
        checked_at: body.0.checked_at,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res.instance, res.medicine.name)))
        .map_err(DoseTrackError::from)
}

/// Applies one user driven status transition to a `DoseInstance` and
/// synchronously drops the cached indicators of the touched month
/// before the write is acknowledged
#[derive(Debug)]
pub struct SetIntakeStatusUseCase {
    pub user_id: ID,
    pub instance_id: ID,
    pub status: IntakeStatus,
    pub checked_at: Option<i64>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    NotOwner,
    Gone,
    IllegalTransition(InvalidStatusTransition),
    StorageError,
}

impl From<UseCaseError> for DoseTrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(instance_id) => Self::NotFound(format!(
                "The dose instance with id: {}, was not found.",
                instance_id
            )),
            UseCaseError::NotOwner => {
                Self::Forbidden("The dose instance belongs to another user".into())
            }
            UseCaseError::Gone => Self::Forbidden(
                "The medicine or schedule of this dose instance has been deleted".into(),
            ),
            UseCaseError::IllegalTransition(e) => Self::BadClientData(format!("{}", e)),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub instance: DoseInstance,
    pub medicine: Medicine,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SetIntakeStatusUseCase {
    type Response = UseCaseRes;

    type Error = UseCaseError;

    const NAME: &'static str = "SetIntakeStatus";

    async fn execute(&mut self, ctx: &DoseTrackContext) -> Result<Self::Response, Self::Error> {
        let mut instance = match ctx.repos.dose_instances.find(&self.instance_id).await {
            Some(instance) if !instance.is_deleted() => instance,
            _ => return Err(UseCaseError::NotFound(self.instance_id.clone())),
        };
        if instance.user_id != self.user_id {
            return Err(UseCaseError::NotOwner);
        }

        // Transitions on a soft deleted lineage are rejected at this
        // write boundary, the state machine itself does not know about
        // deletions
        let schedule = ctx.repos.schedules.find(&instance.schedule_id).await;
        if !schedule.map(|s| !s.is_deleted()).unwrap_or(false) {
            return Err(UseCaseError::Gone);
        }
        let medicine = match ctx.repos.medicines.find(&instance.medicine_id).await {
            Some(medicine) if !medicine.is_deleted() => medicine,
            _ => return Err(UseCaseError::Gone),
        };

        let now = ctx.sys.get_timestamp_millis();
        let checked_at = self.checked_at.unwrap_or(now);
        instance
            .mark(self.status, checked_at)
            .map_err(UseCaseError::IllegalTransition)?;

        ctx.repos
            .dose_instances
            .save(&instance)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        ctx.repos
            .indicator_cache
            .invalidate(&instance.user_id, &instance.date.year_month())
            .await;

        Ok(UseCaseRes { instance, medicine })
    }
}
