use super::subscribers::SyncInstancesOnMedicineCreated;
use crate::error::DoseTrackError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpResponse};
use dosetrack_api_structs::create_medicine::*;
use dosetrack_api_structs::dtos::ScheduleInput;
use dosetrack_domain::{
    DoseSchedule, InvalidRecurrenceError, InvalidTimeOfDayError, Medicine, TimeOfDay, ID,
};
use dosetrack_infra::DoseTrackContext;

pub async fn create_medicine_controller(
    http_req: actix_web::HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<DoseTrackContext>,
) -> Result<HttpResponse, DoseTrackError> {
    let user_id = protect_route(&http_req)?;

    let body = body.0;
    let usecase = CreateMedicineUseCase {
        user_id,
        name: body.name,
        notes: body.notes,
        schedules: body.schedules,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Created().json(APIResponse::new(res.medicine, res.schedules)))
        .map_err(DoseTrackError::from)
}

#[derive(Debug)]
pub struct CreateMedicineUseCase {
    pub user_id: ID,
    pub name: String,
    pub notes: Option<String>,
    pub schedules: Vec<ScheduleInput>,
}

#[derive(Debug)]
pub enum UseCaseError {
    EmptyName,
    NoSchedules,
    InvalidTimeOfDay(InvalidTimeOfDayError),
    InvalidRecurrence(InvalidRecurrenceError),
    StorageError,
}

impl From<UseCaseError> for DoseTrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyName => Self::BadClientData("Medicine name can not be empty".into()),
            UseCaseError::NoSchedules => {
                Self::BadClientData("A medicine needs at least one dose schedule".into())
            }
            UseCaseError::InvalidTimeOfDay(e) => Self::BadClientData(format!("{}", e)),
            UseCaseError::InvalidRecurrence(e) => Self::BadClientData(format!("{}", e)),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

/// Validates the submitted dose time slots before anything is written
pub fn parse_schedule_inputs(
    inputs: &[ScheduleInput],
    medicine_id: &ID,
    user_id: &ID,
) -> Result<Vec<DoseSchedule>, UseCaseError> {
    if inputs.is_empty() {
        return Err(UseCaseError::NoSchedules);
    }
    let mut schedules = Vec::with_capacity(inputs.len());
    for input in inputs {
        let time = input
            .time
            .parse::<TimeOfDay>()
            .map_err(UseCaseError::InvalidTimeOfDay)?;
        input
            .recurrence
            .validate()
            .map_err(UseCaseError::InvalidRecurrence)?;
        schedules.push(DoseSchedule::new(
            medicine_id.clone(),
            user_id.clone(),
            time,
            input.recurrence.clone(),
            input.notify_enabled,
        ));
    }
    Ok(schedules)
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub medicine: Medicine,
    pub schedules: Vec<DoseSchedule>,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateMedicineUseCase {
    type Response = UseCaseRes;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateMedicine";

    async fn execute(&mut self, ctx: &DoseTrackContext) -> Result<Self::Response, Self::Error> {
        if self.name.trim().is_empty() {
            return Err(UseCaseError::EmptyName);
        }

        let medicine = Medicine::new(
            self.user_id.clone(),
            self.name.trim().to_string(),
            self.notes.clone(),
        );
        let schedules = parse_schedule_inputs(&self.schedules, &medicine.id, &self.user_id)?;

        ctx.repos
            .medicines
            .insert(&medicine)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
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
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(SyncInstancesOnMedicineCreated)]
    }
}
