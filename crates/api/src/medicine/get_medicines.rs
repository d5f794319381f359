use crate::error::DoseTrackError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use dosetrack_api_structs::get_medicines::*;
use dosetrack_domain::{DoseSchedule, Medicine, ID};
use dosetrack_infra::DoseTrackContext;

pub async fn get_medicines_controller(
    http_req: actix_web::HttpRequest,
    ctx: web::Data<DoseTrackContext>,
) -> Result<HttpResponse, DoseTrackError> {
    let user_id = protect_route(&http_req)?;

    let usecase = GetMedicinesUseCase { user_id };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res)))
        .map_err(DoseTrackError::from)
}

#[derive(Debug)]
pub struct GetMedicinesUseCase {
    pub user_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {}

impl From<UseCaseError> for DoseTrackError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetMedicinesUseCase {
    type Response = Vec<(Medicine, Vec<DoseSchedule>)>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetMedicines";

    async fn execute(&mut self, ctx: &DoseTrackContext) -> Result<Self::Response, Self::Error> {
        let medicines = ctx.repos.medicines.find_active_by_user(&self.user_id).await;

        let mut res = Vec::with_capacity(medicines.len());
        for medicine in medicines {
            let schedules = ctx
                .repos
                .schedules
                .find_by_medicine(&medicine.id)
                .await
                .into_iter()
                .filter(|s| !s.is_deleted())
                .collect();
            res.push((medicine, schedules));
        }

        Ok(res)
    }
}
