use crate::error::DoseTrackError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use dosetrack_api_structs::register_channel::*;
use dosetrack_domain::{InvalidChannelEndpointError, NotificationChannel, ID};
use dosetrack_infra::DoseTrackContext;

pub async fn register_channel_controller(
    http_req: actix_web::HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<DoseTrackContext>,
) -> Result<HttpResponse, DoseTrackError> {
    let user_id = protect_route(&http_req)?;

    let usecase = RegisterChannelUseCase {
        user_id,
        endpoint: body.0.endpoint,
    };

    execute(usecase, &ctx)
        .await
        .map(|channel| HttpResponse::Created().json(APIResponse::new(channel)))
        .map_err(DoseTrackError::from)
}

#[derive(Debug)]
pub struct RegisterChannelUseCase {
    pub user_id: ID,
    pub endpoint: String,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidEndpoint(InvalidChannelEndpointError),
    StorageError,
}

impl From<UseCaseError> for DoseTrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidEndpoint(e) => Self::BadClientData(format!("{}", e)),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for RegisterChannelUseCase {
    type Response = NotificationChannel;

    type Error = UseCaseError;

    const NAME: &'static str = "RegisterChannel";

    async fn execute(&mut self, ctx: &DoseTrackContext) -> Result<Self::Response, Self::Error> {
        let endpoint = NotificationChannel::parse_endpoint(&self.endpoint)
            .map_err(UseCaseError::InvalidEndpoint)?;

        let channel = NotificationChannel::new(
            self.user_id.clone(),
            endpoint,
            ctx.sys.get_timestamp_millis(),
        );
        ctx.repos
            .channels
            .insert(&channel)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(channel)
    }
}
