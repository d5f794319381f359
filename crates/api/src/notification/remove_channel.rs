use crate::error::DoseTrackError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use dosetrack_api_structs::remove_channel::*;
use dosetrack_domain::{NotificationChannel, ID};
use dosetrack_infra::DoseTrackContext;

pub async fn remove_channel_controller(
    http_req: actix_web::HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<DoseTrackContext>,
) -> Result<HttpResponse, DoseTrackError> {
    let user_id = protect_route(&http_req)?;

    let usecase = RemoveChannelUseCase {
        user_id,
        channel_id: path.channel_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|channel| HttpResponse::Ok().json(APIResponse::new(channel)))
        .map_err(DoseTrackError::from)
}

#[derive(Debug)]
pub struct RemoveChannelUseCase {
    pub user_id: ID,
    pub channel_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    NotOwner,
}

impl From<UseCaseError> for DoseTrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(channel_id) => Self::NotFound(format!(
                "The notification channel with id: {}, was not found.",
                channel_id
            )),
            UseCaseError::NotOwner => {
                Self::Forbidden("The notification channel belongs to another user".into())
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for RemoveChannelUseCase {
    type Response = NotificationChannel;

    type Error = UseCaseError;

    const NAME: &'static str = "RemoveChannel";

    async fn execute(&mut self, ctx: &DoseTrackContext) -> Result<Self::Response, Self::Error> {
        let channel = match ctx.repos.channels.find(&self.channel_id).await {
            Some(channel) => channel,
            None => return Err(UseCaseError::NotFound(self.channel_id.clone())),
        };
        if channel.user_id != self.user_id {
            return Err(UseCaseError::NotOwner);
        }

        ctx.repos.channels.delete(&channel.id).await;
        Ok(channel)
    }
}
