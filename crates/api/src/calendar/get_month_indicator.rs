use crate::error::DoseTrackError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use dosetrack_api_structs::get_month_indicator::*;
use dosetrack_domain::{build_day_indicators, Day, DayDot, YearMonth, ID};
use dosetrack_infra::DoseTrackContext;
use std::collections::{BTreeMap, HashMap};

pub async fn get_month_indicator_controller(
    http_req: actix_web::HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<DoseTrackContext>,
) -> Result<HttpResponse, DoseTrackError> {
    let user_id = protect_route(&http_req)?;

    let usecase = GetMonthIndicatorUseCase {
        user_id,
        year_month: path.year_month.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|indicators| HttpResponse::Ok().json(APIResponse::new(indicators)))
        .map_err(DoseTrackError::from)
}

/// Builds the calendar dots for one month of one user. Results are
/// cached per `(user, month)` with a ttl and dropped eagerly whenever an
/// instance of the month is written.
#[derive(Debug)]
pub struct GetMonthIndicatorUseCase {
    pub user_id: ID,
    pub year_month: String,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidYearMonth(String),
}

impl From<UseCaseError> for DoseTrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidYearMonth(s) => Self::BadClientData(format!(
                "Invalid year month: {}. Expected format is YYYY-MM.",
                s
            )),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetMonthIndicatorUseCase {
    type Response = BTreeMap<Day, Vec<DayDot>>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetMonthIndicator";

    async fn execute(&mut self, ctx: &DoseTrackContext) -> Result<Self::Response, Self::Error> {
        let period: YearMonth = self
            .year_month
            .parse()
            .map_err(|_| UseCaseError::InvalidYearMonth(self.year_month.clone()))?;

        let now = ctx.sys.get_timestamp_millis();
        if let Some(indicators) = ctx
            .repos
            .indicator_cache
            .get(&self.user_id, &period, now)
            .await
        {
            return Ok(indicators);
        }

        let instances = ctx
            .repos
            .dose_instances
            .find_by_user_in_range(&self.user_id, period.first_day(), period.last_day())
            .await;

        let schedule_ids = instances
            .iter()
            .map(|i| i.schedule_id.clone())
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let medicine_ids = instances
            .iter()
            .map(|i| i.medicine_id.clone())
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();

        let schedules: HashMap<_, _> = ctx
            .repos
            .schedules
            .find_many(&schedule_ids)
            .await
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let medicines: HashMap<_, _> = ctx
            .repos
            .medicines
            .find_many(&medicine_ids)
            .await
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();

        let indicators = build_day_indicators(&instances, &schedules, &medicines, now);

        ctx.repos
            .indicator_cache
            .set(
                &self.user_id,
                &period,
                indicators.clone(),
                now + ctx.config.indicator_cache_ttl_millis,
            )
            .await;

        Ok(indicators)
    }
}
