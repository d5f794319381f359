use crate::error::DoseTrackError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use dosetrack_api_structs::dtos::DoseInstanceDTO;
use dosetrack_api_structs::get_day_detail::*;
use dosetrack_domain::{Day, ID};
use dosetrack_infra::DoseTrackContext;
use std::collections::HashMap;

pub async fn get_day_detail_controller(
    http_req: actix_web::HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<DoseTrackContext>,
) -> Result<HttpResponse, DoseTrackError> {
    let user_id = protect_route(&http_req)?;

    let usecase = GetDayDetailUseCase {
        user_id,
        date: path.date.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|instances| HttpResponse::Ok().json(APIResponse { instances }))
        .map_err(DoseTrackError::from)
}

/// Lists the dose instances of one civil date, with the lazily derived
/// status a reader should present
#[derive(Debug)]
pub struct GetDayDetailUseCase {
    pub user_id: ID,
    pub date: String,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidDate(String),
}

impl From<UseCaseError> for DoseTrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidDate(s) => Self::BadClientData(format!(
                "Invalid date: {}. Expected format is YYYY-MM-DD.",
                s
            )),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetDayDetailUseCase {
    type Response = Vec<DoseInstanceDTO>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetDayDetail";

    async fn execute(&mut self, ctx: &DoseTrackContext) -> Result<Self::Response, Self::Error> {
        let date: Day = self
            .date
            .parse()
            .map_err(|_| UseCaseError::InvalidDate(self.date.clone()))?;

        let instances = ctx
            .repos
            .dose_instances
            .find_by_user_in_range(&self.user_id, date, date)
            .await;

        let schedule_ids = instances
            .iter()
            .map(|i| i.schedule_id.clone())
            .collect::<Vec<_>>();
        let medicine_ids = instances
            .iter()
            .map(|i| i.medicine_id.clone())
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

        let now = ctx.sys.get_timestamp_millis();
        let mut details = instances
            .into_iter()
            .filter_map(|instance| {
                let schedule = schedules.get(&instance.schedule_id)?;
                let medicine = medicines.get(&instance.medicine_id)?;
                if schedule.is_deleted() || medicine.is_deleted() {
                    return None;
                }
                let status = instance.status_at(now, &schedule.recurrence.timezone);
                Some(DoseInstanceDTO::new(
                    instance,
                    medicine.name.clone(),
                    status,
                ))
            })
            .collect::<Vec<_>>();
        details.sort_by(|a, b| {
            a.time
                .cmp(&b.time)
                .then_with(|| a.medicine_name.cmp(&b.medicine_name))
        });

        Ok(details)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use dosetrack_domain::{
        DoseInstance, DoseSchedule, IntakeStatus, Medicine, RecurrencePattern, RecurrenceRule,
        TimeOfDay,
    };
    use dosetrack_infra::{setup_context, ISys};
    use std::sync::Arc;

    struct StaticTimeSys;
    impl ISys for StaticTimeSys {
        fn get_timestamp_millis(&self) -> i64 {
            // 2025-01-01T12:00:00Z
            1735732800000
        }
    }

    #[actix_web::test]
    async fn it_lists_the_day_sorted_by_time_with_derived_statuses() {
        let mut ctx = setup_context().await;
        ctx.sys = Arc::new(StaticTimeSys {});

        let medicine = Medicine::new(Default::default(), "aspirin".into(), None);
        ctx.repos.medicines.insert(&medicine).await.unwrap();
        let pattern = RecurrencePattern {
            rule: RecurrenceRule::Daily,
            timezone: chrono_tz::UTC,
        };
        let evening = DoseSchedule::new(
            medicine.id.clone(),
            medicine.user_id.clone(),
            TimeOfDay::new(20, 0).unwrap(),
            pattern.clone(),
            true,
        );
        let morning = DoseSchedule::new(
            medicine.id.clone(),
            medicine.user_id.clone(),
            TimeOfDay::new(8, 0).unwrap(),
            pattern,
            true,
        );
        ctx.repos.schedules.insert(&evening).await.unwrap();
        ctx.repos.schedules.insert(&morning).await.unwrap();

        let date = Day::new(2025, 1, 1);
        ctx.repos
            .dose_instances
            .upsert(&DoseInstance::new(&evening, date))
            .await
            .unwrap();
        ctx.repos
            .dose_instances
            .upsert(&DoseInstance::new(&morning, date))
            .await
            .unwrap();

        let usecase = GetDayDetailUseCase {
            user_id: medicine.user_id.clone(),
            date: "2025-01-01".into(),
        };
        let details = execute(usecase, &ctx).await.unwrap();
        assert_eq!(details.len(), 2);
        // Sorted by time of day
        assert_eq!(details[0].time, TimeOfDay::new(8, 0).unwrap());
        assert_eq!(details[1].time, TimeOfDay::new(20, 0).unwrap());
        // The 08:00 dose is way past its grace period at noon and the
        // untouched row reads as missed, the 20:00 one is still ahead
        assert_eq!(details[0].status, IntakeStatus::Missed);
        assert_eq!(details[1].status, IntakeStatus::Scheduled);
    }

    #[actix_web::test]
    async fn it_rejects_malformed_dates() {
        let ctx = setup_context().await;
        let usecase = GetDayDetailUseCase {
            user_id: Default::default(),
            date: "01-01-2025".into(),
        };
        assert!(matches!(
            execute(usecase, &ctx).await.unwrap_err(),
            UseCaseError::InvalidDate(_)
        ));
    }
}
