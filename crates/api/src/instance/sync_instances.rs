use crate::shared::usecase::UseCase;
use dosetrack_domain::{Day, DoseInstance, DoseSchedule, YearMonth, ID};
use dosetrack_infra::DoseTrackContext;
use std::collections::HashSet;
use tracing::{error, warn};

/// Materializes the rolling window of `DoseInstance`s for schedules and
/// removes future instances of schedules that were replaced or removed.
/// Generation is an upsert keyed on `(schedule_id, date)`, so re-running
/// it never duplicates instances and never overwrites one that has
/// already been acted upon. Instances dated before today are left alone
/// unconditionally.
#[derive(Debug)]
pub struct SyncInstancesUseCase {
    pub request: SyncInstancesTrigger,
}

#[derive(Debug)]
pub enum SyncInstancesTrigger {
    /// A medicine was saved: the given schedules are new and the listed
    /// schedule ids were soft deleted and must lose their future
    /// instances first
    ScheduleSaved {
        created: Vec<DoseSchedule>,
        replaced: Vec<ID>,
    },
    /// Periodic job that rolls the materialization window forward one
    /// day for every active schedule
    JobScheduler,
}

#[derive(Debug)]
pub enum UseCaseError {}

/// Aggregate outcome of one sync run. A failing schedule does not abort
/// generation for its siblings, it is only reported here.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub created: usize,
    pub deleted: usize,
    pub failed_schedules: Vec<ID>,
}

async fn delete_future_instances(
    replaced: &[ID],
    touched: &mut HashSet<(ID, YearMonth)>,
    report: &mut SyncReport,
    ctx: &DoseTrackContext,
) {
    let now = ctx.sys.get_timestamp_millis();
    let schedules = ctx.repos.schedules.find_many(replaced).await;
    if schedules.len() != replaced.len() {
        warn!(
            "Some replaced schedules could not be fetched, got {} of {}",
            schedules.len(),
            replaced.len()
        );
    }

    for schedule in schedules {
        let today = Day::from_timestamp(now, &schedule.recurrence.timezone);
        match ctx
            .repos
            .dose_instances
            .delete_from(&[schedule.id.clone()], today)
            .await
        {
            Ok(removed) => {
                report.deleted += removed.len();
                for instance in removed {
                    touched.insert((instance.user_id, instance.date.year_month()));
                }
            }
            Err(e) => {
                error!(
                    "Unable to delete future instances of schedule: {}, error: {:?}",
                    schedule.id, e
                );
                report.failed_schedules.push(schedule.id.clone());
            }
        }
    }
}

/// Upserts one instance for every due date of the schedule in
/// `[from, to]` inclusive and returns how many rows were actually
/// created
async fn materialize_schedule(
    schedule: &DoseSchedule,
    from: Day,
    to: Day,
    touched: &mut HashSet<(ID, YearMonth)>,
    ctx: &DoseTrackContext,
) -> anyhow::Result<usize> {
    let mut created = 0;
    let mut day_cursor = from;
    while day_cursor <= to {
        if schedule.recurrence.is_due(&day_cursor) {
            let instance = DoseInstance::new(schedule, day_cursor);
            if ctx.repos.dose_instances.upsert(&instance).await? {
                created += 1;
                touched.insert((instance.user_id, day_cursor.year_month()));
            }
        }
        day_cursor.inc();
    }
    Ok(created)
}

#[async_trait::async_trait(?Send)]
impl UseCase for SyncInstancesUseCase {
    type Response = SyncReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SyncInstances";

    async fn execute(&mut self, ctx: &DoseTrackContext) -> Result<Self::Response, Self::Error> {
        let mut report = SyncReport::default();
        let mut touched: HashSet<(ID, YearMonth)> = HashSet::new();

        let schedules = match &self.request {
            SyncInstancesTrigger::ScheduleSaved { created, replaced } => {
                delete_future_instances(replaced, &mut touched, &mut report, ctx).await;
                created.clone()
            }
            SyncInstancesTrigger::JobScheduler => ctx.repos.schedules.find_active().await,
        };

        let now = ctx.sys.get_timestamp_millis();
        for schedule in &schedules {
            let today = Day::from_timestamp(now, &schedule.recurrence.timezone);
            let until = today.add_days(ctx.config.materialize_window_days);
            match materialize_schedule(schedule, today, until, &mut touched, ctx).await {
                Ok(created) => report.created += created,
                Err(e) => {
                    error!(
                        "Unable to materialize instances of schedule: {}, error: {:?}",
                        schedule.id, e
                    );
                    report.failed_schedules.push(schedule.id.clone());
                }
            }
        }

        // Every period that gained or lost instances must drop its
        // cached indicators before this sync is acknowledged
        for (user_id, period) in &touched {
            ctx.repos.indicator_cache.invalidate(user_id, period).await;
        }

        Ok(report)
    }
}
