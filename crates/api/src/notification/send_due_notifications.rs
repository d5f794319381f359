use crate::shared::usecase::UseCase;
use dosetrack_domain::{
    Day, DispatchKind, DispatchRecord, DoseInstance, DoseSchedule, Medicine, YearMonth, ID,
};
use dosetrack_infra::{DoseTrackContext, NotifySendError, PushNotification};
use futures::future::join_all;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use tracing::error;

/// Width of the on time selection window. Matches the polling interval
/// so that every due instance is picked up by exactly one scan.
pub const ON_TIME_WINDOW_MILLIS: i64 = 60 * 1000;
/// How far back a grace deadline may lie and still produce a missed
/// reminder. Slightly larger than the polling interval so a slow cycle
/// does not drop deadlines on the boundary.
pub const REMINDER_LOOKBACK_MILLIS: i64 = 90 * 1000;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Periodic scan over current dose instances. Selects instances whose
/// due time falls inside the coming minute for an on time notification,
/// promotes instances whose grace deadline just passed to missed and
/// sends them a reminder. The dispatch log bounds every instance to at
/// most one notification of each kind across overlapping cycles.
#[derive(Debug)]
pub struct SendDueNotificationsUseCase;

#[derive(Debug)]
pub enum UseCaseError {}

#[derive(Debug, Default)]
pub struct DispatchReport {
    pub on_time: usize,
    pub reminders: usize,
    pub promoted: usize,
    pub failed_sends: usize,
    pub pruned_channels: usize,
}

/// The civil dates an instance due around `now` can carry. Depending on
/// the schedule timezone the date of a due dose may be yesterday or
/// tomorrow from utc's point of view.
fn candidate_dates(now: i64) -> Vec<Day> {
    let mut dates = Vec::with_capacity(3);
    for offset in [-1, 0, 1] {
        let date = Day::from_timestamp(now + offset * DAY_MILLIS, &chrono_tz::UTC);
        if !dates.contains(&date) {
            dates.push(date);
        }
    }
    dates
}

fn notification_for(
    instance: &DoseInstance,
    medicine: &Medicine,
    kind: DispatchKind,
) -> PushNotification {
    let body = match kind {
        DispatchKind::OnTime => {
            format!("Time to take {} ({})", medicine.name, instance.time)
        }
        DispatchKind::Reminder => format!(
            "You may have missed {} scheduled at {}",
            medicine.name, instance.time
        ),
    };
    PushNotification {
        title: medicine.name.clone(),
        body,
        dedupe_tag: format!("{}:{}", instance.id, kind),
        payload: json!({
            "instanceId": instance.id,
            "medicineId": medicine.id,
            "date": instance.date,
            "kind": kind,
        }),
    }
}

async fn deliver(
    user_id: &ID,
    notification: PushNotification,
    report: &mut DispatchReport,
    ctx: &DoseTrackContext,
) {
    let channels = ctx.repos.channels.find_by_user(user_id).await;

    let sends = channels.iter().map(|channel| {
        let notification = &notification;
        async move { (channel, ctx.notifier.send(channel, notification).await) }
    });

    for (channel, outcome) in join_all(sends).await {
        match outcome {
            Ok(()) => {}
            Err(NotifySendError::Gone) => {
                // The target does not exist anymore, deregister it so the
                // next cycle does not try again
                ctx.repos.channels.delete(&channel.id).await;
                report.pruned_channels += 1;
            }
            Err(e) => {
                error!(
                    "Notification delivery to channel: {} failed: {:?}",
                    channel.id, e
                );
                report.failed_sends += 1;
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendDueNotificationsUseCase {
    type Response = DispatchReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SendDueNotifications";

    /// This will run every minute
    async fn execute(&mut self, ctx: &DoseTrackContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let mut report = DispatchReport::default();
        let mut touched: HashSet<(ID, YearMonth)> = HashSet::new();

        let instances = ctx
            .repos
            .dose_instances
            .find_scheduled_in_dates(&candidate_dates(now))
            .await;

        let schedule_ids = instances
            .iter()
            .map(|i| i.schedule_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let medicine_ids = instances
            .iter()
            .map(|i| i.medicine_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let schedules: HashMap<ID, DoseSchedule> = ctx
            .repos
            .schedules
            .find_many(&schedule_ids)
            .await
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let medicines: HashMap<ID, Medicine> = ctx
            .repos
            .medicines
            .find_many(&medicine_ids)
            .await
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();

        let mut selected: Vec<(DoseInstance, DispatchKind)> = Vec::new();

        for mut instance in instances {
            let Some(schedule) = schedules.get(&instance.schedule_id) else {
                continue;
            };
            let Some(medicine) = medicines.get(&instance.medicine_id) else {
                continue;
            };
            if schedule.is_deleted() || medicine.is_deleted() {
                continue;
            }

            let tz = &schedule.recurrence.timezone;
            let due = instance.due_at(tz);
            let deadline = instance.deadline_at(tz);

            if due >= now && due < now + ON_TIME_WINDOW_MILLIS {
                if schedule.notify_enabled {
                    selected.push((instance, DispatchKind::OnTime));
                }
            } else if deadline > now - REMINDER_LOOKBACK_MILLIS && deadline <= now {
                // The grace period just ran out. Persist the promotion;
                // an instance the user reverted since carries a manual
                // source and is left alone.
                if instance.promote_missed(now, tz).is_err() {
                    continue;
                }
                if let Err(e) = ctx.repos.dose_instances.save(&instance).await {
                    error!(
                        "Unable to persist missed promotion of instance: {}, error: {:?}",
                        instance.id, e
                    );
                    continue;
                }
                report.promoted += 1;
                touched.insert((instance.user_id.clone(), instance.date.year_month()));
                if schedule.notify_enabled {
                    selected.push((instance, DispatchKind::Reminder));
                }
            }
        }

        for (instance, kind) in selected {
            let record = DispatchRecord {
                instance_id: instance.id.clone(),
                kind,
                dispatched_at: now,
            };
            match ctx.repos.dispatch_log.insert(&record).await {
                Ok(true) => {}
                // Another cycle already dispatched this kind
                Ok(false) => continue,
                Err(e) => {
                    error!(
                        "Unable to record dispatch for instance: {}, error: {:?}",
                        instance.id, e
                    );
                    continue;
                }
            }

            let medicine = medicines
                .get(&instance.medicine_id)
                .expect("Selected instances have their medicine loaded");
            let notification = notification_for(&instance, medicine, kind);
            deliver(&instance.user_id, notification, &mut report, ctx).await;

            match kind {
                DispatchKind::OnTime => report.on_time += 1,
                DispatchKind::Reminder => report.reminders += 1,
            }
        }

        for (user_id, period) in &touched {
            ctx.repos.indicator_cache.invalidate(user_id, period).await;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::usecase::execute;
    use dosetrack_domain::{
        IntakeStatus, NotificationChannel, RecurrencePattern, RecurrenceRule, TimeOfDay,
    };
    use dosetrack_infra::{setup_context, ISys, InMemoryNotifier};
    use std::sync::Arc;

    struct StaticTimeSys(i64);
    impl ISys for StaticTimeSys {
        fn get_timestamp_millis(&self) -> i64 {
            self.0
        }
    }

    fn ts(date: &Day, hours: u32, minutes: u32, seconds: u32) -> i64 {
        date.timestamp_at(0, &chrono_tz::UTC)
            + ((hours * 3600 + minutes * 60 + seconds) as i64) * 1000
    }

    struct TestContext {
        ctx: DoseTrackContext,
        notifier: Arc<InMemoryNotifier>,
        schedule: DoseSchedule,
        instance: DoseInstance,
    }

    impl TestContext {
        fn set_now(&mut self, now: i64) {
            self.ctx.sys = Arc::new(StaticTimeSys(now));
        }

        async fn scan(&self) -> DispatchReport {
            execute(SendDueNotificationsUseCase, &self.ctx).await.unwrap()
        }
    }

    /// One medicine with a daily 08:00 schedule, one registered
    /// channel and one scheduled instance on 2025-01-02
    async fn setup() -> TestContext {
        let mut ctx = setup_context().await;
        let notifier = Arc::new(InMemoryNotifier::new());
        ctx.notifier = notifier.clone();

        let medicine = Medicine::new(Default::default(), "aspirin".into(), None);
        ctx.repos.medicines.insert(&medicine).await.unwrap();
        let schedule = DoseSchedule::new(
            medicine.id.clone(),
            medicine.user_id.clone(),
            TimeOfDay::new(8, 0).unwrap(),
            RecurrencePattern {
                rule: RecurrenceRule::Daily,
                timezone: chrono_tz::UTC,
            },
            true,
        );
        ctx.repos.schedules.insert(&schedule).await.unwrap();
        let instance = DoseInstance::new(&schedule, Day::new(2025, 1, 2));
        ctx.repos.dose_instances.upsert(&instance).await.unwrap();

        let channel = NotificationChannel::new(
            medicine.user_id.clone(),
            NotificationChannel::parse_endpoint("https://relay.example.com/push").unwrap(),
            0,
        );
        ctx.repos.channels.insert(&channel).await.unwrap();

        TestContext {
            ctx,
            notifier,
            schedule,
            instance,
        }
    }

    #[actix_web::test]
    async fn it_sends_an_on_time_notification_exactly_once() {
        let mut test = setup().await;
        let date = test.instance.date;

        // Scan lands exactly on the due minute
        test.set_now(ts(&date, 8, 0, 0));
        let report = test.scan().await;
        assert_eq!(report.on_time, 1);
        assert_eq!(test.notifier.sent_count(), 1);

        // An overlapping second cycle must not send again
        let report = test.scan().await;
        assert_eq!(report.on_time, 0);
        assert_eq!(test.notifier.sent_count(), 1);
    }

    #[actix_web::test]
    async fn it_does_not_select_instances_outside_the_on_time_window() {
        let mut test = setup().await;
        let date = test.instance.date;

        test.set_now(ts(&date, 7, 58, 0));
        assert_eq!(test.scan().await.on_time, 0);

        test.set_now(ts(&date, 8, 1, 0));
        assert_eq!(test.scan().await.on_time, 0);
    }

    #[actix_web::test]
    async fn it_promotes_and_reminds_exactly_once_when_the_grace_period_ends() {
        let mut test = setup().await;
        let date = test.instance.date;

        // 08:31:00, the 08:30 deadline lies inside the lookback window
        test.set_now(ts(&date, 8, 31, 0));
        let report = test.scan().await;
        assert_eq!(report.promoted, 1);
        assert_eq!(report.reminders, 1);
        assert_eq!(test.notifier.sent_count(), 1);

        let promoted = test
            .ctx
            .repos
            .dose_instances
            .find(&test.instance.id)
            .await
            .unwrap();
        assert_eq!(promoted.status, IntakeStatus::Missed);

        // A second cycle inside the same window records nothing new
        let report = test.scan().await;
        assert_eq!(report.promoted, 0);
        assert_eq!(report.reminders, 0);
        assert_eq!(test.notifier.sent_count(), 1);

        let records = test
            .ctx
            .repos
            .dispatch_log
            .find_by_instance(&test.instance.id)
            .await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, DispatchKind::Reminder);
    }

    #[actix_web::test]
    async fn it_leaves_reverted_instances_alone() {
        let mut test = setup().await;
        let date = test.instance.date;

        // Taken at 08:05, reverted at 08:10: the row is scheduled again
        // but carries a manual source
        let mut instance = test.instance.clone();
        instance.mark(IntakeStatus::Taken, ts(&date, 8, 5, 0)).unwrap();
        instance
            .mark(IntakeStatus::Scheduled, ts(&date, 8, 10, 0))
            .unwrap();
        test.ctx.repos.dose_instances.save(&instance).await.unwrap();

        test.set_now(ts(&date, 8, 31, 0));
        let report = test.scan().await;
        assert_eq!(report.promoted, 0);
        assert_eq!(report.reminders, 0);

        let row = test
            .ctx
            .repos
            .dose_instances
            .find(&test.instance.id)
            .await
            .unwrap();
        assert_eq!(row.status, IntakeStatus::Scheduled);
    }

    #[actix_web::test]
    async fn it_skips_notifications_for_muted_schedules_but_still_promotes() {
        let mut test = setup().await;
        let date = test.instance.date;

        test.schedule.notify_enabled = false;
        test.ctx.repos.schedules.save(&test.schedule).await.unwrap();

        test.set_now(ts(&date, 8, 31, 0));
        let report = test.scan().await;
        assert_eq!(report.promoted, 1);
        assert_eq!(report.reminders, 0);
        assert_eq!(test.notifier.sent_count(), 0);
    }

    /// The full path a dose travels: materialized by a medicine save,
    /// taken on day one, auto missed on day two, both visible on the
    /// calendar
    #[actix_web::test]
    async fn a_dose_travels_from_generation_to_the_calendar() {
        use crate::calendar::get_month_indicator::GetMonthIndicatorUseCase;
        use crate::instance::set_intake_status::SetIntakeStatusUseCase;
        use crate::medicine::create_medicine::CreateMedicineUseCase;
        use dosetrack_api_structs::dtos::ScheduleInput;

        let mut ctx = setup_context().await;
        let day_one = Day::new(2025, 1, 1);
        let day_two = Day::new(2025, 1, 2);
        ctx.sys = Arc::new(StaticTimeSys(ts(&day_one, 7, 0, 0)));

        let create = CreateMedicineUseCase {
            user_id: Default::default(),
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
        let created = execute(create, &ctx).await.unwrap();
        let user_id = created.medicine.user_id.clone();

        // One scheduled instance per day of the forward window
        let instances = ctx
            .repos
            .dose_instances
            .find_by_user_in_range(&user_id, day_one, Day::new(2025, 1, 31))
            .await;
        assert_eq!(instances.len(), 8);
        assert!(instances
            .iter()
            .all(|i| i.status == IntakeStatus::Scheduled));

        // Day one's dose is taken at 08:05
        let first = instances.iter().find(|i| i.date == day_one).unwrap();
        let mark = SetIntakeStatusUseCase {
            user_id: user_id.clone(),
            instance_id: first.id.clone(),
            status: IntakeStatus::Taken,
            checked_at: Some(ts(&day_one, 8, 5, 0)),
        };
        execute(mark, &ctx).await.unwrap();

        let month = GetMonthIndicatorUseCase {
            user_id: user_id.clone(),
            year_month: "2025-01".into(),
        };
        let indicators = execute(month, &ctx).await.unwrap();
        assert_eq!(
            indicators.get(&day_one).unwrap()[0].status,
            IntakeStatus::Taken
        );

        // Day two, 08:31: nothing was logged, the scan promotes the
        // dose and the calendar flips to missed
        ctx.sys = Arc::new(StaticTimeSys(ts(&day_two, 8, 31, 0)));
        let report = execute(SendDueNotificationsUseCase, &ctx).await.unwrap();
        assert_eq!(report.promoted, 1);

        let month = GetMonthIndicatorUseCase {
            user_id: user_id.clone(),
            year_month: "2025-01".into(),
        };
        let indicators = execute(month, &ctx).await.unwrap();
        assert_eq!(
            indicators.get(&day_two).unwrap()[0].status,
            IntakeStatus::Missed
        );
        assert_eq!(
            indicators.get(&day_one).unwrap()[0].status,
            IntakeStatus::Taken
        );
    }

    #[actix_web::test]
    async fn it_prunes_gone_channels_without_blocking_other_recipients() {
        let mut test = setup().await;
        let date = test.instance.date;
        let user_id = test.schedule.user_id.clone();

        let dead = NotificationChannel::new(
            user_id.clone(),
            NotificationChannel::parse_endpoint("https://relay.example.com/dead").unwrap(),
            0,
        );
        test.ctx.repos.channels.insert(&dead).await.unwrap();
        test.notifier.mark_gone("https://relay.example.com/dead");

        test.set_now(ts(&date, 8, 0, 0));
        let report = test.scan().await;
        assert_eq!(report.on_time, 1);
        assert_eq!(report.pruned_channels, 1);
        // The healthy channel still got its delivery
        assert_eq!(test.notifier.sent_count(), 1);
        // The dead channel was deregistered
        let remaining = test.ctx.repos.channels.find_by_user(&user_id).await;
        assert_eq!(remaining.len(), 1);
    }
}
