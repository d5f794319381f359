use crate::{
    instance::sync_instances::{SyncInstancesTrigger, SyncInstancesUseCase},
    notification::send_due_notifications::SendDueNotificationsUseCase,
    shared::usecase::execute,
};
use actix_web::rt::time::{interval, sleep_until, Instant};
use dosetrack_infra::DoseTrackContext;
use std::time::Duration;

pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

/// Rolls the materialization window forward for every active schedule
/// once a day
pub fn start_window_roll_job(ctx: DoseTrackContext) {
    actix_web::rt::spawn(async move {
        let mut interval = interval(Duration::from_secs(60 * 60 * 24));
        loop {
            interval.tick().await;

            let usecase = SyncInstancesUseCase {
                request: SyncInstancesTrigger::JobScheduler,
            };
            let _ = execute(usecase, &ctx).await;
        }
    });
}

/// Scans for due and just missed doses every minute, aligned to the
/// start of the minute so the on time window matches wall clock minutes
pub fn start_dispatch_job(ctx: DoseTrackContext) {
    actix_web::rt::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now as usize, 0);
        let start = Instant::now() + Duration::from_secs(secs_to_next_run as u64);

        sleep_until(start).await;
        let mut minutely_interval = interval(Duration::from_secs(60));
        loop {
            minutely_interval.tick().await;
            let context = ctx.clone();
            actix_web::rt::spawn(async move {
                let _ = execute(SendDueNotificationsUseCase, &context).await;
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_delay_works() {
        assert_eq!(get_start_delay(50 * 1000, 5), 5);
        assert_eq!(get_start_delay(50 * 1000, 10), 60);
        assert_eq!(get_start_delay(50 * 1000, 15), 55);
        assert_eq!(get_start_delay(60 * 1000, 60), 60);
        assert_eq!(get_start_delay(60 * 1000, 10), 50);
        assert_eq!(get_start_delay(59 * 1000, 0), 1);
        assert_eq!(get_start_delay(59 * 1000, 1), 60);
    }
}
