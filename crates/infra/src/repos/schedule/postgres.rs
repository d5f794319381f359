use super::IScheduleRepo;
use dosetrack_domain::{DoseSchedule, RecurrencePattern, TimeOfDay, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use tracing::error;

pub struct PostgresScheduleRepo {
    pool: PgPool,
}

impl PostgresScheduleRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ScheduleRaw {
    schedule_uid: Uuid,
    medicine_uid: Uuid,
    user_uid: Uuid,
    time_of_day: String,
    recurrence: Json<RecurrencePattern>,
    notify_enabled: bool,
    deleted_at: Option<i64>,
}

impl From<ScheduleRaw> for DoseSchedule {
    fn from(raw: ScheduleRaw) -> Self {
        Self {
            id: raw.schedule_uid.into(),
            medicine_id: raw.medicine_uid.into(),
            user_id: raw.user_uid.into(),
            time: raw
                .time_of_day
                .parse::<TimeOfDay>()
                .expect("Stored time of day to be valid"),
            recurrence: raw.recurrence.0,
            notify_enabled: raw.notify_enabled,
            deleted_at: raw.deleted_at,
        }
    }
}

#[async_trait::async_trait]
impl IScheduleRepo for PostgresScheduleRepo {
    async fn insert(&self, schedule: &DoseSchedule) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO dose_schedules
            (schedule_uid, medicine_uid, user_uid, time_of_day, recurrence, notify_enabled, deleted_at)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(schedule.id.inner_ref())
        .bind(schedule.medicine_id.inner_ref())
        .bind(schedule.user_id.inner_ref())
        .bind(schedule.time.to_string())
        .bind(Json(&schedule.recurrence))
        .bind(schedule.notify_enabled)
        .bind(schedule.deleted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, schedule: &DoseSchedule) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE dose_schedules
            SET time_of_day = $2,
                recurrence = $3,
                notify_enabled = $4,
                deleted_at = $5
            WHERE schedule_uid = $1
            "#,
        )
        .bind(schedule.id.inner_ref())
        .bind(schedule.time.to_string())
        .bind(Json(&schedule.recurrence))
        .bind(schedule.notify_enabled)
        .bind(schedule.deleted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, schedule_id: &ID) -> Option<DoseSchedule> {
        sqlx::query_as::<_, ScheduleRaw>(
            r#"
            SELECT * FROM dose_schedules
            WHERE schedule_uid = $1
            "#,
        )
        .bind(schedule_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_default()
        .map(|raw| raw.into())
    }

    async fn find_many(&self, schedule_ids: &[ID]) -> Vec<DoseSchedule> {
        let ids = schedule_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        sqlx::query_as::<_, ScheduleRaw>(
            r#"
            SELECT * FROM dose_schedules
            WHERE schedule_uid = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch schedules: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn find_by_medicine(&self, medicine_id: &ID) -> Vec<DoseSchedule> {
        sqlx::query_as::<_, ScheduleRaw>(
            r#"
            SELECT * FROM dose_schedules
            WHERE medicine_uid = $1
            "#,
        )
        .bind(medicine_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch schedules for medicine: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn find_active(&self) -> Vec<DoseSchedule> {
        sqlx::query_as::<_, ScheduleRaw>(
            r#"
            SELECT * FROM dose_schedules
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch active schedules: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }
}
