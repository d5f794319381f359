use super::IDoseInstanceRepo;
use chrono::NaiveDate;
use dosetrack_domain::{Day, DoseInstance, IntakeStatus, StatusSource, TimeOfDay, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresDoseInstanceRepo {
    pool: PgPool,
}

impl PostgresDoseInstanceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DoseInstanceRaw {
    instance_uid: Uuid,
    schedule_uid: Uuid,
    medicine_uid: Uuid,
    user_uid: Uuid,
    date: NaiveDate,
    time_of_day: String,
    status: String,
    source: String,
    checked_at: Option<i64>,
    deleted_at: Option<i64>,
}

impl From<DoseInstanceRaw> for DoseInstance {
    fn from(raw: DoseInstanceRaw) -> Self {
        use chrono::Datelike;

        Self {
            id: raw.instance_uid.into(),
            schedule_id: raw.schedule_uid.into(),
            medicine_id: raw.medicine_uid.into(),
            user_id: raw.user_uid.into(),
            date: Day::new(raw.date.year(), raw.date.month(), raw.date.day()),
            time: raw
                .time_of_day
                .parse::<TimeOfDay>()
                .expect("Stored time of day to be valid"),
            status: raw
                .status
                .parse::<IntakeStatus>()
                .expect("Stored intake status to be valid"),
            source: raw
                .source
                .parse::<StatusSource>()
                .expect("Stored status source to be valid"),
            checked_at: raw.checked_at,
            deleted_at: raw.deleted_at,
        }
    }
}

#[async_trait::async_trait]
impl IDoseInstanceRepo for PostgresDoseInstanceRepo {
    async fn upsert(&self, instance: &DoseInstance) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO dose_instances
            (instance_uid, schedule_uid, medicine_uid, user_uid, date, time_of_day, status, source, checked_at, deleted_at)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (schedule_uid, date) DO NOTHING
            "#,
        )
        .bind(instance.id.inner_ref())
        .bind(instance.schedule_id.inner_ref())
        .bind(instance.medicine_id.inner_ref())
        .bind(instance.user_id.inner_ref())
        .bind(instance.date.naive())
        .bind(instance.time.to_string())
        .bind(instance.status.as_str())
        .bind(instance.source.to_string())
        .bind(instance.checked_at)
        .bind(instance.deleted_at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn save(&self, instance: &DoseInstance) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE dose_instances
            SET status = $2,
                source = $3,
                checked_at = $4,
                deleted_at = $5
            WHERE instance_uid = $1
            "#,
        )
        .bind(instance.id.inner_ref())
        .bind(instance.status.as_str())
        .bind(instance.source.to_string())
        .bind(instance.checked_at)
        .bind(instance.deleted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, instance_id: &ID) -> Option<DoseInstance> {
        sqlx::query_as::<_, DoseInstanceRaw>(
            r#"
            SELECT * FROM dose_instances
            WHERE instance_uid = $1
            "#,
        )
        .bind(instance_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_default()
        .map(|raw| raw.into())
    }

    async fn find_by_user_in_range(&self, user_id: &ID, from: Day, to: Day) -> Vec<DoseInstance> {
        sqlx::query_as::<_, DoseInstanceRaw>(
            r#"
            SELECT * FROM dose_instances
            WHERE user_uid = $1
            AND date >= $2 AND date <= $3
            AND deleted_at IS NULL
            "#,
        )
        .bind(user_id.inner_ref())
        .bind(from.naive())
        .bind(to.naive())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch dose instances for user: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn find_scheduled_in_dates(&self, dates: &[Day]) -> Vec<DoseInstance> {
        let dates = dates.iter().map(|d| d.naive()).collect::<Vec<_>>();
        sqlx::query_as::<_, DoseInstanceRaw>(
            r#"
            SELECT * FROM dose_instances
            WHERE date = ANY($1)
            AND status = 'scheduled'
            AND deleted_at IS NULL
            "#,
        )
        .bind(&dates)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch scheduled dose instances: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn delete_from(
        &self,
        schedule_ids: &[ID],
        from: Day,
    ) -> anyhow::Result<Vec<DoseInstance>> {
        let ids = schedule_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        let deleted = sqlx::query_as::<_, DoseInstanceRaw>(
            r#"
            DELETE FROM dose_instances
            WHERE schedule_uid = ANY($1) AND date >= $2
            RETURNING *
            "#,
        )
        .bind(&ids)
        .bind(from.naive())
        .fetch_all(&self.pool)
        .await?;
        Ok(deleted.into_iter().map(|raw| raw.into()).collect())
    }
}
