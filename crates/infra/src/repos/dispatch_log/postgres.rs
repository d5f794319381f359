use super::IDispatchLogRepo;
use dosetrack_domain::{DispatchKind, DispatchRecord, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresDispatchLogRepo {
    pool: PgPool,
}

impl PostgresDispatchLogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DispatchRecordRaw {
    instance_uid: Uuid,
    kind: String,
    dispatched_at: i64,
}

impl From<DispatchRecordRaw> for DispatchRecord {
    fn from(raw: DispatchRecordRaw) -> Self {
        Self {
            instance_id: raw.instance_uid.into(),
            kind: raw
                .kind
                .parse::<DispatchKind>()
                .expect("Stored dispatch kind to be valid"),
            dispatched_at: raw.dispatched_at,
        }
    }
}

#[async_trait::async_trait]
impl IDispatchLogRepo for PostgresDispatchLogRepo {
    async fn insert(&self, record: &DispatchRecord) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO dispatch_log
            (instance_uid, kind, dispatched_at)
            VALUES($1, $2, $3)
            ON CONFLICT (instance_uid, kind) DO NOTHING
            "#,
        )
        .bind(record.instance_id.inner_ref())
        .bind(record.kind.as_str())
        .bind(record.dispatched_at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn find_by_instance(&self, instance_id: &ID) -> Vec<DispatchRecord> {
        sqlx::query_as::<_, DispatchRecordRaw>(
            r#"
            SELECT * FROM dispatch_log
            WHERE instance_uid = $1
            "#,
        )
        .bind(instance_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch dispatch records: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }
}
