use super::IMedicineRepo;
use dosetrack_domain::{Medicine, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresMedicineRepo {
    pool: PgPool,
}

impl PostgresMedicineRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MedicineRaw {
    medicine_uid: Uuid,
    user_uid: Uuid,
    name: String,
    notes: Option<String>,
    deleted_at: Option<i64>,
}

impl From<MedicineRaw> for Medicine {
    fn from(raw: MedicineRaw) -> Self {
        Self {
            id: raw.medicine_uid.into(),
            user_id: raw.user_uid.into(),
            name: raw.name,
            notes: raw.notes,
            deleted_at: raw.deleted_at,
        }
    }
}

#[async_trait::async_trait]
impl IMedicineRepo for PostgresMedicineRepo {
    async fn insert(&self, medicine: &Medicine) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO medicines
            (medicine_uid, user_uid, name, notes, deleted_at)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(medicine.id.inner_ref())
        .bind(medicine.user_id.inner_ref())
        .bind(&medicine.name)
        .bind(&medicine.notes)
        .bind(medicine.deleted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, medicine: &Medicine) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE medicines
            SET name = $2,
                notes = $3,
                deleted_at = $4
            WHERE medicine_uid = $1
            "#,
        )
        .bind(medicine.id.inner_ref())
        .bind(&medicine.name)
        .bind(&medicine.notes)
        .bind(medicine.deleted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, medicine_id: &ID) -> Option<Medicine> {
        sqlx::query_as::<_, MedicineRaw>(
            r#"
            SELECT * FROM medicines
            WHERE medicine_uid = $1
            "#,
        )
        .bind(medicine_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_default()
        .map(|raw| raw.into())
    }

    async fn find_many(&self, medicine_ids: &[ID]) -> Vec<Medicine> {
        let ids = medicine_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        sqlx::query_as::<_, MedicineRaw>(
            r#"
            SELECT * FROM medicines
            WHERE medicine_uid = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch medicines: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn find_active_by_user(&self, user_id: &ID) -> Vec<Medicine> {
        sqlx::query_as::<_, MedicineRaw>(
            r#"
            SELECT * FROM medicines
            WHERE user_uid = $1 AND deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch medicines for user: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }
}
