use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{EventError, Notifier};

/// Records that talents were enrolled into a batch.
#[derive(Debug, Clone)]
pub struct BatchEnrollmentNotifier {
    pub tenant_id: Uuid,
    pub batch_id: Uuid,
    pub talent_ids: Vec<Uuid>,
}

impl BatchEnrollmentNotifier {
    pub const KIND: &'static str = "batch_enrollment";

    fn payload(&self) -> serde_json::Value {
        json!({
            "batch_id": self.batch_id,
            "talent_ids": self.talent_ids,
        })
    }
}

#[async_trait]
impl Notifier for BatchEnrollmentNotifier {
    async fn notify(&self, db: &PgPool) -> Result<(), EventError> {
        sqlx::query(
            "INSERT INTO notifications (id, tenant_id, kind, payload) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(self.tenant_id)
        .bind(Self::KIND)
        .bind(self.payload())
        .execute(db)
        .await?;

        tracing::debug!(
            tenant_id = %self.tenant_id,
            batch_id = %self.batch_id,
            talents = self.talent_ids.len(),
            "Batch enrollment notification stored"
        );
        Ok(())
    }
}
