use crate::domain::record::{OrderRecord, PaymentStatus};
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrdersRepo {
    pub pool: PgPool,
}

fn map_row(row: sqlx::postgres::PgRow) -> OrderRecord {
    OrderRecord {
        id: row.get::<Uuid, _>("id").to_string(),
        total_amount: row.get("total_amount"),
        payment_status: PaymentStatus::parse(row.get("payment_status")),
        status: row.get("status"),
        payment_reference: row.get("payment_reference"),
        pesapal_tracking_id: row.get("pesapal_tracking_id"),
    }
}

const COLUMNS: &str = "id, total_amount, payment_status, status, payment_reference, pesapal_tracking_id";

impl OrdersRepo {
    pub async fn find(&self, id: &str) -> Result<Option<OrderRecord>, sqlx::Error> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(map_row))
    }

    pub async fn exists(&self, id: &str) -> Result<bool, sqlx::Error> {
        Ok(self.find(id).await?.is_some())
    }

    pub async fn find_by_payment_reference(
        &self,
        reference: &str,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM orders WHERE payment_reference = $1"
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(map_row))
    }

    pub async fn record_initiation(
        &self,
        id: &str,
        tracking_id: &str,
        is_pesapal: bool,
    ) -> Result<(), sqlx::Error> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Err(sqlx::Error::RowNotFound);
        };

        sqlx::query(
            r#"
            UPDATE orders
            SET payment_reference = $2,
                pesapal_tracking_id = CASE WHEN $3 THEN $2 ELSE pesapal_tracking_id END,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(tracking_id)
        .bind(is_pesapal)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // Conditional write: terminal payment states are never overwritten.
    pub async fn apply_status(
        &self,
        id: &str,
        payment_status: &str,
        record_status: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(0);
        };

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET payment_status = $2, status = COALESCE($3, status), updated_at = now()
            WHERE id = $1 AND payment_status = 'pending'
            "#,
        )
        .bind(id)
        .bind(payment_status)
        .bind(record_status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
