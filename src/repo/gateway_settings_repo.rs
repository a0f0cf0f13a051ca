use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct GatewaySettingsRepo {
    pub pool: PgPool,
}

#[derive(Debug, Clone)]
pub struct StoredGatewaySettings {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub shortcode: Option<String>,
    pub passkey: Option<String>,
    pub ipn_id: Option<String>,
    pub sandbox: bool,
}

impl GatewaySettingsRepo {
    pub async fn find(&self, gateway: &str) -> Result<Option<StoredGatewaySettings>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT consumer_key, consumer_secret, shortcode, passkey, ipn_id, sandbox
            FROM gateway_settings
            WHERE gateway = $1
            "#,
        )
        .bind(gateway)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| StoredGatewaySettings {
            consumer_key: row.get("consumer_key"),
            consumer_secret: row.get("consumer_secret"),
            shortcode: row.get("shortcode"),
            passkey: row.get("passkey"),
            ipn_id: row.get("ipn_id"),
            sandbox: row.get("sandbox"),
        }))
    }

    pub async fn upsert_ipn_id(&self, gateway: &str, ipn_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE gateway_settings SET ipn_id = $2, updated_at = now() WHERE gateway = $1
            "#,
        )
        .bind(gateway)
        .bind(ipn_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
