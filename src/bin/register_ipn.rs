use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use storefront_payments::config::{AppConfig, SettingsProvider};
use storefront_payments::gateways::pesapal::PesapalGateway;
use storefront_payments::gateways::TokenCache;
use storefront_payments::repo::gateway_settings_repo::GatewaySettingsRepo;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&cfg.database_url)
        .await?;

    let settings_repo = GatewaySettingsRepo { pool };
    let pesapal = PesapalGateway {
        settings: SettingsProvider::new(settings_repo.clone(), std::time::Duration::from_secs(300)),
        client: reqwest::Client::new(),
        timeout_ms: cfg.gateway_timeout_ms,
        tokens: TokenCache::new(),
    };

    let ipn_url = format!("{}/payments/pesapal/ipn", cfg.callback_base_url);
    let ipn_id = pesapal.register_ipn(&ipn_url).await?;
    settings_repo.upsert_ipn_id("pesapal", &ipn_id).await?;

    tracing::info!(ipn_id = %ipn_id, ipn_url = %ipn_url, "registered Pesapal IPN endpoint");
    Ok(())
}
