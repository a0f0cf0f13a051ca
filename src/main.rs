use axum::routing::{get, post};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use storefront_payments::config::{AppConfig, SettingsProvider};
use storefront_payments::gateways::mpesa::MpesaGateway;
use storefront_payments::gateways::paypal::PaypalGateway;
use storefront_payments::gateways::pesapal::PesapalGateway;
use storefront_payments::gateways::TokenCache;
use storefront_payments::repo::gateway_settings_repo::GatewaySettingsRepo;
use storefront_payments::repo::orders_repo::OrdersRepo;
use storefront_payments::repo::registrations_repo::RegistrationsRepo;
use storefront_payments::service::initiator::PaymentInitiator;
use storefront_payments::service::resolver::CallbackResolver;
use storefront_payments::service::store::{PgStore, PurchasableStore};
use storefront_payments::service::updater::StatusUpdater;
use storefront_payments::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let settings = SettingsProvider::new(
        GatewaySettingsRepo { pool: pool.clone() },
        std::time::Duration::from_secs(300),
    );
    let http = reqwest::Client::new();

    let mpesa = Arc::new(MpesaGateway {
        settings: settings.clone(),
        client: http.clone(),
        timeout_ms: cfg.gateway_timeout_ms,
        tokens: TokenCache::new(),
    });
    let paypal = Arc::new(PaypalGateway {
        settings: settings.clone(),
        client: http.clone(),
        timeout_ms: cfg.gateway_timeout_ms,
        tokens: TokenCache::new(),
    });
    let pesapal = Arc::new(PesapalGateway {
        settings,
        client: http,
        timeout_ms: cfg.gateway_timeout_ms,
        tokens: TokenCache::new(),
    });

    let store: Arc<dyn PurchasableStore> = Arc::new(PgStore {
        orders: OrdersRepo { pool: pool.clone() },
        registrations: RegistrationsRepo { pool },
    });
    let updater = StatusUpdater {
        store: store.clone(),
    };
    let resolver = CallbackResolver {
        store: store.clone(),
        updater,
    };
    let initiator = PaymentInitiator { store };

    let state = AppState {
        config: cfg.clone(),
        initiator,
        resolver,
        mpesa,
        paypal,
        pesapal,
    };

    let app = Router::new()
        .route("/health", get(storefront_payments::http::handlers::ops::health))
        .route(
            "/checkout/mpesa",
            post(storefront_payments::http::handlers::checkout::mpesa),
        )
        .route(
            "/checkout/paypal",
            post(storefront_payments::http::handlers::checkout::paypal),
        )
        .route(
            "/checkout/paypal/capture",
            post(storefront_payments::http::handlers::paypal::capture),
        )
        .route(
            "/checkout/pesapal",
            post(storefront_payments::http::handlers::checkout::pesapal),
        )
        .route(
            "/payments/mpesa/callback",
            post(storefront_payments::http::handlers::mpesa::callback),
        )
        .route(
            "/payments/pesapal/callback",
            get(storefront_payments::http::handlers::pesapal::callback),
        )
        .route(
            "/payments/pesapal/ipn",
            get(storefront_payments::http::handlers::pesapal::ipn),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
