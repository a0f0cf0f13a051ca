pub mod config;
pub mod domain {
    pub mod billing;
    pub mod outcome;
    pub mod record;
    pub mod reference;
}
pub mod error;
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod checkout;
        pub mod mpesa;
        pub mod ops;
        pub mod paypal;
        pub mod pesapal;
    }
}
pub mod repo {
    pub mod gateway_settings_repo;
    pub mod orders_repo;
    pub mod registrations_repo;
}
pub mod service {
    pub mod initiator;
    pub mod resolver;
    pub mod store;
    pub mod updater;
}

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub initiator: service::initiator::PaymentInitiator,
    pub resolver: service::resolver::CallbackResolver,
    pub mpesa: Arc<gateways::mpesa::MpesaGateway>,
    pub paypal: Arc<gateways::paypal::PaypalGateway>,
    pub pesapal: Arc<gateways::pesapal::PesapalGateway>,
}
