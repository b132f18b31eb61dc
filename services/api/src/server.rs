use crate::cli::ServeArgs;
use crate::infra::{
    seed_addons, seed_business_config, seed_companies, seed_coverages, seed_discount_rules,
    seed_slab_table, seed_thresholds, AppState, InMemoryClaimRepository,
    InMemoryNotificationPublisher, InMemoryPaymentRepository, InMemoryQuoteRepository,
    SeedCatalog,
};
use crate::routes::with_workflow_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use coverdesk::catalog::ThresholdTable;
use coverdesk::config::AppConfig;
use coverdesk::error::AppError;
use coverdesk::telemetry;
use coverdesk::workflows::claims::ClaimService;
use coverdesk::workflows::payments::{PaymentService, SignatureVerifier};
use coverdesk::workflows::quotes::{PremiumEngine, QuoteService};
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let business_config = seed_business_config();
    let slab_table = seed_slab_table()?;
    let coverages = seed_coverages();
    let addons = seed_addons();
    let discount_rules = seed_discount_rules();
    let thresholds = seed_thresholds();

    let catalog = Arc::new(SeedCatalog {
        slabs: slab_table.slabs().to_vec(),
        coverages: coverages.clone(),
        addons: addons.clone(),
        discount_rules: discount_rules.clone(),
        thresholds: thresholds.clone(),
    });
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        catalog,
    };

    let quote_repository = Arc::new(InMemoryQuoteRepository::default());
    let claim_repository = Arc::new(InMemoryClaimRepository::default());
    let payment_repository = Arc::new(InMemoryPaymentRepository::default());
    let notifier = Arc::new(InMemoryNotificationPublisher::default());

    let engine = PremiumEngine::new(
        slab_table,
        coverages,
        addons,
        discount_rules,
        &business_config,
    );
    let quote_service = Arc::new(QuoteService::new(
        quote_repository.clone(),
        notifier.clone(),
        engine,
        seed_companies(),
        &business_config,
    ));
    let claim_service = Arc::new(ClaimService::new(
        claim_repository,
        notifier.clone(),
        ThresholdTable::new(thresholds),
        &business_config,
    ));
    let payment_service = Arc::new(PaymentService::new(
        payment_repository,
        quote_repository,
        notifier,
        SignatureVerifier::new(&config.payments.webhook_secret),
    ));

    let app = with_workflow_routes(quote_service, claim_service, payment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "coverdesk insurance service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
