use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

#[tokio::main]
async fn main() {
    ledgerly_observability::init();

    let services = Arc::new(ledgerly_api::app::services::build_services());

    // Daily jobs: recurring-invoice materialization and the rate refresh.
    let mut trigger = ledgerly_infra::jobs::DailyTrigger::new();
    {
        let recurring = services.recurring.clone();
        trigger.register("process-recurring-invoices", move || {
            let today = Utc::now().date_naive();
            recurring
                .process_due(today)
                .map(|outcome| {
                    tracing::info!(
                        selected = outcome.selected,
                        created = outcome.created,
                        skipped = outcome.skipped,
                        failed = outcome.failed,
                        "recurring batch finished"
                    );
                })
                .map_err(|e| e.to_string())
        });
    }
    {
        let rate_refresh = services.rate_refresh.clone();
        trigger.register("fetch-exchange-rates", move || {
            let outcome = rate_refresh.run(Utc::now());
            if outcome.success {
                Ok(())
            } else {
                Err(outcome.error.unwrap_or_else(|| "refresh failed".to_string()))
            }
        });
    }
    let _trigger_handle = trigger.spawn(Duration::from_secs(60));

    let app = ledgerly_api::app::build_router(services);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
