use std::collections::BTreeMap;
use std::sync::Arc;

use ledgerly_assistant::{ChatMessage, Generation, GenerationError, TextGenerator};
use ledgerly_core::CurrencyCode;
use ledgerly_infra::services::{
    AnalyticsService, AssistantService, CustomerService, InvoiceService, RateRefreshJob,
    RecurringEngine,
};
use ledgerly_infra::store::{
    InMemoryChatRunStore, InMemoryCustomerStore, InMemoryInvoiceStore, InMemoryLineItemStore,
    InMemoryPaymentStore, InMemoryRateStore, InMemoryScheduleStore, InMemoryUserProfileStore,
    UserProfileStore,
};
use ledgerly_rates::{RateSnapshot, RateSource, RateSourceError};

/// Model identifier recorded on chat runs.
const MODEL_ID: &str = "gpt-4o-mini";

/// Everything the route handlers need.
#[derive(Clone)]
pub struct AppServices {
    pub customers: CustomerService,
    pub invoices: InvoiceService,
    pub recurring: RecurringEngine,
    pub analytics: AnalyticsService,
    pub assistant: AssistantService,
    pub rate_refresh: RateRefreshJob,
    pub profiles: Arc<dyn UserProfileStore>,
}

/// Placeholder text-generation backend.
///
/// The real model endpoint is an external collaborator configured at deploy
/// time; without one, assistant routes degrade to the documented upstream
/// failure path (failed run recorded, generic error surfaced).
struct UnconfiguredGenerator;

impl TextGenerator for UnconfiguredGenerator {
    fn generate(
        &self,
        _system_prompt: &str,
        _messages: &[ChatMessage],
    ) -> Result<Generation, GenerationError> {
        Err(GenerationError::Failed(
            "no text generation backend configured".to_string(),
        ))
    }
}

/// Fixed dev/test rate feed (the production feed is an external HTTP API).
struct StaticRateSource;

impl RateSource for StaticRateSource {
    fn fetch(&self) -> Result<RateSnapshot, RateSourceError> {
        let code = |s: &str| {
            CurrencyCode::normalize(s)
                .ok_or_else(|| RateSourceError::Malformed(format!("bad seed currency {s}")))
        };
        let rates = BTreeMap::from([
            (code("EUR")?, 0.86),
            (code("GBP")?, 0.75),
            (code("AUD")?, 1.54),
            (code("CAD")?, 1.38),
            (code("INR")?, 87.5),
            (code("JPY")?, 147.0),
        ]);
        Ok(RateSnapshot::new(rates))
    }
}

/// In-memory wiring for dev and tests.
pub fn build_services() -> AppServices {
    let customers = InMemoryCustomerStore::arc();
    let invoices = InMemoryInvoiceStore::arc();
    let line_items = InMemoryLineItemStore::arc();
    let payments = InMemoryPaymentStore::arc();
    let schedules = InMemoryScheduleStore::arc();
    let rates = InMemoryRateStore::arc();
    let profiles = InMemoryUserProfileStore::arc();
    let chat_runs = InMemoryChatRunStore::arc();

    let customer_service = CustomerService::new(customers.clone());
    let invoice_service = InvoiceService::new(
        invoices.clone(),
        line_items.clone(),
        payments.clone(),
        customers.clone(),
        rates.clone(),
    );
    let recurring = RecurringEngine::new(
        schedules.clone(),
        customers.clone(),
        invoices.clone(),
        line_items.clone(),
        rates.clone(),
    );
    let analytics = AnalyticsService::new(
        invoices.clone(),
        payments.clone(),
        customers.clone(),
        profiles.clone(),
        rates.clone(),
    );
    let assistant = AssistantService::new(
        Arc::new(UnconfiguredGenerator),
        chat_runs,
        profiles.clone(),
        customer_service.clone(),
        invoice_service.clone(),
        MODEL_ID,
    );
    let rate_refresh = RateRefreshJob::new(Arc::new(StaticRateSource), rates);

    AppServices {
        customers: customer_service,
        invoices: invoice_service,
        recurring,
        analytics,
        assistant,
        rate_refresh,
        profiles,
    }
}
