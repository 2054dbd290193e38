//! Invoice-intent extraction from raw model output.
//!
//! The model is asked for a single JSON object; it routinely wraps it in
//! prose or code fences, so parsing slices the outermost brace pair and
//! tolerates everything around it. Anything that fails to parse is treated
//! as "couldn't read the details", never as an internal error.

use serde::{Deserialize, Serialize};

use ledgerly_core::CurrencyCode;

/// Classified intent of the user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionIntent {
    Invoice,
    Other,
}

/// Raw extraction as the model reports it. All detail fields optional; the
/// model may omit or mistype any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceExtraction {
    pub intent: ExtractionIntent,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Validated draft request distilled from an extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraftRequest {
    pub customer_name: String,
    pub title: String,
    pub amount: f64,
    pub currency: Option<CurrencyCode>,
}

/// What an extraction amounts to once validated.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// Enough detail to draft an invoice.
    Draft(InvoiceDraftRequest),
    /// The message was not asking for an invoice.
    NotInvoice,
    /// Invoice intent, but name/title/amount are missing or unusable.
    Insufficient,
}

/// Parse the outermost JSON object out of free-form model output.
pub fn parse_extraction(text: &str) -> Option<InvoiceExtraction> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

impl InvoiceExtraction {
    /// Validate the extraction into an actionable outcome.
    pub fn resolve(self) -> ExtractionOutcome {
        if self.intent == ExtractionIntent::Other {
            return ExtractionOutcome::NotInvoice;
        }

        let customer_name = self
            .customer_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let amount = self.amount.filter(|a| a.is_finite() && *a > 0.0);

        match (customer_name, title, amount) {
            (Some(customer_name), Some(title), Some(amount)) => {
                ExtractionOutcome::Draft(InvoiceDraftRequest {
                    customer_name: customer_name.to_string(),
                    title: title.to_string(),
                    amount,
                    currency: self
                        .currency
                        .as_deref()
                        .and_then(CurrencyCode::normalize),
                })
            }
            _ => ExtractionOutcome::Insufficient,
        }
    }
}
