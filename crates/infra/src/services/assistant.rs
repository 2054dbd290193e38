use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use ledgerly_assistant::{
    ChatMessage, ChatRun, ChatRunKind, ExtractionOutcome, TextGenerator, build_messages,
    parse_extraction,
};
use ledgerly_core::{CurrencyCode, InvoiceId, UserId};
use ledgerly_customers::CustomerFields;
use ledgerly_invoicing::LineItemInput;
use uuid::Uuid;

use crate::store::{ChatRunStore, UserProfileStore};

use super::{
    CustomerService, InvoiceService, ServiceError, ServiceResult,
    generate_invoice_number, invoices::InvoiceFields,
};

const EXTRACTION_PROMPT: &str = "Extract invoice creation details from the user message. If the user wants to create an invoice, intent is invoice. Otherwise intent is other. Return ONLY JSON with keys: intent, customerName, amount, title, currency. amount must be a number. currency must be a 3-letter code when present.";

const CHAT_PROMPT: &str = "You are Ledgerly Assistant, an expert invoicing assistant. Help with invoices, customers, payments, and analytics. Keep answers concise and actionable.";

const UNREADABLE_MESSAGE: &str =
    "I could not read the invoice details. Please include company name, amount, and title.";
const INSUFFICIENT_MESSAGE: &str = "Please include company name, amount, and invoice title.";
const NOT_INVOICE_MESSAGE: &str = "Not an invoice request.";

/// Summary of an invoice drafted from chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftedInvoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub customer_name: String,
    pub title: String,
    pub total_cents: i64,
    pub currency: CurrencyCode,
}

/// Outcome of the invoice-from-chat flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceChatReply {
    pub conversation_id: String,
    pub created: bool,
    pub intent: String,
    pub message: String,
    pub invoice: Option<DraftedInvoice>,
}

/// Outcome of a free-form chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub conversation_id: String,
    pub message: String,
}

/// The chat assistant: free-form conversation plus best-effort invoice
/// drafting from natural language.
///
/// Correctness of the drafting flow is bounded by the external model's
/// output; every outcome leaves an immutable run record (except an explicit
/// not-an-invoice classification, which short-circuits).
#[derive(Clone)]
pub struct AssistantService {
    generator: Arc<dyn TextGenerator>,
    runs: Arc<dyn ChatRunStore>,
    profiles: Arc<dyn UserProfileStore>,
    customers: CustomerService,
    invoices: InvoiceService,
    model: String,
}

impl AssistantService {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        runs: Arc<dyn ChatRunStore>,
        profiles: Arc<dyn UserProfileStore>,
        customers: CustomerService,
        invoices: InvoiceService,
        model: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            runs,
            profiles,
            customers,
            invoices,
            model: model.into(),
        }
    }

    /// Try to turn a chat message into a draft invoice.
    pub fn invoice_from_chat(
        &self,
        user_id: UserId,
        message: &str,
        conversation_id: Option<String>,
    ) -> ServiceResult<InvoiceChatReply> {
        let conversation_id =
            conversation_id.unwrap_or_else(|| Uuid::now_v7().to_string());

        let generation = match self
            .generator
            .generate(EXTRACTION_PROMPT, &[ChatMessage::user(message)])
        {
            Ok(generation) => generation,
            Err(err) => {
                warn!(error = %err, "invoice extraction generation failed");
                self.record_failure(user_id, &conversation_id, ChatRunKind::InvoiceDraft, message, &err.to_string())?;
                return Err(ServiceError::Upstream(err.to_string()));
            }
        };

        let outcome = match parse_extraction(&generation.text) {
            Some(extraction) => extraction.resolve(),
            None => {
                return self.clarify(user_id, conversation_id, message, UNREADABLE_MESSAGE);
            }
        };

        let draft = match outcome {
            ExtractionOutcome::NotInvoice => {
                return Ok(InvoiceChatReply {
                    conversation_id,
                    created: false,
                    intent: "other".to_string(),
                    message: NOT_INVOICE_MESSAGE.to_string(),
                    invoice: None,
                });
            }
            ExtractionOutcome::Insufficient => {
                return self.clarify(user_id, conversation_id, message, INSUFFICIENT_MESSAGE);
            }
            ExtractionOutcome::Draft(draft) => draft,
        };

        match self.create_draft_invoice(user_id, &draft) {
            Ok(drafted) => {
                let reply_message = format!(
                    "Invoice {} created for {}.",
                    drafted.invoice_number, drafted.customer_name
                );
                self.runs.append(ChatRun::completed(
                    user_id,
                    conversation_id.clone(),
                    ChatRunKind::InvoiceDraft,
                    self.model.clone(),
                    message,
                    reply_message.clone(),
                    generation.total_tokens,
                    Utc::now(),
                ))?;
                info!(invoice_id = %drafted.id, "invoice drafted from chat");
                Ok(InvoiceChatReply {
                    conversation_id,
                    created: true,
                    intent: "invoice".to_string(),
                    message: reply_message,
                    invoice: Some(drafted),
                })
            }
            Err(err) => {
                self.record_failure(
                    user_id,
                    &conversation_id,
                    ChatRunKind::InvoiceDraft,
                    message,
                    &err.to_string(),
                )?;
                Err(err)
            }
        }
    }

    /// Free-form chat turn with conversation replay.
    pub fn chat(
        &self,
        user_id: UserId,
        message: &str,
        conversation_id: Option<String>,
    ) -> ServiceResult<ChatReply> {
        let conversation_id =
            conversation_id.unwrap_or_else(|| Uuid::now_v7().to_string());

        let prior = self.runs.list_conversation(user_id, &conversation_id)?;
        let mut messages = build_messages(&prior);
        messages.push(ChatMessage::user(message));

        match self.generator.generate(CHAT_PROMPT, &messages) {
            Ok(generation) => {
                self.runs.append(ChatRun::completed(
                    user_id,
                    conversation_id.clone(),
                    ChatRunKind::Chat,
                    self.model.clone(),
                    message,
                    generation.text.clone(),
                    generation.total_tokens,
                    Utc::now(),
                ))?;
                Ok(ChatReply {
                    conversation_id,
                    message: generation.text,
                })
            }
            Err(err) => {
                warn!(error = %err, "chat generation failed");
                self.record_failure(
                    user_id,
                    &conversation_id,
                    ChatRunKind::Chat,
                    message,
                    &err.to_string(),
                )?;
                Err(ServiceError::Upstream(err.to_string()))
            }
        }
    }

    /// Conversation history as alternating user/assistant messages.
    pub fn history(
        &self,
        user_id: UserId,
        conversation_id: &str,
    ) -> ServiceResult<Vec<ChatMessage>> {
        let runs = self.runs.list_conversation(user_id, conversation_id)?;
        Ok(build_messages(&runs))
    }

    fn clarify(
        &self,
        user_id: UserId,
        conversation_id: String,
        input: &str,
        message: &str,
    ) -> ServiceResult<InvoiceChatReply> {
        self.runs.append(ChatRun::completed(
            user_id,
            conversation_id.clone(),
            ChatRunKind::InvoiceDraft,
            self.model.clone(),
            input,
            message,
            None,
            Utc::now(),
        ))?;
        Ok(InvoiceChatReply {
            conversation_id,
            created: false,
            intent: "invoice".to_string(),
            message: message.to_string(),
            invoice: None,
        })
    }

    fn record_failure(
        &self,
        user_id: UserId,
        conversation_id: &str,
        kind: ChatRunKind,
        input: &str,
        error: &str,
    ) -> ServiceResult<()> {
        self.runs.append(ChatRun::failed(
            user_id,
            conversation_id,
            kind,
            self.model.clone(),
            input,
            error,
            Utc::now(),
        ))?;
        Ok(())
    }

    fn create_draft_invoice(
        &self,
        user_id: UserId,
        draft: &ledgerly_assistant::InvoiceDraftRequest,
    ) -> ServiceResult<DraftedInvoice> {
        let customer = match self.customers.get_by_name(user_id, &draft.customer_name)? {
            Some(existing) => existing,
            None => self.customers.create(
                user_id,
                CustomerFields {
                    name: draft.customer_name.clone(),
                    ..CustomerFields::default()
                },
            )?,
        };

        let currency = draft
            .currency
            .clone()
            .or_else(|| {
                self.profiles
                    .get(user_id)
                    .ok()
                    .flatten()
                    .and_then(|p| p.default_currency)
            })
            .unwrap_or_else(CurrencyCode::usd);

        let amount_cents = (draft.amount * 100.0).round() as i64;
        let invoice_number = generate_invoice_number();
        let issue_date = Utc::now().date_naive().to_string();

        let invoice_id = self.invoices.create(
            user_id,
            customer.id,
            InvoiceFields {
                invoice_number: invoice_number.clone(),
                issue_date: Some(issue_date),
                due_date: None,
                currency: currency.clone(),
                tax_cents: 0,
                discount_cents: 0,
                note: None,
            },
            vec![LineItemInput {
                description: draft.title.clone(),
                quantity: 1.0,
                unit_price_cents: amount_cents,
            }],
        )?;

        Ok(DraftedInvoice {
            id: invoice_id,
            invoice_number,
            customer_name: customer.name,
            title: draft.title.clone(),
            total_cents: amount_cents,
            currency,
        })
    }
}
