//! `ledgerly-assistant` — the text-generation seam, chat-run records, and
//! invoice-intent extraction from model output.
//!
//! This crate is provider-agnostic: the model behind [`TextGenerator`] is an
//! external collaborator whose output is best-effort by contract. Callers
//! (infra/API) own the orchestration and persistence.

pub mod extract;
pub mod generate;
pub mod run;

pub use extract::{ExtractionOutcome, InvoiceDraftRequest, InvoiceExtraction, parse_extraction};
pub use generate::{ChatMessage, Generation, GenerationError, Role, TextGenerator};
pub use run::{ChatRun, ChatRunKind, ChatRunStatus, build_messages};
