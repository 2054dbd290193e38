//! `ledgerly-invoicing` — the invoice ledger domain: statuses, invoices,
//! line items, payments, and totals arithmetic.

pub mod invoice;
pub mod payment;
pub mod status;

pub use invoice::{
    Invoice, InvoiceLineItem, InvoiceSource, InvoiceTotals, LineItemInput, compute_totals,
    price_line_items,
};
pub use payment::{Payment, paid_total_cents};
pub use status::InvoiceStatus;
