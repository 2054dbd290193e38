use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use ledgerly_analytics::{DashboardKpis, Kpi, RevenueAnalytics};
use ledgerly_customers::Customer;
use ledgerly_infra::services::InvoiceWithLines;
use ledgerly_infra::store::Page;
use ledgerly_invoicing::{Invoice, InvoiceLineItem, Payment};
use ledgerly_recurring::{Interval, RecurringSchedule, ScheduleStatus};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub tax_id: Option<String>,
    pub gst_number: Option<String>,
    pub payment_terms_days: Option<u32>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub tax_id: Option<String>,
    pub gst_number: Option<String>,
    pub payment_terms_days: Option<u32>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    pub description: String,
    pub quantity: f64,
    pub unit_price_cents: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub customer_id: String,
    pub invoice_number: String,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub currency: String,
    pub tax_cents: Option<i64>,
    pub discount_cents: Option<i64>,
    pub note: Option<String>,
    pub line_items: Vec<LineItemRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub amount_cents: i64,
    pub paid_at: Option<String>,
    pub method: Option<String>,
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInvoicesQuery {
    pub status: Option<String>,
    pub customer_id: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCustomersQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    pub customer_id: String,
    pub currency: String,
    pub line_items: Vec<LineItemRequest>,
    pub note: Option<String>,
    pub interval: Interval,
    /// `YYYY-MM-DD`; defaults to today (UTC).
    pub start_date: Option<String>,
    pub generate_first_immediately: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    pub interval: Option<Interval>,
    pub next_run_date: Option<String>,
    pub status: Option<ScheduleStatus>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRequest {
    pub currency: String,
}

// -------------------------
// Response JSON mapping
// -------------------------

pub fn customer_to_json(customer: &Customer) -> JsonValue {
    json!({
        "id": customer.id.to_string(),
        "name": customer.name,
        "email": customer.email,
        "phone": customer.phone,
        "billingAddress": customer.billing_address,
        "shippingAddress": customer.shipping_address,
        "taxId": customer.tax_id,
        "gstNumber": customer.gst_number,
        "paymentTermsDays": customer.payment_terms_days,
        "currency": customer.currency,
        "createdAt": customer.created_at.to_rfc3339(),
    })
}

pub fn invoice_to_json(invoice: &Invoice) -> JsonValue {
    json!({
        "id": invoice.id.to_string(),
        "customerId": invoice.customer_id.to_string(),
        "customerName": invoice.customer.name,
        "customerEmail": invoice.customer.email,
        "customerPhone": invoice.customer.phone,
        "customerAddress": invoice.customer.billing_address,
        "shippingAddress": invoice.customer.shipping_address,
        "customerTaxId": invoice.customer.tax_id,
        "customerGst": invoice.customer.gst_number,
        "invoiceNumber": invoice.invoice_number,
        "issueDate": invoice.issue_date,
        "dueDate": invoice.due_date,
        "currency": invoice.currency,
        "subtotalCents": invoice.subtotal_cents,
        "taxCents": invoice.tax_cents,
        "discountCents": invoice.discount_cents,
        "totalCents": invoice.total_cents,
        "totalCentsUSD": invoice.total_cents_usd,
        "status": invoice.status,
        "note": invoice.note,
    })
}

pub fn line_item_to_json(item: &InvoiceLineItem) -> JsonValue {
    json!({
        "description": item.description,
        "quantity": item.quantity,
        "unitPriceCents": item.unit_price_cents,
        "amountCents": item.amount_cents,
    })
}

pub fn invoice_with_lines_to_json(read: &InvoiceWithLines) -> JsonValue {
    let mut value = invoice_to_json(&read.invoice);
    value["lineItems"] = JsonValue::Array(
        read.line_items.iter().map(line_item_to_json).collect(),
    );
    value
}

pub fn payment_to_json(payment: &Payment) -> JsonValue {
    json!({
        "id": payment.id.to_string(),
        "invoiceId": payment.invoice_id.to_string(),
        "amountCents": payment.amount_cents,
        "paidAt": payment.paid_at,
        "method": payment.method,
        "reference": payment.reference,
    })
}

pub fn invoice_page_to_json(page: &Page<Invoice>) -> JsonValue {
    json!({
        "invoices": page.items.iter().map(invoice_to_json).collect::<Vec<_>>(),
        "cursor": page.cursor,
        "isDone": page.is_done,
    })
}

pub fn schedule_to_json(schedule: &RecurringSchedule) -> JsonValue {
    json!({
        "id": schedule.id.to_string(),
        "customerId": schedule.customer_id.to_string(),
        "currency": schedule.currency,
        "lineItems": schedule.line_items.iter().map(|item| json!({
            "description": item.description,
            "quantity": item.quantity,
            "unitPriceCents": item.unit_price_cents,
        })).collect::<Vec<_>>(),
        "note": schedule.note,
        "interval": schedule.interval,
        "nextRunDate": schedule.next_run_date.to_string(),
        "lastRunDate": schedule.last_run_date.map(|d| d.to_string()),
        "status": schedule.status,
    })
}

fn kpi_to_json(kpi: &Kpi) -> JsonValue {
    json!({
        "label": kpi.label,
        "valueCents": kpi.value_cents,
        "trend": kpi.trend,
    })
}

fn dashboard_kpis_by_type(kpis: &DashboardKpis) -> JsonValue {
    json!({
        "kpi_total_outstanding": kpi_to_json(&kpis.total_outstanding),
        "kpi_due": kpi_to_json(&kpis.due_soon),
        "kpi_overdue": kpi_to_json(&kpis.overdue),
        "kpi_paid": kpi_to_json(&kpis.paid_this_month),
    })
}

pub fn dashboard_to_json(kpis: &DashboardKpis) -> JsonValue {
    json!({
        "totals": {
            "totalRevenue": kpis.totals.total_revenue_cents,
            "outstandingAmount": kpis.totals.outstanding_cents,
            "overdueAmount": kpis.totals.overdue_cents,
            "dueAmountCents": kpis.totals.due_cents,
            "invoiceCount": kpis.totals.invoice_count,
            "customerCount": kpis.totals.customer_count,
        },
        "kpisByType": dashboard_kpis_by_type(kpis),
        "currency": kpis.currency,
    })
}

pub fn analytics_to_json(analytics: &RevenueAnalytics, dashboard: &DashboardKpis) -> JsonValue {
    json!({
        "chartData": analytics.chart_data,
        "forecastData": analytics.forecast_data,
        "allChartData": analytics.all_chart_data,
        "maxChartRevenue": analytics.max_chart_revenue,
        "analyticsKpisByType": {
            "kpi_month_revenue": kpi_to_json(&analytics.month_revenue),
            "kpi_transactions": kpi_to_json(&analytics.transactions),
            "kpi_avg_transaction": kpi_to_json(&analytics.avg_transaction),
            "kpi_forecast_next": kpi_to_json(&analytics.forecast_next),
        },
        "dashboardKpisByType": dashboard_kpis_by_type(dashboard),
        "currency": analytics.currency,
    })
}
