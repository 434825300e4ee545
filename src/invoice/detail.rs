//! The endpoint for a single invoice with everything attached to it.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error, ErrorBody,
    customer::{Customer, get_customer},
    database_id::InvoiceId,
    db::with_connection,
    invoice::{Invoice, InvoicesState, LineItem, Payment, get_invoice, get_line_items, get_payments},
    json_response,
    vendor::{Vendor, get_vendor},
};

/// An invoice with its vendor, customer, line items and payments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub vendor: Vendor,
    pub customer: Option<Customer>,
    pub line_items: Vec<LineItem>,
    /// Newest first.
    pub payments: Vec<Payment>,
}

/// Get the full details of one invoice.
pub async fn get_invoice_endpoint(
    State(state): State<InvoicesState>,
    Path(invoice_id): Path<String>,
) -> Response {
    tracing::info!("Fetching invoice {invoice_id}");

    // An ID that is not a number cannot match an invoice.
    let result = match invoice_id.parse::<InvoiceId>() {
        Ok(invoice_id) => with_connection(&state.db_connection, |connection| {
            get_invoice_detail(invoice_id, connection)
        }),
        Err(_) => Err(Error::NotFound),
    };

    match result {
        Err(Error::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new("Invoice not found", None)),
        )
            .into_response(),
        result => json_response(result, "Failed to fetch invoice", state.environment),
    }
}

/// Load an invoice and everything attached to it.
///
/// # Errors
/// Returns [Error::NotFound] if `invoice_id` does not refer to an invoice.
pub fn get_invoice_detail(
    invoice_id: InvoiceId,
    connection: &Connection,
) -> Result<InvoiceDetail, Error> {
    let invoice = get_invoice(invoice_id, connection)?;
    let vendor = get_vendor(invoice.vendor_id, connection)?;
    let customer = invoice
        .customer_id
        .map(|customer_id| get_customer(customer_id, connection))
        .transpose()?;
    let line_items = get_line_items(invoice_id, connection)?;
    let payments = get_payments(invoice_id, connection)?;

    Ok(InvoiceDetail {
        invoice,
        vendor,
        customer,
        line_items,
        payments,
    })
}
