//! Headline figures for the dashboard cards.

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    invoice::{InvoiceStatus, count_invoices},
    money::round_to_cents,
    vendor::count_vendors,
};

/// Totals over every stored invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    /// The number of stored invoices.
    pub total_invoices: u32,
    /// Sum of invoice grand totals.
    pub total_spend: f64,
    /// The number of stored vendors, including those without invoices.
    pub unique_vendors: u32,
    /// Zero when there are no invoices.
    pub avg_invoice_value: f64,
    /// Invoices stored as [InvoiceStatus::Pending].
    pub pending_invoices: u32,
    /// Invoices stored as [InvoiceStatus::Paid].
    pub paid_invoices: u32,
    /// Invoices stored as [InvoiceStatus::Overdue].
    pub overdue_invoices: u32,
}

/// Compute the overview figures.
pub fn get_overview_stats(connection: &Connection) -> Result<OverviewStats, Error> {
    let total_invoices = count_invoices(connection)?;
    let unique_vendors = count_vendors(connection)?;

    let mut total_spend = 0.0;
    let mut pending_invoices = 0;
    let mut paid_invoices = 0;
    let mut overdue_invoices = 0;

    let mut statement = connection.prepare("SELECT status, total_amount FROM invoice")?;
    let rows = statement.query_map([], |row| {
        Ok((row.get::<_, InvoiceStatus>(0)?, row.get::<_, f64>(1)?))
    })?;

    for row in rows {
        let (status, total_amount) = row?;
        total_spend += total_amount;

        match status {
            InvoiceStatus::Pending => pending_invoices += 1,
            InvoiceStatus::Paid => paid_invoices += 1,
            InvoiceStatus::Overdue => overdue_invoices += 1,
        }
    }

    let avg_invoice_value = if total_invoices > 0 {
        round_to_cents(total_spend / f64::from(total_invoices))
    } else {
        0.0
    };

    Ok(OverviewStats {
        total_invoices,
        total_spend: round_to_cents(total_spend),
        unique_vendors,
        avg_invoice_value,
        pending_invoices,
        paid_invoices,
        overdue_invoices,
    })
}
