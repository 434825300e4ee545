//! Invoices, their line items and payments.

mod core;
mod detail;
mod list;
mod status;

#[cfg(test)]
pub(crate) use self::core::create_payment;
pub use self::core::{
    Invoice, LineItem, NewLineItem, Payment, count_invoices, create_invoice, create_invoice_table,
    create_line_item_table, create_payment_table, get_invoice, get_line_items, get_payments,
};
pub use detail::get_invoice_endpoint;
pub use list::{
    InvoiceFilter, InvoiceListItem, InvoicesState, SortField, SortOrder, get_invoices_endpoint,
    list_invoices,
};
pub use status::InvoiceStatus;
