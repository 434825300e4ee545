//! Defines the core data models and database queries for invoices.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    category::SpendCategory,
    database_id::{CustomerId, DatabaseId, InvoiceId, VendorId},
    invoice::InvoiceStatus,
    vendor::get_vendor,
};

// ============================================================================
// MODELS
// ============================================================================

/// A bill issued by a vendor.
///
/// To create a new `Invoice`, use [Invoice::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// The ID of the invoice.
    pub id: InvoiceId,
    /// The human readable invoice number, e.g. "INV-1001".
    pub invoice_number: String,
    /// The vendor that issued the invoice.
    pub vendor_id: VendorId,
    /// The customer the invoice is addressed to, if known.
    pub customer_id: Option<CustomerId>,
    /// When the invoice was issued.
    pub issue_date: Date,
    /// When the invoice must be paid by.
    pub due_date: Option<Date>,
    /// When the invoice was paid.
    pub payment_date: Option<Date>,
    /// Where the invoice is in its lifecycle, as classified when it was stored.
    pub status: InvoiceStatus,
    /// The spend category, if classified.
    pub category: Option<SpendCategory>,
    /// Free text describing the invoice, usually the source document name.
    pub description: String,
    /// The net amount before tax.
    pub subtotal: f64,
    /// The tax charged.
    pub tax_amount: f64,
    /// Any discount given.
    pub discount_amount: f64,
    /// The grand total. All spend figures are sums of this field.
    pub total_amount: f64,
}

impl Invoice {
    /// Create a new invoice.
    ///
    /// Shortcut for [InvoiceBuilder] for discoverability.
    pub fn build(
        invoice_number: &str,
        vendor_id: VendorId,
        issue_date: Date,
        total_amount: f64,
    ) -> InvoiceBuilder {
        InvoiceBuilder {
            invoice_number: invoice_number.to_owned(),
            vendor_id,
            customer_id: None,
            issue_date,
            due_date: None,
            payment_date: None,
            status: InvoiceStatus::Pending,
            category: None,
            description: String::new(),
            subtotal: 0.0,
            tax_amount: 0.0,
            discount_amount: 0.0,
            total_amount,
            line_items: Vec::new(),
        }
    }
}

/// A builder for creating [Invoice] instances.
///
/// Optional fields default to `None`, zero or empty, and the status defaults
/// to [InvoiceStatus::Pending]. Pass the builder to [create_invoice] to store
/// the invoice and its line items.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceBuilder {
    pub invoice_number: String,
    pub vendor_id: VendorId,
    pub customer_id: Option<CustomerId>,
    pub issue_date: Date,
    pub due_date: Option<Date>,
    pub payment_date: Option<Date>,
    pub status: InvoiceStatus,
    pub category: Option<SpendCategory>,
    pub description: String,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    /// Stored in this order.
    pub line_items: Vec<NewLineItem>,
}

impl InvoiceBuilder {
    /// Set the customer the invoice is addressed to.
    pub fn customer_id(mut self, customer_id: Option<CustomerId>) -> Self {
        self.customer_id = customer_id;
        self
    }

    /// Set the due date.
    pub fn due_date(mut self, due_date: Option<Date>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Set the status.
    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the spend category.
    pub fn category(mut self, category: Option<SpendCategory>) -> Self {
        self.category = category;
        self
    }

    /// Set the description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the subtotal and tax amount.
    pub fn amounts(mut self, subtotal: f64, tax_amount: f64) -> Self {
        self.subtotal = subtotal;
        self.tax_amount = tax_amount;
        self
    }

    /// Set the line items.
    pub fn line_items(mut self, line_items: Vec<NewLineItem>) -> Self {
        self.line_items = line_items;
        self
    }
}

/// One line of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: DatabaseId,
    pub invoice_id: InvoiceId,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// The extended amount for the line.
    pub amount: f64,
    /// The ledger account the line was booked to, if known.
    pub category: Option<String>,
}

/// A line item that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
    pub category: Option<String>,
}

/// A payment made against an invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: DatabaseId,
    pub invoice_id: InvoiceId,
    pub payment_date: Date,
    pub amount: f64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const INVOICE_COLUMNS: &str = "id, invoice_number, vendor_id, customer_id, issue_date, \
    due_date, payment_date, status, category, description, subtotal, tax_amount, \
    discount_amount, total_amount";

/// Create a new invoice and its line items in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidVendor] if the vendor ID does not refer to a stored vendor,
/// - [Error::InvalidCustomer] if the customer ID does not refer to a stored customer,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_invoice(builder: InvoiceBuilder, connection: &Connection) -> Result<Invoice, Error> {
    let invoice = connection
        .prepare(&format!(
            "INSERT INTO invoice (invoice_number, vendor_id, customer_id, issue_date, due_date,
                payment_date, status, category, description, subtotal, tax_amount,
                discount_amount, total_amount)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             RETURNING {INVOICE_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                builder.invoice_number,
                builder.vendor_id,
                builder.customer_id,
                builder.issue_date,
                builder.due_date,
                builder.payment_date,
                builder.status,
                builder.category,
                builder.description,
                builder.subtotal,
                builder.tax_amount,
                builder.discount_amount,
                builder.total_amount,
            ],
            map_invoice_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => match get_vendor(builder.vendor_id, connection) {
                Err(Error::NotFound) => Error::InvalidVendor(builder.vendor_id),
                _ => Error::InvalidCustomer(builder.customer_id.unwrap_or_default()),
            },
            error => error.into(),
        })?;

    for line_item in builder.line_items {
        create_line_item(invoice.id, line_item, connection)?;
    }

    Ok(invoice)
}

/// Store a line item for the invoice `invoice_id`.
fn create_line_item(
    invoice_id: InvoiceId,
    line_item: NewLineItem,
    connection: &Connection,
) -> Result<LineItem, Error> {
    connection
        .prepare(
            "INSERT INTO line_item (invoice_id, description, quantity, unit_price, amount, category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, invoice_id, description, quantity, unit_price, amount, category",
        )?
        .query_row(
            (
                invoice_id,
                line_item.description,
                line_item.quantity,
                line_item.unit_price,
                line_item.amount,
                line_item.category,
            ),
            map_line_item_row,
        )
        .map_err(|error| error.into())
}

/// Record a payment against the invoice `invoice_id`.
///
/// This does not change the stored status of the invoice.
#[cfg(test)]
pub(crate) fn create_payment(
    invoice_id: InvoiceId,
    payment_date: Date,
    amount: f64,
    connection: &Connection,
) -> Result<Payment, Error> {
    connection
        .prepare(
            "INSERT INTO payment (invoice_id, payment_date, amount) VALUES (?1, ?2, ?3)
             RETURNING id, invoice_id, payment_date, amount",
        )?
        .query_row((invoice_id, payment_date, amount), map_payment_row)
        .map_err(|error| error.into())
}

/// Retrieve an invoice from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid invoice,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_invoice(id: InvoiceId, connection: &Connection) -> Result<Invoice, Error> {
    let invoice = connection
        .prepare(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoice WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_invoice_row)?;

    Ok(invoice)
}

/// Get the line items of an invoice in the order they were stored.
pub fn get_line_items(
    invoice_id: InvoiceId,
    connection: &Connection,
) -> Result<Vec<LineItem>, Error> {
    connection
        .prepare(
            "SELECT id, invoice_id, description, quantity, unit_price, amount, category
             FROM line_item WHERE invoice_id = ?1 ORDER BY id ASC",
        )?
        .query_map([invoice_id], map_line_item_row)?
        .map(|maybe_item| maybe_item.map_err(|error| error.into()))
        .collect()
}

/// Get the payments for an invoice, newest first.
pub fn get_payments(invoice_id: InvoiceId, connection: &Connection) -> Result<Vec<Payment>, Error> {
    connection
        .prepare(
            "SELECT id, invoice_id, payment_date, amount FROM payment
             WHERE invoice_id = ?1 ORDER BY payment_date DESC, id DESC",
        )?
        .query_map([invoice_id], map_payment_row)?
        .map(|maybe_payment| maybe_payment.map_err(|error| error.into()))
        .collect()
}

/// Get the total number of invoices in the database.
pub fn count_invoices(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM invoice", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the invoice table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_invoice_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS invoice (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            invoice_number TEXT NOT NULL,
            vendor_id INTEGER NOT NULL,
            customer_id INTEGER,
            issue_date TEXT NOT NULL,
            due_date TEXT,
            payment_date TEXT,
            status TEXT NOT NULL,
            category TEXT,
            description TEXT NOT NULL DEFAULT '',
            subtotal REAL NOT NULL DEFAULT 0,
            tax_amount REAL NOT NULL DEFAULT 0,
            discount_amount REAL NOT NULL DEFAULT 0,
            total_amount REAL NOT NULL,
            FOREIGN KEY(vendor_id) REFERENCES vendor(id) ON UPDATE CASCADE ON DELETE RESTRICT,
            FOREIGN KEY(customer_id) REFERENCES customer(id) ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_invoice_issue_date ON invoice(issue_date);
        CREATE INDEX IF NOT EXISTS idx_invoice_due_date ON invoice(due_date);
        CREATE INDEX IF NOT EXISTS idx_invoice_vendor_id ON invoice(vendor_id);",
    )?;

    Ok(())
}

/// Create the line item table in the database.
pub fn create_line_item_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS line_item (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            invoice_id INTEGER NOT NULL,
            description TEXT NOT NULL,
            quantity REAL NOT NULL,
            unit_price REAL NOT NULL,
            amount REAL NOT NULL,
            category TEXT,
            FOREIGN KEY(invoice_id) REFERENCES invoice(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_line_item_invoice_id ON line_item(invoice_id);",
    )?;

    Ok(())
}

/// Create the payment table in the database.
pub fn create_payment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS payment (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            invoice_id INTEGER NOT NULL,
            payment_date TEXT NOT NULL,
            amount REAL NOT NULL,
            FOREIGN KEY(invoice_id) REFERENCES invoice(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_payment_invoice_id ON payment(invoice_id);",
    )?;

    Ok(())
}

/// Map a database row to an Invoice.
///
/// Expects the columns in the order of [INVOICE_COLUMNS], starting at `offset`.
pub(crate) fn map_invoice_row_with_offset(
    row: &Row,
    offset: usize,
) -> Result<Invoice, rusqlite::Error> {
    Ok(Invoice {
        id: row.get(offset)?,
        invoice_number: row.get(offset + 1)?,
        vendor_id: row.get(offset + 2)?,
        customer_id: row.get(offset + 3)?,
        issue_date: row.get(offset + 4)?,
        due_date: row.get(offset + 5)?,
        payment_date: row.get(offset + 6)?,
        status: row.get(offset + 7)?,
        category: row.get(offset + 8)?,
        description: row.get(offset + 9)?,
        subtotal: row.get(offset + 10)?,
        tax_amount: row.get(offset + 11)?,
        discount_amount: row.get(offset + 12)?,
        total_amount: row.get(offset + 13)?,
    })
}

fn map_invoice_row(row: &Row) -> Result<Invoice, rusqlite::Error> {
    map_invoice_row_with_offset(row, 0)
}

fn map_line_item_row(row: &Row) -> Result<LineItem, rusqlite::Error> {
    Ok(LineItem {
        id: row.get(0)?,
        invoice_id: row.get(1)?,
        description: row.get(2)?,
        quantity: row.get(3)?,
        unit_price: row.get(4)?,
        amount: row.get(5)?,
        category: row.get(6)?,
    })
}

fn map_payment_row(row: &Row) -> Result<Payment, rusqlite::Error> {
    Ok(Payment {
        id: row.get(0)?,
        invoice_id: row.get(1)?,
        payment_date: row.get(2)?,
        amount: row.get(3)?,
    })
}

/// The columns selected by invoice queries, for joins in other modules.
pub(crate) fn invoice_columns(table_alias: &str) -> String {
    INVOICE_COLUMNS
        .split(", ")
        .map(|column| format!("{table_alias}.{column}"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        address::split_address,
        category::SpendCategory,
        customer::create_customer,
        db::initialize,
        invoice::{
            Invoice, InvoiceStatus, NewLineItem, count_invoices, create_invoice, create_payment,
            get_invoice, get_line_items, get_payments,
        },
        vendor::create_vendor,
    };

    use super::invoice_columns;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn line_item(description: &str, amount: f64) -> NewLineItem {
        NewLineItem {
            description: description.to_owned(),
            quantity: 1.0,
            unit_price: amount,
            amount,
            category: None,
        }
    }

    #[test]
    fn create_invoice_succeeds() {
        let conn = get_test_connection();
        let vendor = create_vendor("ACME", &split_address(""), None, &conn).unwrap();
        let customer = create_customer("Buyer", &split_address(""), &conn).unwrap();

        let invoice = create_invoice(
            Invoice::build("INV-1001", vendor.id, date!(2025 - 03 - 04), 1190.0)
                .customer_id(Some(customer.id))
                .due_date(Some(date!(2025 - 04 - 03)))
                .status(InvoiceStatus::Overdue)
                .category(Some(SpendCategory::Operations))
                .description("invoice.pdf")
                .amounts(1000.0, 190.0),
            &conn,
        )
        .unwrap();

        assert!(invoice.id > 0);
        assert_eq!(invoice.invoice_number, "INV-1001");
        assert_eq!(invoice.customer_id, Some(customer.id));
        assert_eq!(invoice.status, InvoiceStatus::Overdue);
        assert_eq!(invoice.category, Some(SpendCategory::Operations));
        assert_eq!(invoice.subtotal, 1000.0);
        assert_eq!(invoice.tax_amount, 190.0);
        assert_eq!(invoice.discount_amount, 0.0);
        assert_eq!(get_invoice(invoice.id, &conn), Ok(invoice));
    }

    #[test]
    fn create_invoice_fails_on_missing_vendor() {
        let conn = get_test_connection();

        let result = create_invoice(Invoice::build("INV-1", 42, date!(2025 - 01 - 01), 1.0), &conn);

        assert_eq!(result, Err(Error::InvalidVendor(42)));
    }

    #[test]
    fn create_invoice_fails_on_missing_customer() {
        let conn = get_test_connection();
        let vendor = create_vendor("ACME", &split_address(""), None, &conn).unwrap();

        let result = create_invoice(
            Invoice::build("INV-1", vendor.id, date!(2025 - 01 - 01), 1.0).customer_id(Some(9)),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCustomer(9)));
    }

    #[test]
    fn line_items_keep_their_order() {
        let conn = get_test_connection();
        let vendor = create_vendor("ACME", &split_address(""), None, &conn).unwrap();

        let invoice = create_invoice(
            Invoice::build("INV-1", vendor.id, date!(2025 - 01 - 01), 3.0).line_items(vec![
                line_item("first", 1.0),
                line_item("second", 2.0),
            ]),
            &conn,
        )
        .unwrap();

        let descriptions: Vec<_> = get_line_items(invoice.id, &conn)
            .unwrap()
            .into_iter()
            .map(|item| item.description)
            .collect();
        assert_eq!(descriptions, ["first", "second"]);
    }

    #[test]
    fn payments_are_newest_first() {
        let conn = get_test_connection();
        let vendor = create_vendor("ACME", &split_address(""), None, &conn).unwrap();
        let invoice = create_invoice(
            Invoice::build("INV-1", vendor.id, date!(2025 - 01 - 01), 100.0),
            &conn,
        )
        .unwrap();
        create_payment(invoice.id, date!(2025 - 01 - 10), 40.0, &conn).unwrap();
        create_payment(invoice.id, date!(2025 - 02 - 10), 60.0, &conn).unwrap();

        let payments = get_payments(invoice.id, &conn).unwrap();

        assert_eq!(payments[0].payment_date, date!(2025 - 02 - 10));
        assert_eq!(payments[1].payment_date, date!(2025 - 01 - 10));
    }

    #[test]
    fn get_missing_invoice_is_not_found() {
        let conn = get_test_connection();

        assert_eq!(get_invoice(1, &conn), Err(Error::NotFound));
        assert_eq!(count_invoices(&conn), Ok(0));
    }

    #[test]
    fn prefixes_invoice_columns() {
        assert!(invoice_columns("i").starts_with("i.id, i.invoice_number, i.vendor_id"));
        assert!(invoice_columns("i").ends_with("i.total_amount"));
    }
}
