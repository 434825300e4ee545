//! A full reseed of the database from an exported JSON file.

use std::{fs, path::Path};

use rand::{SeedableRng, rngs::StdRng};
use rusqlite::{Connection, Transaction};
use serde::Serialize;
use serde_json::Value;
use time::Date;

use crate::{
    Error,
    category::classify_category,
    customer::create_customer,
    database_id::{CustomerId, VendorId},
    db::clear_all_tables,
    invoice::{Invoice, InvoiceStatus, create_invoice},
    load::{
        name_index::NameIndex,
        record::{SkipReason, ValidRecord},
    },
    raw_record::RawInvoiceRecord,
    vendor::create_vendor,
};

/// Settings for one load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// The date invoice statuses are derived against.
    pub today: Date,
    /// Seeds the fallback category picker. Without a seed, categories of
    /// invoices that match no keyword differ between loads.
    pub seed: Option<u64>,
}

/// What a load did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Vendors created.
    pub vendors: usize,
    /// Customers created.
    pub customers: usize,
    /// Records stored as invoices.
    pub processed: usize,
    /// Records left out.
    pub skipped: usize,
}

/// Replace the stored data with the records in the JSON file at `path`.
///
/// # Errors
/// Returns [Error::ReadInput] if the file cannot be read, [Error::InvalidInput]
/// if it is not a JSON array, or an error from clearing the tables or
/// committing. Problems with individual records are counted as skips instead.
pub fn load_from_path(
    path: &Path,
    connection: &mut Connection,
    options: &LoadOptions,
) -> Result<LoadSummary, Error> {
    tracing::info!("Reading invoice records from {}", path.display());

    let text = fs::read_to_string(path).map_err(|error| Error::ReadInput {
        path: path.display().to_string(),
        reason: error.to_string(),
    })?;

    let records: Vec<Value> =
        serde_json::from_str(&text).map_err(|error| Error::InvalidInput(error.to_string()))?;

    load_records(records, connection, options)
}

/// Replace the stored data with `records`.
///
/// Everything happens in one transaction: either the old data is replaced
/// or nothing changes. Within it, each record is stored under its own
/// savepoint so a record that fails leaves nothing behind.
///
/// # Errors
/// Returns an error if the tables cannot be cleared or the transaction
/// cannot be committed.
pub fn load_records(
    records: Vec<Value>,
    connection: &mut Connection,
    options: &LoadOptions,
) -> Result<LoadSummary, Error> {
    tracing::info!("Found {} invoice records to process", records.len());

    let mut transaction = connection.transaction()?;

    tracing::info!("Clearing existing data");
    clear_all_tables(&transaction)?;

    let mut loader = Loader {
        vendors: NameIndex::new(),
        customers: NameIndex::new(),
        rng: match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        },
        today: options.today,
    };
    let mut processed = 0;
    let mut skipped = 0;

    for (index, record) in records.into_iter().enumerate() {
        match loader.load_record(record, &mut transaction) {
            Ok(invoice) => {
                processed += 1;
                tracing::debug!("Stored invoice {}", invoice.invoice_number);
            }
            Err(SkipReason::Database(error)) => {
                skipped += 1;
                tracing::error!("Error processing record {index}: {error}");
            }
            Err(reason) => {
                skipped += 1;
                tracing::warn!("Skipping record {index}: {reason}");
            }
        }
    }

    transaction.commit()?;

    let summary = LoadSummary {
        vendors: loader.vendors.len(),
        customers: loader.customers.len(),
        processed,
        skipped,
    };

    tracing::info!(
        "Load completed: {} vendors, {} customers, {} invoices processed, {} skipped",
        summary.vendors,
        summary.customers,
        summary.processed,
        summary.skipped
    );

    Ok(summary)
}

/// The state carried from one record to the next.
struct Loader {
    vendors: NameIndex<VendorId>,
    customers: NameIndex<CustomerId>,
    rng: StdRng,
    today: Date,
}

impl Loader {
    fn load_record(
        &mut self,
        record: Value,
        transaction: &mut Transaction,
    ) -> Result<Invoice, SkipReason> {
        let raw: RawInvoiceRecord = serde_json::from_value(record)
            .map_err(|error| SkipReason::Malformed(error.to_string()))?;
        let extracted = raw.extract();
        let source_id = extracted.source_id.clone();

        let record = ValidRecord::try_from(extracted)
            .inspect_err(|reason| tracing::debug!("Record \"{source_id}\" is invalid: {reason}"))?;

        tracing::info!(
            "Processing invoice {} ({})",
            record.invoice_number,
            record.vendor_name
        );

        let savepoint = transaction.savepoint()?;

        match self.store(record, &savepoint) {
            Ok(invoice) => {
                savepoint.commit()?;
                self.vendors.commit();
                self.customers.commit();
                Ok(invoice)
            }
            Err(reason) => {
                // Dropping the savepoint rolls it back.
                drop(savepoint);
                self.vendors.rollback();
                self.customers.rollback();
                Err(reason)
            }
        }
    }

    fn store(
        &mut self,
        record: ValidRecord,
        connection: &Connection,
    ) -> Result<Invoice, SkipReason> {
        let vendor_id = self.vendors.resolve_with(&record.vendor_name, |name| {
            tracing::debug!("Creating vendor: {name}");
            create_vendor(
                name,
                &record.vendor_address,
                record.vendor_tax_id.as_deref(),
                connection,
            )
            .map(|vendor| vendor.id)
        })?;

        let customer_id = record
            .customer
            .as_ref()
            .map(|(customer_name, customer_address)| {
                self.customers.resolve_with(customer_name, |name| {
                    tracing::debug!("Creating customer: {name}");
                    create_customer(name, customer_address, connection).map(|customer| customer.id)
                })
            })
            .transpose()?;

        let status = InvoiceStatus::classify(record.issue_date, record.due_date, None, self.today);

        let first_item_description = record
            .line_items
            .first()
            .map(|item| item.description.as_str())
            .unwrap_or_default();
        let category =
            classify_category(first_item_description, &record.vendor_name, &mut self.rng);

        tracing::debug!(
            "Creating invoice {} with {} line items",
            record.invoice_number,
            record.line_items.len()
        );

        let invoice = create_invoice(
            Invoice::build(
                &record.invoice_number,
                vendor_id,
                record.issue_date,
                record.total_amount,
            )
            .customer_id(customer_id)
            .due_date(record.due_date)
            .status(status)
            .category(Some(category))
            .description(&record.description)
            .amounts(record.subtotal, record.tax_amount)
            .line_items(record.line_items),
            connection,
        )?;

        Ok(invoice)
    }
}
