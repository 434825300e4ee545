//! Creates and clears the tables for the application's domain models.

use std::sync::Mutex;

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    customer::create_customer_table,
    invoice::{create_invoice_table, create_line_item_table, create_payment_table},
    vendor::create_vendor_table,
};

/// Create the application tables if they do not already exist.
///
/// Also turns on foreign key enforcement for `connection`, which SQLite
/// leaves off by default.
///
/// # Errors
/// Returns an error if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_vendor_table(&transaction)?;
    create_customer_table(&transaction)?;
    create_invoice_table(&transaction)?;
    create_line_item_table(&transaction)?;
    create_payment_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Delete every row of the domain tables, children before parents.
///
/// # Errors
/// Returns an error if a delete fails.
pub fn clear_all_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    for table in ["payment", "line_item", "invoice", "customer", "vendor"] {
        connection.execute(&format!("DELETE FROM {table}"), ())?;
    }

    Ok(())
}

/// Lock the shared connection and run `query` with it.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock is poisoned, otherwise
/// whatever `query` returns.
pub fn with_connection<T>(
    db_connection: &Mutex<Connection>,
    query: impl FnOnce(&Connection) -> Result<T, Error>,
) -> Result<T, Error> {
    let connection = db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    query(&connection)
}

/// Build a `LIKE` pattern that matches text containing `search`.
///
/// `%`, `_` and `\` in `search` are escaped, so queries must use
/// `ESCAPE '\'`.
pub fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');

    pattern
}
