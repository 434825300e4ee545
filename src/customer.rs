//! Customers: the businesses invoices are addressed to.

use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::{Error, address::PostalAddress, database_id::CustomerId};

/// The recipient of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// Create a customer and return it with its generated ID.
pub fn create_customer(
    name: &str,
    address: &PostalAddress,
    connection: &Connection,
) -> Result<Customer, Error> {
    let customer = connection
        .prepare(
            "INSERT INTO customer (name, address, city, state, zip_code, country)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, name, address, city, state, zip_code, country",
        )?
        .query_row(
            (
                name,
                &address.address,
                &address.city,
                &address.state,
                &address.zip_code,
                &address.country,
            ),
            map_customer_row,
        )?;

    Ok(customer)
}

/// Retrieve a single customer by ID.
pub fn get_customer(customer_id: CustomerId, connection: &Connection) -> Result<Customer, Error> {
    connection
        .prepare(
            "SELECT id, name, address, city, state, zip_code, country
             FROM customer WHERE id = :id",
        )?
        .query_row(&[(":id", &customer_id)], map_customer_row)
        .map_err(|error| error.into())
}

/// Initialize the customer table.
pub fn create_customer_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS customer (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            address TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            state TEXT NOT NULL DEFAULT '',
            zip_code TEXT NOT NULL DEFAULT '',
            country TEXT NOT NULL DEFAULT ''
        )",
        (),
    )?;

    Ok(())
}

pub(crate) fn map_customer_row(row: &Row) -> Result<Customer, rusqlite::Error> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        city: row.get(3)?,
        state: row.get(4)?,
        zip_code: row.get(5)?,
        country: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{Error, address::split_address, db::initialize};

    use super::{create_customer, get_customer};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn create_and_get_customer() {
        let connection = get_test_connection();
        let created = create_customer(
            "Buyer AG",
            &split_address("Marktplatz 1, Hamburg, 20095, Germany"),
            &connection,
        )
        .unwrap();

        let got = get_customer(created.id, &connection).unwrap();

        assert_eq!(got, created);
        assert_eq!(got.city, "Hamburg");
        assert_eq!(got.state, "");
    }

    #[test]
    fn missing_customer_is_not_found() {
        let connection = get_test_connection();

        assert_eq!(get_customer(7, &connection), Err(Error::NotFound));
    }
}
