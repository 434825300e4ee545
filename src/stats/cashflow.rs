//! Cash outflow grouped by the month invoices fall due.

use std::{collections::BTreeMap, ops::RangeInclusive};

use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{Error, invoice::InvoiceStatus, money::round_to_cents, stats::range::month_key};

/// Money owed to vendors in one month of due dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOutflow {
    /// The month as `YYYY-MM`.
    pub month: String,
    /// Pending and paid invoices.
    pub expected_outflow: f64,
    /// Overdue invoices.
    pub overdue_amount: f64,
    /// `expected_outflow` plus `overdue_amount`.
    pub total_outflow: f64,
}

/// Group the invoices due within `date_range` by due month.
///
/// Invoices without a due date are left out. The result is in ascending
/// month order.
pub fn get_cash_outflow(
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<CashOutflow>, Error> {
    let mut totals: BTreeMap<String, (f64, f64)> = BTreeMap::new();

    let mut statement = connection.prepare(
        "SELECT due_date, status, total_amount FROM invoice
         WHERE due_date IS NOT NULL AND due_date BETWEEN ?1 AND ?2",
    )?;
    let rows = statement.query_map((date_range.start(), date_range.end()), |row| {
        Ok((
            row.get::<_, Date>(0)?,
            row.get::<_, InvoiceStatus>(1)?,
            row.get::<_, f64>(2)?,
        ))
    })?;

    for row in rows {
        let (due_date, status, total_amount) = row?;
        let (expected, overdue) = totals.entry(month_key(due_date)).or_insert((0.0, 0.0));

        match status {
            InvoiceStatus::Overdue => *overdue += total_amount,
            InvoiceStatus::Pending | InvoiceStatus::Paid => *expected += total_amount,
        }
    }

    Ok(totals
        .into_iter()
        .map(|(month, (expected, overdue))| CashOutflow {
            month,
            expected_outflow: round_to_cents(expected),
            overdue_amount: round_to_cents(overdue),
            total_outflow: round_to_cents(expected + overdue),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::{
        address::split_address,
        db::initialize,
        invoice::{Invoice, InvoiceStatus, create_invoice},
        vendor::create_vendor,
    };

    use super::{CashOutflow, get_cash_outflow};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_invoice(
        due_date: Option<Date>,
        status: InvoiceStatus,
        total: f64,
        conn: &Connection,
    ) {
        let vendor = create_vendor("ACME", &split_address(""), None, conn).unwrap();
        create_invoice(
            Invoice::build("INV", vendor.id, date!(2025 - 01 - 01), total)
                .due_date(due_date)
                .status(status),
            conn,
        )
        .unwrap();
    }

    #[test]
    fn splits_overdue_from_expected() {
        let conn = get_test_connection();
        insert_invoice(Some(date!(2025 - 02 - 10)), InvoiceStatus::Pending, 100.0, &conn);
        insert_invoice(Some(date!(2025 - 02 - 20)), InvoiceStatus::Overdue, 40.0, &conn);
        insert_invoice(Some(date!(2025 - 02 - 28)), InvoiceStatus::Paid, 10.0, &conn);
        insert_invoice(Some(date!(2025 - 01 - 05)), InvoiceStatus::Overdue, 5.5, &conn);
        insert_invoice(None, InvoiceStatus::Pending, 999.0, &conn);

        let outflow =
            get_cash_outflow(date!(2025 - 01 - 01)..=date!(2025 - 03 - 31), &conn).unwrap();

        assert_eq!(
            outflow,
            vec![
                CashOutflow {
                    month: "2025-01".to_owned(),
                    expected_outflow: 0.0,
                    overdue_amount: 5.5,
                    total_outflow: 5.5,
                },
                CashOutflow {
                    month: "2025-02".to_owned(),
                    expected_outflow: 110.0,
                    overdue_amount: 40.0,
                    total_outflow: 150.0,
                },
            ]
        );
    }

    #[test]
    fn ignores_invoices_due_outside_range() {
        let conn = get_test_connection();
        insert_invoice(Some(date!(2024 - 12 - 31)), InvoiceStatus::Pending, 1.0, &conn);
        insert_invoice(Some(date!(2025 - 04 - 01)), InvoiceStatus::Pending, 1.0, &conn);

        let outflow =
            get_cash_outflow(date!(2025 - 01 - 01)..=date!(2025 - 03 - 31), &conn).unwrap();

        assert!(outflow.is_empty());
    }
}
