//! Monthly invoice counts and spend.

use std::{collections::BTreeMap, ops::RangeInclusive};

use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{Error, money::round_to_cents, stats::range::month_key};

/// Invoice activity for one month of issue dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    /// The month as `YYYY-MM`.
    pub month: String,
    /// The number of invoices issued in the month.
    pub invoice_count: u32,
    /// Sum of their grand totals.
    pub total_spend: f64,
    /// `total_spend` divided by `invoice_count`.
    pub avg_invoice_value: f64,
}

/// Group the invoices issued within `date_range` by month.
///
/// Months without invoices are left out. The result is in ascending month order.
pub fn get_invoice_trends(
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<MonthlyTrend>, Error> {
    let mut totals: BTreeMap<String, (u32, f64)> = BTreeMap::new();

    let mut statement = connection.prepare(
        "SELECT issue_date, total_amount FROM invoice WHERE issue_date BETWEEN ?1 AND ?2",
    )?;
    let rows = statement.query_map((date_range.start(), date_range.end()), |row| {
        Ok((row.get::<_, Date>(0)?, row.get::<_, f64>(1)?))
    })?;

    for row in rows {
        let (issue_date, total_amount) = row?;
        let entry = totals.entry(month_key(issue_date)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += total_amount;
    }

    Ok(totals
        .into_iter()
        .map(|(month, (invoice_count, total_spend))| MonthlyTrend {
            month,
            invoice_count,
            total_spend: round_to_cents(total_spend),
            avg_invoice_value: round_to_cents(total_spend / f64::from(invoice_count)),
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
        invoice::{Invoice, create_invoice},
        vendor::create_vendor,
    };

    use super::{MonthlyTrend, get_invoice_trends};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_invoice(issue_date: Date, total: f64, conn: &Connection) {
        let vendor = create_vendor("ACME", &split_address(""), None, conn).unwrap();
        create_invoice(Invoice::build("INV", vendor.id, issue_date, total), conn).unwrap();
    }

    #[test]
    fn groups_by_issue_month_in_order() {
        let conn = get_test_connection();
        insert_invoice(date!(2025 - 03 - 31), 100.0, &conn);
        insert_invoice(date!(2025 - 01 - 15), 10.0, &conn);
        insert_invoice(date!(2025 - 03 - 01), 50.5, &conn);
        insert_invoice(date!(2025 - 03 - 02), 0.01, &conn);

        let trends =
            get_invoice_trends(date!(2025 - 01 - 01)..=date!(2025 - 12 - 31), &conn).unwrap();

        assert_eq!(
            trends,
            vec![
                MonthlyTrend {
                    month: "2025-01".to_owned(),
                    invoice_count: 1,
                    total_spend: 10.0,
                    avg_invoice_value: 10.0,
                },
                MonthlyTrend {
                    month: "2025-03".to_owned(),
                    invoice_count: 3,
                    total_spend: 150.51,
                    avg_invoice_value: 50.17,
                },
            ]
        );
    }

    #[test]
    fn range_is_inclusive() {
        let conn = get_test_connection();
        insert_invoice(date!(2024 - 12 - 31), 1.0, &conn);
        insert_invoice(date!(2025 - 01 - 01), 2.0, &conn);
        insert_invoice(date!(2025 - 01 - 31), 3.0, &conn);
        insert_invoice(date!(2025 - 02 - 01), 4.0, &conn);

        let trends =
            get_invoice_trends(date!(2025 - 01 - 01)..=date!(2025 - 01 - 31), &conn).unwrap();

        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].invoice_count, 2);
        assert_eq!(trends[0].total_spend, 5.0);
    }
}
