//! Spend broken down by category.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::Serialize;

use crate::{Error, category::SpendCategory, money::round_to_cents};

/// The spend in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpend {
    /// The category.
    pub category: SpendCategory,
    /// Sum of the grand totals of invoices in the category.
    pub total_spend: f64,
    /// The number of invoices in the category.
    pub invoice_count: u32,
    /// Share of the spend across all categorised invoices, in percent.
    pub percentage: f64,
}

/// Sum the spend of every categorised invoice by category.
///
/// Sorted by spend, largest first, with ties broken by category name.
/// Percentages are taken against the sum of the rounded category totals so
/// that they add up to 100 within rounding.
pub fn get_category_spend(connection: &Connection) -> Result<Vec<CategorySpend>, Error> {
    let mut totals: BTreeMap<SpendCategory, (u32, f64)> = BTreeMap::new();

    let mut statement = connection
        .prepare("SELECT category, total_amount FROM invoice WHERE category IS NOT NULL")?;
    let rows = statement.query_map([], |row| {
        Ok((row.get::<_, SpendCategory>(0)?, row.get::<_, f64>(1)?))
    })?;

    for row in rows {
        let (category, total_amount) = row?;
        let entry = totals.entry(category).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += total_amount;
    }

    let mut categories: Vec<CategorySpend> = totals
        .into_iter()
        .map(|(category, (invoice_count, total_spend))| CategorySpend {
            category,
            total_spend: round_to_cents(total_spend),
            invoice_count,
            percentage: 0.0,
        })
        .collect();

    categories.sort_by(|a, b| {
        b.total_spend
            .total_cmp(&a.total_spend)
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });

    let grand_total: f64 = categories.iter().map(|category| category.total_spend).sum();
    if grand_total > 0.0 {
        for category in &mut categories {
            category.percentage = round_to_cents(category.total_spend / grand_total * 100.0);
        }
    }

    Ok(categories)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        address::split_address,
        category::SpendCategory,
        db::initialize,
        invoice::{Invoice, create_invoice},
        vendor::create_vendor,
    };

    use super::get_category_spend;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_invoices(invoices: &[(Option<SpendCategory>, f64)], conn: &Connection) {
        let vendor = create_vendor("ACME", &split_address(""), None, conn).unwrap();
        for (category, total) in invoices {
            create_invoice(
                Invoice::build("INV", vendor.id, date!(2025 - 01 - 01), *total).category(*category),
                conn,
            )
            .unwrap();
        }
    }

    #[test]
    fn sorts_by_spend_and_ignores_uncategorised() {
        let conn = get_test_connection();
        insert_invoices(
            &[
                (Some(SpendCategory::Operations), 100.0),
                (Some(SpendCategory::Marketing), 250.0),
                (Some(SpendCategory::Operations), 50.0),
                (None, 1000.0),
            ],
            &conn,
        );

        let categories = get_category_spend(&conn).unwrap();

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].category, SpendCategory::Marketing);
        assert_eq!(categories[0].total_spend, 250.0);
        assert_eq!(categories[0].percentage, 62.5);
        assert_eq!(categories[1].category, SpendCategory::Operations);
        assert_eq!(categories[1].invoice_count, 2);
        assert_eq!(categories[1].percentage, 37.5);
    }

    #[test]
    fn ties_are_ordered_by_name() {
        let conn = get_test_connection();
        insert_invoices(
            &[
                (Some(SpendCategory::Operations), 10.0),
                (Some(SpendCategory::Facilities), 10.0),
                (Some(SpendCategory::Marketing), 10.0),
            ],
            &conn,
        );

        let names: Vec<_> = get_category_spend(&conn)
            .unwrap()
            .into_iter()
            .map(|category| category.category.as_str())
            .collect();

        assert_eq!(names, ["Facilities", "Marketing", "Operations"]);
    }

    #[test]
    fn category_totals_add_up_to_grand_total() {
        let conn = get_test_connection();
        let totals = [19.99, 0.01, 1234.56, 7.77, 88.8, 300.33, 42.42];
        let categorised: Vec<_> = totals
            .iter()
            .enumerate()
            .map(|(i, total)| (Some(SpendCategory::ALL[i % 3]), *total))
            .collect();
        insert_invoices(&categorised, &conn);

        let categories = get_category_spend(&conn).unwrap();

        let category_sum: f64 = categories.iter().map(|category| category.total_spend).sum();
        let grand_total: f64 = totals.iter().sum();
        assert!(
            (category_sum - grand_total).abs() < 0.01,
            "{category_sum} != {grand_total}"
        );
        let percentage_sum: f64 = categories.iter().map(|category| category.percentage).sum();
        assert!((percentage_sum - 100.0).abs() < 0.05);
    }

    #[test]
    fn no_invoices_gives_no_categories() {
        let conn = get_test_connection();

        assert_eq!(get_category_spend(&conn).unwrap(), vec![]);
    }
}
