//! Vendors ranked by spend.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::Serialize;

use crate::{Error, database_id::VendorId, money::round_to_cents};

/// A vendor's total spend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSpend {
    /// The vendor's ID.
    pub id: VendorId,
    /// The vendor's name.
    pub name: String,
    /// Zero for vendors without invoices.
    pub invoice_count: u32,
    /// Sum of the grand totals of the vendor's invoices.
    pub total_spend: f64,
}

/// Get the `limit` vendors with the highest spend.
///
/// Vendors without invoices are included with zero spend. Equal spend is
/// ordered by vendor ID, lowest first.
pub fn get_top_vendors(limit: usize, connection: &Connection) -> Result<Vec<VendorSpend>, Error> {
    let mut vendors: BTreeMap<VendorId, VendorSpend> = BTreeMap::new();

    let mut statement = connection.prepare(
        "SELECT v.id, v.name, i.total_amount
         FROM vendor v LEFT JOIN invoice i ON i.vendor_id = v.id",
    )?;
    let rows = statement.query_map([], |row| {
        Ok((
            row.get::<_, VendorId>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<f64>>(2)?,
        ))
    })?;

    for row in rows {
        let (id, name, total_amount) = row?;
        let vendor = vendors.entry(id).or_insert_with(|| VendorSpend {
            id,
            name,
            invoice_count: 0,
            total_spend: 0.0,
        });

        if let Some(total_amount) = total_amount {
            vendor.invoice_count += 1;
            vendor.total_spend += total_amount;
        }
    }

    // Already in ID order, and the sort is stable.
    let mut ranked: Vec<VendorSpend> = vendors
        .into_values()
        .map(|vendor| VendorSpend {
            total_spend: round_to_cents(vendor.total_spend),
            ..vendor
        })
        .collect();
    ranked.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));
    ranked.truncate(limit);

    Ok(ranked)
}
