//! Checks an extracted invoice record and converts it into the values that
//! get stored.

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    address::{PostalAddress, split_address},
    invoice::NewLineItem,
    raw_record::ExtractedInvoice,
};

/// Why a record was left out of a load.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SkipReason {
    /// The record did not have the shape of an invoice export record.
    #[error("the record could not be read: {0}")]
    Malformed(String),

    /// The vendor name was missing or empty.
    #[error("the record has no vendor name")]
    MissingVendorName,

    /// The invoice ID was missing or empty.
    #[error("the record has no invoice ID")]
    MissingInvoiceId,

    /// The invoice date was missing or empty.
    #[error("the record has no invoice date")]
    MissingInvoiceDate,

    /// The grand total was zero or missing.
    #[error("the invoice total is zero")]
    ZeroTotal,

    /// The invoice date or due date was not in a supported format.
    #[error("could not parse the date \"{0}\"")]
    InvalidDate(String),

    /// Storing the record failed.
    #[error("could not store the record: {0}")]
    Database(#[from] Error),
}

impl From<rusqlite::Error> for SkipReason {
    fn from(error: rusqlite::Error) -> Self {
        SkipReason::Database(error.into())
    }
}

/// A record that has everything needed to store an invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRecord {
    pub vendor_name: String,
    pub vendor_address: PostalAddress,
    pub vendor_tax_id: Option<String>,
    pub customer: Option<(String, PostalAddress)>,
    pub invoice_number: String,
    pub issue_date: Date,
    pub due_date: Option<Date>,
    pub description: String,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub line_items: Vec<NewLineItem>,
}

impl TryFrom<ExtractedInvoice> for ValidRecord {
    type Error = SkipReason;

    fn try_from(extracted: ExtractedInvoice) -> Result<Self, Self::Error> {
        let vendor_name = extracted.vendor_name.ok_or(SkipReason::MissingVendorName)?;
        let invoice_id = extracted.invoice_id.ok_or(SkipReason::MissingInvoiceId)?;
        let invoice_date = extracted
            .invoice_date
            .ok_or(SkipReason::MissingInvoiceDate)?;

        if extracted.invoice_total == 0.0 {
            return Err(SkipReason::ZeroTotal);
        }

        let issue_date = parse_date(&invoice_date)?;
        let due_date = extracted.due_date.as_deref().map(parse_date).transpose()?;

        Ok(Self {
            vendor_address: stored_address(&extracted.vendor_address),
            vendor_name,
            vendor_tax_id: extracted.vendor_tax_id,
            customer: extracted
                .customer_name
                .map(|name| (name, stored_address(&extracted.customer_address))),
            invoice_number: format!("INV-{invoice_id}"),
            issue_date,
            due_date,
            description: extracted.description,
            subtotal: extracted.subtotal,
            tax_amount: extracted.total_tax,
            total_amount: extracted.invoice_total,
            line_items: extracted
                .line_items
                .into_iter()
                .map(|item| NewLineItem {
                    description: item.description,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    amount: item.amount,
                    category: item.category,
                })
                .collect(),
        })
    }
}

/// Split `raw_address`, keeping the whole string as the street address when
/// the split finds no street.
fn stored_address(raw_address: &str) -> PostalAddress {
    let mut address = split_address(raw_address);

    if address.address.is_empty() {
        address.address = raw_address.to_owned();
    }

    address
}

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DOTTED_DATE: &[BorrowedFormatItem<'static>] = format_description!("[day].[month].[year]");

/// Parse a date written as `YYYY-MM-DD`, a timestamp starting with one, or
/// `DD.MM.YYYY`.
///
/// Only the date part of a timestamp is used, so the time and offset are
/// ignored.
pub fn parse_date(text: &str) -> Result<Date, SkipReason> {
    let text = text.trim();

    text.get(..10)
        .and_then(|prefix| Date::parse(prefix, ISO_DATE).ok())
        .or_else(|| Date::parse(text, DOTTED_DATE).ok())
        .ok_or_else(|| SkipReason::InvalidDate(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::raw_record::{ExtractedInvoice, ExtractedLineItem};

    use super::{SkipReason, ValidRecord, parse_date};

    fn extracted() -> ExtractedInvoice {
        ExtractedInvoice {
            source_id: "doc-1".to_owned(),
            description: "invoice-1.pdf".to_owned(),
            vendor_name: Some("ACME GmbH".to_owned()),
            vendor_address: "Hauptstr. 5, Berlin, 10115, Germany".to_owned(),
            vendor_tax_id: None,
            customer_name: Some("Buyer AG".to_owned()),
            customer_address: String::new(),
            invoice_id: Some("1001".to_owned()),
            invoice_date: Some("2025-03-04".to_owned()),
            due_date: Some("03.04.2025".to_owned()),
            subtotal: 840.34,
            total_tax: 159.66,
            invoice_total: 1000.0,
            line_items: vec![ExtractedLineItem {
                description: "Software license".to_owned(),
                quantity: 2.0,
                unit_price: 420.17,
                amount: 840.34,
                category: Some("4964".to_owned()),
            }],
        }
    }

    #[test]
    fn converts_complete_record() {
        let record = ValidRecord::try_from(extracted()).unwrap();

        assert_eq!(record.invoice_number, "INV-1001");
        assert_eq!(record.issue_date, date!(2025 - 03 - 04));
        assert_eq!(record.due_date, Some(date!(2025 - 04 - 03)));
        assert_eq!(record.vendor_address.city, "Berlin");
        assert_eq!(record.customer.as_ref().map(|(name, _)| name.as_str()), Some("Buyer AG"));
        assert_eq!(record.line_items.len(), 1);
        assert_eq!(record.total_amount, 1000.0);
    }

    #[test]
    fn missing_fields_are_skipped() {
        let skip = |change: fn(&mut ExtractedInvoice)| {
            let mut record = extracted();
            change(&mut record);
            ValidRecord::try_from(record).unwrap_err()
        };

        assert_eq!(skip(|r| r.vendor_name = None), SkipReason::MissingVendorName);
        assert_eq!(skip(|r| r.invoice_id = None), SkipReason::MissingInvoiceId);
        assert_eq!(skip(|r| r.invoice_date = None), SkipReason::MissingInvoiceDate);
        assert_eq!(skip(|r| r.invoice_total = 0.0), SkipReason::ZeroTotal);
        assert_eq!(
            skip(|r| r.due_date = Some("soon".to_owned())),
            SkipReason::InvalidDate("soon".to_owned())
        );
    }

    #[test]
    fn street_falls_back_to_whole_address() {
        let mut record = extracted();
        record.vendor_address = ", Berlin".to_owned();

        let record = ValidRecord::try_from(record).unwrap();

        assert_eq!(record.vendor_address.address, ", Berlin");
        assert_eq!(record.vendor_address.city, "Berlin");
    }

    #[test]
    fn empty_address_stays_empty() {
        let record = ValidRecord::try_from(extracted()).unwrap();
        let (_, customer_address) = record.customer.unwrap();

        assert_eq!(customer_address.address, "");
        assert_eq!(customer_address.country, "");
    }

    #[test]
    fn parses_supported_date_formats() {
        assert_eq!(parse_date("2025-03-04"), Ok(date!(2025 - 03 - 04)));
        assert_eq!(
            parse_date("2025-03-04T23:30:00-05:00"),
            Ok(date!(2025 - 03 - 04))
        );
        assert_eq!(parse_date("2025-03-04 12:00"), Ok(date!(2025 - 03 - 04)));
        assert_eq!(parse_date("04.03.2025"), Ok(date!(2025 - 03 - 04)));
        assert_eq!(parse_date(" 2025-03-04 "), Ok(date!(2025 - 03 - 04)));
    }

    #[test]
    fn rejects_unparseable_dates() {
        assert!(parse_date("March 4th").is_err());
        assert!(parse_date("2025-13-01").is_err());
        assert!(parse_date("").is_err());
    }
}
