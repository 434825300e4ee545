//! Types for the nested invoice export and the helpers that read it.
//!
//! The export wraps every field in an object of the form `{"value": ...}`,
//! and any level of the structure may be missing or `null`. The types below
//! model that directly: each wrapped field is an `Option<Wrapped<T>>`, and
//! [extract_value] applies the same presence rule to every leaf.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};

/// A field in the export that may or may not carry a value.
///
/// A `value` of the wrong JSON type is read as missing, so one badly typed
/// field does not make the whole record unreadable.
#[derive(Debug, Clone, PartialEq)]
pub struct Wrapped<T> {
    /// The wrapped value, if any.
    pub value: Option<T>,
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Wrapped<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Untyped {
            #[serde(default)]
            value: Option<serde_json::Value>,
        }

        let untyped = Untyped::deserialize(deserializer)?;
        let value = untyped
            .value
            .and_then(|value| serde_json::from_value(value).ok());

        Ok(Self { value })
    }
}

impl<T> Default for Wrapped<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> Wrapped<T> {
    /// Wrap `value`.
    #[cfg(test)]
    pub fn new(value: T) -> Self {
        Self { value: Some(value) }
    }
}

/// Decides whether an extracted value counts as present.
pub trait Presence {
    /// Returns `false` for values that should be replaced by a default.
    fn is_present(&self) -> bool;
}

impl Presence for String {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for Text {
    fn is_present(&self) -> bool {
        !self.0.is_empty()
    }
}

impl Presence for f64 {
    fn is_present(&self) -> bool {
        true
    }
}

/// Return the wrapped value if it is present, otherwise `default`.
///
/// A value is missing when the field itself is absent, when `value` is absent
/// or `null`, or when it is an empty string. Zero is a present number.
pub fn extract_value<T: Presence + Clone>(field: Option<&Wrapped<T>>, default: T) -> T {
    extract_optional(field).unwrap_or(default)
}

/// Like [extract_value] with `None` as the default.
pub fn extract_optional<T: Presence + Clone>(field: Option<&Wrapped<T>>) -> Option<T> {
    field
        .and_then(|wrapped| wrapped.value.as_ref())
        .filter(|value| value.is_present())
        .cloned()
}

/// Get the contents of a wrapped section such as `vendor.value`.
fn section<T>(wrapped: &Option<Wrapped<T>>) -> Option<&T> {
    wrapped.as_ref()?.value.as_ref()
}

/// A text field that some exports write as a number, e.g. account codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text(pub String);

impl From<Text> for String {
    fn from(text: Text) -> Self {
        text.0
    }
}

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNumber {
            String(String),
            Number(serde_json::Number),
        }

        Ok(match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(text) => Text(text),
            StringOrNumber::Number(number) => Text(number.to_string()),
        })
    }
}

/// One record of the invoice export.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawInvoiceRecord {
    /// The document ID assigned by the extraction service.
    #[serde(rename = "_id")]
    pub id: String,
    /// The original file name of the document.
    pub name: Option<String>,
    /// The processing status reported by the extraction service.
    pub status: Option<String>,
    /// The structured data extracted from the document.
    pub extracted_data: Option<ExtractedData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractedData {
    pub llm_data: Option<LlmData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmData {
    pub invoice: Option<Wrapped<InvoiceSection>>,
    pub vendor: Option<Wrapped<VendorSection>>,
    pub customer: Option<Wrapped<CustomerSection>>,
    pub payment: Option<Wrapped<PaymentSection>>,
    pub summary: Option<Wrapped<SummarySection>>,
    pub line_items: Option<Wrapped<LineItemsSection>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvoiceSection {
    pub invoice_id: Option<Wrapped<Text>>,
    pub invoice_date: Option<Wrapped<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VendorSection {
    pub vendor_name: Option<Wrapped<String>>,
    pub vendor_address: Option<Wrapped<String>>,
    pub vendor_tax_id: Option<Wrapped<Text>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerSection {
    pub customer_name: Option<Wrapped<String>>,
    pub customer_address: Option<Wrapped<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentSection {
    pub due_date: Option<Wrapped<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SummarySection {
    pub sub_total: Option<Wrapped<f64>>,
    pub total_tax: Option<Wrapped<f64>>,
    pub invoice_total: Option<Wrapped<f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LineItemsSection {
    pub items: Option<Wrapped<Vec<RawLineItem>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawLineItem {
    pub description: Option<Wrapped<String>>,
    pub quantity: Option<Wrapped<f64>>,
    pub unit_price: Option<Wrapped<f64>>,
    pub total_price: Option<Wrapped<f64>>,
    /// The general ledger account the item was booked to.
    #[serde(rename = "Sachkonto")]
    pub ledger_account: Option<Wrapped<Text>>,
}

/// The flat fields pulled out of a [RawInvoiceRecord].
///
/// Defaults have already been applied and money amounts are non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedInvoice {
    pub source_id: String,
    pub description: String,
    pub vendor_name: Option<String>,
    pub vendor_address: String,
    pub vendor_tax_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_address: String,
    pub invoice_id: Option<String>,
    pub invoice_date: Option<String>,
    pub due_date: Option<String>,
    pub subtotal: f64,
    pub total_tax: f64,
    pub invoice_total: f64,
    pub line_items: Vec<ExtractedLineItem>,
}

/// A line item that had a description, quantity and unit price.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedLineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
    pub category: Option<String>,
}

impl RawInvoiceRecord {
    /// Pull the flat invoice fields out of the nested export structure.
    ///
    /// This never fails: missing fields are replaced with their defaults and
    /// it is up to the caller to decide whether the result is usable.
    pub fn extract(&self) -> ExtractedInvoice {
        let llm_data = self
            .extracted_data
            .as_ref()
            .and_then(|data| data.llm_data.as_ref());
        let invoice = llm_data.and_then(|data| section(&data.invoice));
        let vendor = llm_data.and_then(|data| section(&data.vendor));
        let customer = llm_data.and_then(|data| section(&data.customer));
        let payment = llm_data.and_then(|data| section(&data.payment));
        let summary = llm_data.and_then(|data| section(&data.summary));
        let items = llm_data
            .and_then(|data| section(&data.line_items))
            .and_then(|line_items| section(&line_items.items));

        let amount = |field: Option<&Wrapped<f64>>| extract_value(field, 0.0).abs();

        ExtractedInvoice {
            source_id: self.id.clone(),
            description: self.name.clone().unwrap_or_default(),
            vendor_name: extract_optional(vendor.and_then(|v| v.vendor_name.as_ref())),
            vendor_address: extract_value(
                vendor.and_then(|v| v.vendor_address.as_ref()),
                String::new(),
            ),
            vendor_tax_id: extract_optional(vendor.and_then(|v| v.vendor_tax_id.as_ref()))
                .map(String::from),
            customer_name: extract_optional(customer.and_then(|c| c.customer_name.as_ref())),
            customer_address: extract_value(
                customer.and_then(|c| c.customer_address.as_ref()),
                String::new(),
            ),
            invoice_id: extract_optional(invoice.and_then(|i| i.invoice_id.as_ref()))
                .map(String::from),
            invoice_date: extract_optional(invoice.and_then(|i| i.invoice_date.as_ref())),
            due_date: extract_optional(payment.and_then(|p| p.due_date.as_ref())),
            subtotal: amount(summary.and_then(|s| s.sub_total.as_ref())),
            total_tax: amount(summary.and_then(|s| s.total_tax.as_ref())),
            invoice_total: amount(summary.and_then(|s| s.invoice_total.as_ref())),
            line_items: items
                .map(|items| items.iter().filter_map(RawLineItem::extract).collect())
                .unwrap_or_default(),
        }
    }
}

impl RawLineItem {
    /// Extract the line item, or `None` if it lacks a description, quantity or
    /// unit price. A zero quantity or unit price counts as missing here.
    fn extract(&self) -> Option<ExtractedLineItem> {
        let description = extract_optional(self.description.as_ref())?;
        let quantity = extract_optional(self.quantity.as_ref()).filter(|q| *q != 0.0)?;
        let unit_price = extract_optional(self.unit_price.as_ref()).filter(|p| *p != 0.0)?;

        Some(ExtractedLineItem {
            description,
            quantity: quantity.abs(),
            unit_price: unit_price.abs(),
            amount: extract_value(self.total_price.as_ref(), 0.0).abs(),
            category: extract_optional(self.ledger_account.as_ref()).map(String::from),
        })
    }
}

#[cfg(test)]
mod extract_value_tests {
    use super::{Wrapped, extract_optional, extract_value};

    #[test]
    fn zero_is_not_empty() {
        assert_eq!(extract_value(Some(&Wrapped::new(0.0)), 99.0), 0.0);
    }

    #[test]
    fn empty_string_gives_default() {
        let field = Wrapped::new(String::new());

        assert_eq!(extract_value(Some(&field), "x".to_owned()), "x");
    }

    #[test]
    fn missing_field_gives_default() {
        let field: Option<&Wrapped<String>> = None;

        assert_eq!(extract_value(field, "x".to_owned()), "x");
    }

    #[test]
    fn null_value_gives_default() {
        let field: Wrapped<String> = serde_json::from_str(r#"{"value": null}"#).unwrap();

        assert_eq!(extract_value(Some(&field), "x".to_owned()), "x");
    }

    #[test]
    fn present_value_is_returned() {
        let field = Wrapped::new("ACME".to_owned());

        assert_eq!(extract_value(Some(&field), "x".to_owned()), "ACME");
        assert_eq!(extract_optional(Some(&field)), Some("ACME".to_owned()));
    }

    #[test]
    fn whitespace_is_not_empty() {
        let field = Wrapped::new(" ".to_owned());

        assert_eq!(extract_value(Some(&field), "x".to_owned()), " ");
    }
}
