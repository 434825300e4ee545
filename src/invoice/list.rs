//! The paginated invoice listing endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::Response,
};
use rusqlite::{Connection, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Environment, Error,
    database_id::{DatabaseId, VendorId},
    db::{contains_pattern, with_connection},
    invoice::{Invoice, InvoiceStatus, core::invoice_columns, core::map_invoice_row_with_offset},
    json_response,
    pagination::{Pagination, PaginationConfig},
};

/// The state needed for the invoice endpoints.
#[derive(Debug, Clone)]
pub struct InvoicesState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub environment: Environment,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for InvoicesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            environment: state.environment,
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query string accepted by the invoice listing.
///
/// Empty values are treated the same as missing ones.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicesQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub vendor_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// The invoice fields the listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    IssueDate,
    DueDate,
    TotalAmount,
    InvoiceNumber,
    Status,
}

impl SortField {
    /// Parse the `sortBy` query value. Unknown fields sort by issue date.
    pub fn from_query(sort_by: Option<&str>) -> Self {
        match sort_by {
            Some("dueDate") => SortField::DueDate,
            Some("totalAmount") => SortField::TotalAmount,
            Some("invoiceNumber") => SortField::InvoiceNumber,
            Some("status") => SortField::Status,
            _ => SortField::IssueDate,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            SortField::IssueDate => "issue_date",
            SortField::DueDate => "due_date",
            SortField::TotalAmount => "total_amount",
            SortField::InvoiceNumber => "invoice_number",
            SortField::Status => "status",
        }
    }
}

/// The order to sort invoices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Parse the `sortOrder` query value. Anything other than "asc" is descending.
    pub fn from_query(sort_order: Option<&str>) -> Self {
        match sort_order {
            Some(order) if order.eq_ignore_ascii_case("asc") => SortOrder::Ascending,
            _ => SortOrder::Descending,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Restricts which invoices are listed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceFilter {
    /// Matches the invoice number, description or vendor name, ignoring ASCII case.
    pub search: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub vendor_id: Option<VendorId>,
}

impl InvoicesQuery {
    /// The requested page and page size after applying `config`.
    ///
    /// Values that are not whole numbers fall back to the defaults.
    pub fn page_and_limit(&self, config: &PaginationConfig) -> (u64, u64) {
        let number = |value: &Option<String>| {
            value
                .as_deref()
                .and_then(|value| value.trim().parse::<u64>().ok())
        };

        config.resolve(number(&self.page), number(&self.limit))
    }

    /// Validate the filter parameters.
    ///
    /// # Errors
    /// Returns [Error::InvalidQuery] for an unknown status or a vendor ID that
    /// is not an integer.
    pub fn filter(&self) -> Result<InvoiceFilter, Error> {
        let non_empty = |value: &Option<String>| value.clone().filter(|value| !value.is_empty());

        let status = non_empty(&self.status)
            .map(|status| status.parse::<InvoiceStatus>())
            .transpose()
            .map_err(Error::InvalidQuery)?;

        let vendor_id = non_empty(&self.vendor_id)
            .map(|vendor_id| {
                vendor_id
                    .parse::<VendorId>()
                    .map_err(|_| Error::InvalidQuery(format!("invalid vendor ID \"{vendor_id}\"")))
            })
            .transpose()?;

        Ok(InvoiceFilter {
            search: non_empty(&self.search),
            status,
            vendor_id,
        })
    }
}

/// The ID and name of a vendor or customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartySummary {
    pub id: DatabaseId,
    pub name: String,
}

/// An invoice with a summary of the vendor, customer and related rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListItem {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub vendor: PartySummary,
    pub customer: Option<PartySummary>,
    pub line_item_count: u32,
    pub payment_count: u32,
}

/// One page of invoices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoicePage {
    pub data: Vec<InvoiceListItem>,
    pub pagination: Pagination,
}

/// List invoices a page at a time.
pub async fn get_invoices_endpoint(
    State(state): State<InvoicesState>,
    Query(query): Query<InvoicesQuery>,
) -> Response {
    let (page, limit) = query.page_and_limit(&state.pagination_config);
    tracing::info!("Fetching invoices (page: {page}, limit: {limit})");

    let sort_field = SortField::from_query(query.sort_by.as_deref());
    let sort_order = SortOrder::from_query(query.sort_order.as_deref());

    let result = query.filter().and_then(|filter| {
        with_connection(&state.db_connection, |connection| {
            list_invoices(&filter, sort_field, sort_order, page, limit, connection)
        })
    });

    json_response(result, "Failed to fetch invoices", state.environment)
}

/// Get one page of the invoices that match `filter`.
///
/// Invoices with equal sort values are ordered by ID in the same direction,
/// so paging is stable.
pub fn list_invoices(
    filter: &InvoiceFilter,
    sort_field: SortField,
    sort_order: SortOrder,
    page: u64,
    limit: u64,
    connection: &Connection,
) -> Result<InvoicePage, Error> {
    let mut conditions = Vec::new();
    let mut params = Vec::new();

    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        conditions.push(
            "(i.invoice_number LIKE ? ESCAPE '\\' OR i.description LIKE ? ESCAPE '\\' \
             OR v.name LIKE ? ESCAPE '\\')",
        );
        params.extend(std::iter::repeat_n(Value::Text(pattern), 3));
    }

    if let Some(status) = filter.status {
        conditions.push("i.status = ?");
        params.push(Value::Text(status.as_str().to_owned()));
    }

    if let Some(vendor_id) = filter.vendor_id {
        conditions.push("i.vendor_id = ?");
        params.push(Value::Integer(vendor_id));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let total_count: i64 = connection.query_row(
        &format!(
            "SELECT COUNT(*) FROM invoice i JOIN vendor v ON v.id = i.vendor_id {where_clause}"
        ),
        params_from_iter(params.iter()),
        |row| row.get(0),
    )?;

    let pagination = Pagination::new(page, limit, u64::try_from(total_count).unwrap_or_default());

    let query = format!(
        "SELECT {columns}, v.id, v.name, c.id, c.name,
            (SELECT COUNT(*) FROM line_item li WHERE li.invoice_id = i.id),
            (SELECT COUNT(*) FROM payment p WHERE p.invoice_id = i.id)
         FROM invoice i
         JOIN vendor v ON v.id = i.vendor_id
         LEFT JOIN customer c ON c.id = i.customer_id
         {where_clause}
         ORDER BY i.{sort_column} {direction}, i.id {direction}
         LIMIT ? OFFSET ?",
        columns = invoice_columns("i"),
        sort_column = sort_field.column(),
        direction = sort_order.keyword(),
    );

    params.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
    params.push(Value::Integer(
        i64::try_from(pagination.offset()).unwrap_or(i64::MAX),
    ));

    let data = connection
        .prepare(&query)?
        .query_map(params_from_iter(params.iter()), |row| {
            let customer_id: Option<DatabaseId> = row.get(16)?;
            let customer_name: Option<String> = row.get(17)?;

            Ok(InvoiceListItem {
                invoice: map_invoice_row_with_offset(row, 0)?,
                vendor: PartySummary {
                    id: row.get(14)?,
                    name: row.get(15)?,
                },
                customer: customer_id
                    .zip(customer_name)
                    .map(|(id, name)| PartySummary { id, name }),
                line_item_count: row.get(18)?,
                payment_count: row.get(19)?,
            })
        })?
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

    Ok(InvoicePage { data, pagination })
}
