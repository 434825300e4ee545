//! Invoice Insights is a small business-intelligence service for invoice and
//! vendor spend data.
//!
//! The library provides:
//! - a load pass that turns an exported JSON file of extracted invoices into
//!   vendors, customers, invoices and line items in a SQLite database,
//! - aggregation queries over the stored invoices (totals, monthly trends,
//!   category breakdown, top vendors and cash outflow),
//! - a JSON REST API and a server-rendered dashboard page over those queries,
//! - a proxy to an external text-to-SQL service for asking questions of the data.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod address;
mod app_state;
mod category;
mod chat;
mod customer;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod html;
mod invoice;
mod load;
mod logging;
mod money;
mod pagination;
mod raw_record;
mod routing;
mod stats;
mod timezone;
mod vendor;

pub use address::{PostalAddress, split_address};
pub use app_state::{AppState, Environment};
pub use category::{SpendCategory, classify_category};
pub use database_id::{CustomerId, DatabaseId, InvoiceId, VendorId};
pub use db::{clear_all_tables, initialize as initialize_db};
pub use invoice::{Invoice, InvoiceStatus};
pub use load::{LoadOptions, LoadSummary, SkipReason, load_from_path, load_records, parse_date};
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use stats::{
    CashOutflow, CategorySpend, MonthlyTrend, OverviewStats, VendorSpend, get_cash_outflow,
    get_category_spend, get_invoice_trends, get_overview_stats, get_top_vendors, months_back,
};
pub use timezone::local_today;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The vendor ID used to create an invoice did not match a stored vendor.
    #[error("the vendor ID {0} does not refer to a valid vendor")]
    InvalidVendor(i64),

    /// The customer ID used to create an invoice did not match a stored customer.
    #[error("the customer ID {0} does not refer to a valid customer")]
    InvalidCustomer(i64),

    /// A query string parameter had a value the endpoint does not accept.
    #[error("{0}")]
    InvalidQuery(String),

    /// The input file for a load could not be read.
    #[error("could not read the input file \"{path}\": {reason}")]
    ReadInput {
        /// The path that was being read.
        path: String,
        /// Why reading failed.
        reason: String,
    },

    /// The input file for a load was not a JSON array.
    #[error("the input file is not a JSON array of records: {0}")]
    InvalidInput(String),

    /// The HTTP client for the text-to-SQL service could not be built.
    #[error("could not create HTTP client: {0}")]
    HttpClientError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to clients when a request fails.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn new(error: &str, message: Option<String>) -> Self {
        Self {
            error: error.to_owned(),
            message,
        }
    }
}

impl Error {
    /// Render the error as a JSON response.
    ///
    /// Unexpected errors are reported as `failure`, e.g. "Failed to fetch
    /// statistics", and only include their message outside of production.
    pub(crate) fn into_json_response(self, failure: &str, environment: Environment) -> Response {
        match self {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody::new("Not found", None)),
            )
                .into_response(),
            Error::InvalidQuery(message) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("Invalid request", Some(message))),
            )
                .into_response(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                let message = match environment {
                    Environment::Production => None,
                    Environment::Development => Some(error.to_string()),
                };

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(failure, message)),
                )
                    .into_response()
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_json_response("Internal server error", Environment::Production)
    }
}

/// Serialize `result` as the JSON body of a response, or render the error.
pub(crate) fn json_response<T: Serialize>(
    result: Result<T, Error>,
    failure: &str,
    environment: Environment,
) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(error) => error.into_json_response(failure, environment),
    }
}
