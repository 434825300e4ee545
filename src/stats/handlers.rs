//! Route handlers for the aggregation queries.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::Response,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Environment, db::with_connection, json_response, stats, timezone::local_today,
};

/// The number of months the invoice trend covers unless asked otherwise.
const DEFAULT_TREND_MONTHS: u32 = 12;
/// The number of months the cash outflow covers unless asked otherwise.
const DEFAULT_OUTFLOW_MONTHS: u32 = 6;
const TOP_VENDOR_COUNT: usize = 10;

/// The state needed for the statistics endpoints.
#[derive(Debug, Clone)]
pub struct StatsState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub environment: Environment,
    /// The canonical timezone "today" is taken in for the time series.
    pub local_timezone: String,
}

impl FromRef<AppState> for StatsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            environment: state.environment,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string for the time series endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct MonthsQuery {
    pub months: Option<String>,
}

impl MonthsQuery {
    /// The requested number of months, or `default` when it is missing, zero
    /// or not a number.
    fn months_or(&self, default: u32) -> u32 {
        self.months
            .as_deref()
            .and_then(|months| months.trim().parse::<u32>().ok())
            .filter(|&months| months > 0)
            .unwrap_or(default)
    }
}

pub async fn get_stats_endpoint(State(state): State<StatsState>) -> Response {
    tracing::info!("Fetching overview statistics");
    let result = with_connection(&state.db_connection, stats::get_overview_stats);

    json_response(result, "Failed to fetch statistics", state.environment)
}

pub async fn get_invoice_trends_endpoint(
    State(state): State<StatsState>,
    Query(query): Query<MonthsQuery>,
) -> Response {
    let months = query.months_or(DEFAULT_TREND_MONTHS);
    tracing::info!("Fetching invoice trends for the last {months} months");

    let result = local_today(&state.local_timezone).and_then(|today| {
        with_connection(&state.db_connection, |connection| {
            stats::get_invoice_trends(stats::months_back(today, months), connection)
        })
    });

    json_response(result, "Failed to fetch invoice trends", state.environment)
}

pub async fn get_category_spend_endpoint(State(state): State<StatsState>) -> Response {
    tracing::info!("Fetching category spend");
    let result = with_connection(&state.db_connection, stats::get_category_spend);

    json_response(result, "Failed to fetch category spend", state.environment)
}

pub async fn get_top_vendors_endpoint(State(state): State<StatsState>) -> Response {
    tracing::info!("Fetching top {TOP_VENDOR_COUNT} vendors");
    let result = with_connection(&state.db_connection, |connection| {
        stats::get_top_vendors(TOP_VENDOR_COUNT, connection)
    });

    json_response(result, "Failed to fetch top vendors", state.environment)
}

pub async fn get_cash_outflow_endpoint(
    State(state): State<StatsState>,
    Query(query): Query<MonthsQuery>,
) -> Response {
    let months = query.months_or(DEFAULT_OUTFLOW_MONTHS);
    tracing::info!("Fetching cash outflow for the last {months} months");

    let result = local_today(&state.local_timezone).and_then(|today| {
        with_connection(&state.db_connection, |connection| {
            stats::get_cash_outflow(stats::months_back(today, months), connection)
        })
    });

    json_response(result, "Failed to fetch cash outflow", state.environment)
}
