//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    dashboard::{
        cards::overview_cards_view,
        tables::{
            cash_outflow_table, category_spend_table, monthly_trend_table,
            recent_invoices_table, top_vendors_table,
        },
    },
    db::with_connection,
    html::{PAGE_CONTAINER_STYLE, base},
    invoice::{InvoiceFilter, InvoiceListItem, SortField, SortOrder, list_invoices},
    stats::{
        CashOutflow, CategorySpend, MonthlyTrend, OverviewStats, VendorSpend, get_cash_outflow,
        get_category_spend, get_invoice_trends, get_overview_stats, get_top_vendors, months_back,
    },
    timezone::local_today,
};

const TREND_MONTHS: u32 = 12;
const OUTFLOW_MONTHS: u32 = 6;
const TOP_VENDOR_COUNT: usize = 10;
const RECENT_INVOICE_COUNT: u64 = 10;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading invoices.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Berlin".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    overview: OverviewStats,
    trends: Vec<MonthlyTrend>,
    categories: Vec<CategorySpend>,
    top_vendors: Vec<VendorSpend>,
    cash_outflow: Vec<CashOutflow>,
    recent_invoices: Vec<InvoiceListItem>,
}

/// Display a page with an overview of the invoice data.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let data = with_connection(&state.db_connection, |connection| {
        build_dashboard_data(today, connection)
    })?;

    match data {
        Some(data) => Ok(dashboard_view(&data).into_response()),
        None => Ok(dashboard_no_data_view().into_response()),
    }
}

/// Run every dashboard query, or return `None` when there are no invoices.
fn build_dashboard_data(
    today: Date,
    connection: &Connection,
) -> Result<Option<DashboardData>, Error> {
    let overview = get_overview_stats(connection)?;

    if overview.total_invoices == 0 {
        return Ok(None);
    }

    let recent_invoices = list_invoices(
        &InvoiceFilter::default(),
        SortField::IssueDate,
        SortOrder::Descending,
        1,
        RECENT_INVOICE_COUNT,
        connection,
    )?
    .data;

    Ok(Some(DashboardData {
        overview,
        trends: get_invoice_trends(months_back(today, TREND_MONTHS), connection)?,
        categories: get_category_spend(connection)?,
        top_vendors: get_top_vendors(TOP_VENDOR_COUNT, connection)?,
        cash_outflow: get_cash_outflow(months_back(today, OUTFLOW_MONTHS), connection)?,
        recent_invoices,
    }))
}

fn dashboard_no_data_view() -> Markup {
    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "The dashboard will show up here once invoices have been loaded.
                Run the " code { "seed" } " binary with an exported invoice file to load them."
            }
        }
    );

    base("Dashboard", &content)
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let content = html!(
        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            h2 class="text-2xl font-bold mb-6 self-start" { "Invoice Insights" }

            (overview_cards_view(&data.overview))

            section id="tables" class="w-full mx-auto mb-4"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    (monthly_trend_table(&data.trends))
                    (category_spend_table(&data.categories))
                    (top_vendors_table(&data.top_vendors))
                    (cash_outflow_table(&data.cash_outflow))
                }
            }

            section class="w-full mx-auto mb-8"
            {
                (recent_invoices_table(&data.recent_invoices))
            }
        }
    );

    base("Dashboard", &content)
}
