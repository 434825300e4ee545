//! Aggregation queries over the stored invoices and their route handlers.
//!
//! Every money figure is a sum of invoice grand totals rounded to cents.

mod cashflow;
mod categories;
mod handlers;
mod overview;
mod range;
mod trends;
mod vendors;

pub use cashflow::{CashOutflow, get_cash_outflow};
pub use categories::{CategorySpend, get_category_spend};
pub use handlers::{
    get_cash_outflow_endpoint, get_category_spend_endpoint, get_invoice_trends_endpoint,
    get_stats_endpoint, get_top_vendors_endpoint,
};
pub use overview::{OverviewStats, get_overview_stats};
pub use range::months_back;
pub use trends::{MonthlyTrend, get_invoice_trends};
pub use vendors::{VendorSpend, get_top_vendors};
