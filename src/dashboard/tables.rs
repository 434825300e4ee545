//! Table views for dashboard data display.

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BADGE_OVERDUE_STYLE, BADGE_PAID_STYLE, BADGE_PENDING_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency, link,
    },
    invoice::{InvoiceListItem, InvoiceStatus},
    stats::{CashOutflow, CategorySpend, MonthlyTrend, VendorSpend},
};

/// A titled table with a header row and one row of cells per item.
fn table_view(id: &str, title: &str, headers: &[&str], rows: Vec<Vec<Markup>>) -> Markup {
    html! {
        div id=(id) {
            h3 class="text-xl font-semibold mb-4" { (title) }

            div class="overflow-x-auto rounded-lg shadow" {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            @for header in headers {
                                th scope="col" class=(TABLE_CELL_STYLE) { (header) }
                            }
                        }
                    }
                    tbody {
                        @if rows.is_empty() {
                            tr class=(TABLE_ROW_STYLE) {
                                td class=(TABLE_CELL_STYLE) colspan=(headers.len()) { "No data" }
                            }
                        }
                        @for row in rows {
                            tr class=(TABLE_ROW_STYLE) {
                                @for cell in row {
                                    td class=(TABLE_CELL_STYLE) { (cell) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn text(value: impl ToString) -> Markup {
    html! { (value.to_string()) }
}

pub(super) fn monthly_trend_table(trends: &[MonthlyTrend]) -> Markup {
    let rows = trends
        .iter()
        .map(|trend| {
            vec![
                text(&trend.month),
                text(trend.invoice_count),
                text(format_currency(trend.total_spend)),
                text(format_currency(trend.avg_invoice_value)),
            ]
        })
        .collect();

    table_view(
        "invoice-trends",
        "Invoices per Month",
        &["Month", "Invoices", "Spend", "Average"],
        rows,
    )
}

pub(super) fn category_spend_table(categories: &[CategorySpend]) -> Markup {
    let rows = categories
        .iter()
        .map(|category| {
            vec![
                text(category.category),
                text(category.invoice_count),
                text(format_currency(category.total_spend)),
                text(format!("{:.2}%", category.percentage)),
            ]
        })
        .collect();

    table_view(
        "category-spend",
        "Spend by Category",
        &["Category", "Invoices", "Spend", "Share"],
        rows,
    )
}

pub(super) fn top_vendors_table(vendors: &[VendorSpend]) -> Markup {
    let rows = vendors
        .iter()
        .map(|vendor| {
            vec![
                text(&vendor.name),
                text(vendor.invoice_count),
                text(format_currency(vendor.total_spend)),
            ]
        })
        .collect();

    table_view(
        "top-vendors",
        "Top Vendors",
        &["Vendor", "Invoices", "Spend"],
        rows,
    )
}

pub(super) fn cash_outflow_table(outflow: &[CashOutflow]) -> Markup {
    let rows = outflow
        .iter()
        .map(|month| {
            vec![
                text(&month.month),
                text(format_currency(month.expected_outflow)),
                text(format_currency(month.overdue_amount)),
                text(format_currency(month.total_outflow)),
            ]
        })
        .collect();

    table_view(
        "cash-outflow",
        "Cash Outflow by Due Month",
        &["Month", "Expected", "Overdue", "Total"],
        rows,
    )
}

fn status_badge(status: InvoiceStatus) -> Markup {
    let style = match status {
        InvoiceStatus::Pending => BADGE_PENDING_STYLE,
        InvoiceStatus::Paid => BADGE_PAID_STYLE,
        InvoiceStatus::Overdue => BADGE_OVERDUE_STYLE,
    };

    html! { span class=(style) { (status) } }
}

pub(super) fn recent_invoices_table(invoices: &[InvoiceListItem]) -> Markup {
    let rows = invoices
        .iter()
        .map(|item| {
            let invoice = &item.invoice;
            vec![
                link(
                    &format_endpoint(endpoints::INVOICE, invoice.id),
                    &invoice.invoice_number,
                ),
                text(&item.vendor.name),
                text(invoice.issue_date),
                text(
                    invoice
                        .due_date
                        .map(|date| date.to_string())
                        .unwrap_or_else(|| "-".to_owned()),
                ),
                status_badge(invoice.status),
                text(format_currency(invoice.total_amount)),
            ]
        })
        .collect();

    table_view(
        "recent-invoices",
        "Recent Invoices",
        &["Invoice", "Vendor", "Issued", "Due", "Status", "Total"],
        rows,
    )
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::{category::SpendCategory, stats::CategorySpend};

    use super::{category_spend_table, monthly_trend_table};

    #[test]
    fn empty_table_shows_placeholder_row() {
        let html = Html::parse_fragment(&monthly_trend_table(&[]).into_string());

        let cells = Selector::parse("tbody td").unwrap();
        let cells: Vec<_> = html.select(&cells).map(|cell| cell.inner_html()).collect();
        assert_eq!(cells, ["No data"]);
    }

    #[test]
    fn renders_one_row_per_category() {
        let categories = [
            CategorySpend {
                category: SpendCategory::Marketing,
                total_spend: 75.0,
                invoice_count: 3,
                percentage: 75.0,
            },
            CategorySpend {
                category: SpendCategory::Facilities,
                total_spend: 25.0,
                invoice_count: 1,
                percentage: 25.0,
            },
        ];

        let html = Html::parse_fragment(&category_spend_table(&categories).into_string());

        let rows = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&rows).count(), 2);
        let first_cell = Selector::parse("tbody tr td").unwrap();
        assert_eq!(
            html.select(&first_cell).next().map(|cell| cell.inner_html()),
            Some("Marketing".to_owned())
        );
        assert!(html.html().contains("75.00%"));
    }
}
