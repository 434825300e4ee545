//! Summary cards for the headline figures.

use maud::{Markup, html};

use crate::{html::format_currency, stats::OverviewStats};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md flex flex-col justify-between";

/// Renders the row of overview cards.
pub(super) fn overview_cards_view(stats: &OverviewStats) -> Markup {
    html! {
        section id="overview" class="w-full mx-auto mb-8" {
            div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4" {
                (card("Total Spend", &format_currency(stats.total_spend), None))
                (card(
                    "Total Invoices",
                    &stats.total_invoices.to_string(),
                    Some(&status_breakdown(stats)),
                ))
                (card("Vendors", &stats.unique_vendors.to_string(), None))
                (card("Average Invoice", &format_currency(stats.avg_invoice_value), None))
            }
        }
    }
}

fn status_breakdown(stats: &OverviewStats) -> String {
    format!(
        "{} pending, {} paid, {} overdue",
        stats.pending_invoices, stats.paid_invoices, stats.overdue_invoices
    )
}

fn card(label: &str, value: &str, detail: Option<&str>) -> Markup {
    html! {
        div class=(CARD_STYLE) aria-label=(format!("{label}: {value}")) {
            h4 class="text-sm font-medium text-gray-600 dark:text-gray-400" { (label) }
            p class="card-value text-2xl font-bold mt-2" { (value) }
            @if let Some(detail) = detail {
                p class="text-xs text-gray-500 dark:text-gray-400 mt-1" { (detail) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::stats::OverviewStats;

    use super::overview_cards_view;

    #[test]
    fn shows_four_cards_with_counts() {
        let stats = OverviewStats {
            total_invoices: 3,
            total_spend: 0.0,
            unique_vendors: 2,
            avg_invoice_value: 0.0,
            pending_invoices: 1,
            paid_invoices: 0,
            overdue_invoices: 2,
        };

        let html = Html::parse_fragment(&overview_cards_view(&stats).into_string());

        let values = Selector::parse(".card-value").unwrap();
        let values: Vec<_> = html.select(&values).map(|value| value.inner_html()).collect();
        assert_eq!(values, ["$0.00", "3", "2", "$0.00"]);
        assert!(html.html().contains("1 pending, 0 paid, 2 overdue"));
    }
}
