//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/invoices/{invoice_id}', use [format_endpoint].

/// The server-rendered dashboard page.
pub const ROOT: &str = "/";
/// The liveness check.
pub const HEALTH: &str = "/health";

/// The overview figures.
pub const STATS: &str = "/api/stats";
/// Invoice counts and spend per month of issue date.
pub const INVOICE_TRENDS: &str = "/api/invoice-trends";
/// Spend per category.
pub const CATEGORY_SPEND: &str = "/api/category-spend";
/// The ten vendors with the highest spend.
pub const TOP_VENDORS: &str = "/api/vendors/top10";
/// All vendors with their invoice counts.
pub const VENDORS: &str = "/api/vendors";
/// Expected and overdue payments per month of due date.
pub const CASH_OUTFLOW: &str = "/api/cash-outflow";
/// The paginated invoice list.
pub const INVOICES: &str = "/api/invoices";
/// A single invoice with its line items and payments.
pub const INVOICE: &str = "/api/invoices/{invoice_id}";
/// Ask the text-to-SQL service a question about the data.
pub const CHAT_WITH_DATA: &str = "/api/chat-with-data";
/// Whether the text-to-SQL service is reachable.
pub const CHAT_WITH_DATA_HEALTH: &str = "/api/chat-with-data/health";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/invoices/{invoice_id}', '{invoice_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::HEALTH);
        assert_endpoint_is_valid_uri(endpoints::STATS);
        assert_endpoint_is_valid_uri(endpoints::INVOICE_TRENDS);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY_SPEND);
        assert_endpoint_is_valid_uri(endpoints::TOP_VENDORS);
        assert_endpoint_is_valid_uri(endpoints::VENDORS);
        assert_endpoint_is_valid_uri(endpoints::CASH_OUTFLOW);
        assert_endpoint_is_valid_uri(endpoints::INVOICES);
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::INVOICE, 1));
        assert_endpoint_is_valid_uri(endpoints::CHAT_WITH_DATA);
        assert_endpoint_is_valid_uri(endpoints::CHAT_WITH_DATA_HEALTH);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint(endpoints::INVOICE, 42);

        assert_eq!(formatted_path, "/api/invoices/42");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
    }
}
