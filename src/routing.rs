//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState, ErrorBody,
    chat::{chat_health_endpoint, chat_with_data_endpoint},
    dashboard::get_dashboard_page,
    endpoints,
    invoice::{get_invoice_endpoint, get_invoices_endpoint},
    logging_middleware,
    stats::{
        get_cash_outflow_endpoint, get_category_spend_endpoint, get_invoice_trends_endpoint,
        get_stats_endpoint, get_top_vendors_endpoint,
    },
    timezone::utc_timestamp,
    vendor::get_vendors_endpoint,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(endpoints::STATS, get(get_stats_endpoint))
        .route(endpoints::INVOICE_TRENDS, get(get_invoice_trends_endpoint))
        .route(endpoints::CATEGORY_SPEND, get(get_category_spend_endpoint))
        .route(endpoints::TOP_VENDORS, get(get_top_vendors_endpoint))
        .route(endpoints::VENDORS, get(get_vendors_endpoint))
        .route(endpoints::CASH_OUTFLOW, get(get_cash_outflow_endpoint))
        .route(endpoints::INVOICES, get(get_invoices_endpoint))
        .route(endpoints::INVOICE, get(get_invoice_endpoint))
        .route(endpoints::CHAT_WITH_DATA, post(chat_with_data_endpoint))
        .route(endpoints::CHAT_WITH_DATA_HEALTH, get(chat_health_endpoint));

    Router::new()
        .route(endpoints::ROOT, get(get_dashboard_page))
        .route(endpoints::HEALTH, get(get_health))
        .merge(api_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// Report that the server is up.
async fn get_health() -> Response {
    Json(json!({ "status": "ok", "timestamp": utc_timestamp() })).into_response()
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new("Route not found", None)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::Value;

    use crate::{AppState, Environment, endpoints};

    use super::build_router;

    fn test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "Etc/UTC",
            Environment::Development,
            "http://127.0.0.1:9",
        )
        .unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let server = test_server();

        let response = server.get(endpoints::HEALTH).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let server = test_server();

        let response = server.get("/api/does-not-exist").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "Route not found");
    }

    #[tokio::test]
    async fn api_routes_are_mounted() {
        let server = test_server();

        for path in [
            endpoints::STATS,
            endpoints::INVOICE_TRENDS,
            endpoints::CATEGORY_SPEND,
            endpoints::TOP_VENDORS,
            endpoints::VENDORS,
            endpoints::CASH_OUTFLOW,
            endpoints::INVOICES,
        ] {
            server.get(path).await.assert_status_ok();
        }
        server.get("/api/invoices/1").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn dashboard_is_served_at_root() {
        let server = test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_ok();
        assert!(response.text().contains("Invoice Insights"));
    }
}
