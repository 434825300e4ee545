//! Forwards natural language questions to the external text-to-SQL service.

use std::time::Duration;

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{AppState, Environment, Error, ErrorBody, timezone::utc_timestamp};

const GENERATE_SQL_TIMEOUT: Duration = Duration::from_secs(30);
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// A client for the text-to-SQL service.
#[derive(Debug, Clone)]
pub struct TextToSqlClient {
    base_url: String,
    http: reqwest::Client,
}

/// What the text-to-SQL service sends back for a question.
#[derive(Debug, Deserialize)]
struct GeneratedSql {
    #[serde(default)]
    sql: Value,
    #[serde(default)]
    results: Value,
    error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum ProxyError {
    #[error("could not connect to the text-to-SQL service: {0}")]
    Unavailable(reqwest::Error),

    #[error("the text-to-SQL service responded with {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("{0}")]
    Request(reqwest::Error),
}

impl From<reqwest::Error> for ProxyError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() && !error.is_timeout() {
            ProxyError::Unavailable(error)
        } else {
            ProxyError::Request(error)
        }
    }
}

impl TextToSqlClient {
    /// Create a client for the service at `base_url`, e.g. "http://localhost:8000".
    ///
    /// # Errors
    /// Returns [Error::HttpClientError] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|error| Error::HttpClientError(error.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http,
        })
    }

    async fn generate_sql(&self, question: &str) -> Result<GeneratedSql, ProxyError> {
        let response = self
            .http
            .post(format!("{}/generate-sql", self.base_url))
            .json(&json!({ "question": question }))
            .timeout(GENERATE_SQL_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("message")?.as_str().map(str::to_owned))
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

            return Err(ProxyError::Upstream {
                status: StatusCode::from_u16(status.as_u16())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message,
            });
        }

        Ok(response.json().await?)
    }

    async fn health(&self) -> Result<Value, reqwest::Error> {
        self.http
            .get(format!("{}/health", self.base_url))
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

/// The state needed for the chat endpoints.
#[derive(Debug, Clone)]
pub struct ChatState {
    pub text_to_sql: TextToSqlClient,
    pub environment: Environment,
}

impl FromRef<AppState> for ChatState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            text_to_sql: state.text_to_sql.clone(),
            environment: state.environment,
        }
    }
}

/// The body of a chat request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: Option<String>,
}

/// A question with the SQL generated for it and the rows it returned.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub question: String,
    pub sql: Value,
    pub results: Value,
    pub row_count: usize,
    pub timestamp: String,
}

/// Ask the text-to-SQL service a question and return its SQL and results.
pub async fn chat_with_data_endpoint(
    State(state): State<ChatState>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let question = match request {
        Ok(Json(ChatRequest {
            question: Some(question),
        })) if !question.is_empty() => question,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new(
                    "Invalid request",
                    Some("Question is required and must be a string".to_owned()),
                )),
            )
                .into_response();
        }
    };

    tracing::info!("Processing chat query: \"{question}\"");

    match state.text_to_sql.generate_sql(&question).await {
        Ok(GeneratedSql {
            error: Some(error), ..
        }) if !error.is_empty() => {
            tracing::error!("Text-to-SQL service returned an error: {error}");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("Query processing failed", Some(error))),
            )
                .into_response()
        }
        Ok(GeneratedSql { sql, results, .. }) => {
            let row_count = results.as_array().map_or(0, Vec::len);
            tracing::info!("Query processed successfully, returned {row_count} rows");

            Json(ChatResponse {
                question,
                sql,
                results,
                row_count,
                timestamp: utc_timestamp(),
            })
            .into_response()
        }
        Err(error) => proxy_error_response(error, state.environment),
    }
}

fn proxy_error_response(error: ProxyError, environment: Environment) -> Response {
    tracing::error!("Error processing chat query: {error}");

    match error {
        ProxyError::Unavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorBody::new(
                "Text-to-SQL service unavailable",
                Some(
                    "Unable to connect to the text-to-SQL service. Please ensure it is running."
                        .to_owned(),
                ),
            )),
        )
            .into_response(),
        ProxyError::Upstream { status, message } => (
            status,
            Json(ErrorBody::new("Text-to-SQL service error", Some(message))),
        )
            .into_response(),
        ProxyError::Request(error) => {
            let message = match environment {
                Environment::Production => None,
                Environment::Development => Some(error.to_string()),
            };

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to process chat query", message)),
            )
                .into_response()
        }
    }
}

/// Report whether the text-to-SQL service is reachable.
pub async fn chat_health_endpoint(State(state): State<ChatState>) -> Response {
    match state.text_to_sql.health().await {
        Ok(status) => Json(json!({ "service": "connected", "status": status })).into_response(),
        Err(error) => {
            tracing::warn!("Text-to-SQL service health check failed: {error}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "service": "disconnected", "error": error.to_string() })),
            )
                .into_response()
        }
    }
}
