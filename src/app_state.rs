//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error, chat::TextToSqlClient, db::initialize, pagination::PaginationConfig,
    timezone::get_local_offset,
};

/// The deployment environment the server runs in.
///
/// Controls how much detail error responses carry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Environment {
    /// Error responses include the underlying error message.
    #[default]
    Development,
    /// Error responses only include a generic error.
    Production,
}

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The local timezone as a canonical timezone name, e.g. "Europe/Berlin".
    pub local_timezone: String,

    /// The environment the server is deployed in.
    pub environment: Environment,

    /// The config that controls how to page through invoices.
    pub pagination_config: PaginationConfig,

    /// The client for the external text-to-SQL service.
    pub text_to_sql: TextToSqlClient,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Europe/Berlin".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized, the timezone is
    /// not a known timezone or the HTTP client cannot be built.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        environment: Environment,
        text_to_sql_url: &str,
    ) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            local_timezone: local_timezone.to_owned(),
            environment,
            pagination_config: PaginationConfig::default(),
            text_to_sql: TextToSqlClient::new(text_to_sql_url)?,
        })
    }
}
