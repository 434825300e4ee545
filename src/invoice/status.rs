//! The lifecycle status of an invoice and the rules for deriving it.

use std::{fmt, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

/// Where an invoice is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Not yet paid and not past its due date.
    Pending,
    /// A payment date has been recorded.
    Paid,
    /// Not paid and past its due date.
    Overdue,
}

impl InvoiceStatus {
    /// Derive the status of an invoice as of `today`.
    ///
    /// A payment date always means [InvoiceStatus::Paid]. Otherwise the invoice
    /// is [InvoiceStatus::Overdue] once `today` is after the due date, and
    /// [InvoiceStatus::Pending] before that or when there is no due date.
    ///
    /// The result depends on `today`, so the same invoice can move from pending
    /// to overdue without any change to its data.
    pub fn classify(
        _issue_date: Date,
        due_date: Option<Date>,
        payment_date: Option<Date>,
        today: Date,
    ) -> Self {
        if payment_date.is_some() {
            return InvoiceStatus::Paid;
        }

        match due_date {
            Some(due_date) if today > due_date => InvoiceStatus::Overdue,
            _ => InvoiceStatus::Pending,
        }
    }

    /// The name stored in the database and accepted in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            other => Err(format!("unknown invoice status \"{other}\"")),
        }
    }
}

impl ToSql for InvoiceStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for InvoiceStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::date};

    use super::InvoiceStatus;

    const TODAY: time::Date = date!(2025 - 06 - 15);
    const ISSUED: time::Date = date!(2025 - 05 - 01);

    #[test]
    fn no_due_date_is_pending() {
        assert_eq!(
            InvoiceStatus::classify(ISSUED, None, None, TODAY),
            InvoiceStatus::Pending
        );
    }

    #[test]
    fn past_due_date_is_overdue() {
        let due = TODAY - Duration::days(10);

        assert_eq!(
            InvoiceStatus::classify(ISSUED, Some(due), None, TODAY),
            InvoiceStatus::Overdue
        );
    }

    #[test]
    fn future_due_date_is_pending() {
        let due = TODAY + Duration::days(30);

        assert_eq!(
            InvoiceStatus::classify(ISSUED, Some(due), None, TODAY),
            InvoiceStatus::Pending
        );
    }

    #[test]
    fn due_today_is_not_yet_overdue() {
        assert_eq!(
            InvoiceStatus::classify(ISSUED, Some(TODAY), None, TODAY),
            InvoiceStatus::Pending
        );
    }

    #[test]
    fn payment_date_always_means_paid() {
        let past_due = TODAY - Duration::days(10);

        assert_eq!(
            InvoiceStatus::classify(ISSUED, Some(past_due), Some(TODAY), TODAY),
            InvoiceStatus::Paid
        );
        assert_eq!(
            InvoiceStatus::classify(ISSUED, None, Some(ISSUED), TODAY),
            InvoiceStatus::Paid
        );
    }

    #[test]
    fn status_changes_as_time_passes() {
        let due = date!(2025 - 06 - 20);

        assert_eq!(
            InvoiceStatus::classify(ISSUED, Some(due), None, TODAY),
            InvoiceStatus::Pending
        );
        assert_eq!(
            InvoiceStatus::classify(ISSUED, Some(due), None, due + Duration::days(1)),
            InvoiceStatus::Overdue
        );
    }

    #[test]
    fn round_trips_through_strings() {
        for status in [
            InvoiceStatus::Pending,
            InvoiceStatus::Paid,
            InvoiceStatus::Overdue,
        ] {
            assert_eq!(status.as_str().parse::<InvoiceStatus>(), Ok(status));
        }
    }
}
