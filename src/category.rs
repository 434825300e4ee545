//! Spend categories and the keyword classifier that assigns them.

use std::{fmt, str::FromStr};

use rand::Rng;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// The fixed set of categories an invoice's spend can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpendCategory {
    /// Software, services, equipment and other running costs.
    Operations,
    /// Advertising, campaigns and branding.
    Marketing,
    /// Rent, utilities and building upkeep.
    Facilities,
}

impl SpendCategory {
    /// Every category, in the order used for the random fallback.
    pub const ALL: [SpendCategory; 3] = [
        SpendCategory::Operations,
        SpendCategory::Marketing,
        SpendCategory::Facilities,
    ];

    /// The name stored in the database and sent to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendCategory::Operations => "Operations",
            SpendCategory::Marketing => "Marketing",
            SpendCategory::Facilities => "Facilities",
        }
    }
}

impl fmt::Display for SpendCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpendCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpendCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("unknown spend category \"{s}\""))
    }
}

impl ToSql for SpendCategory {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SpendCategory {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

const MARKETING_KEYWORDS: [&str; 5] = [
    "marketing",
    "advertising",
    "campaign",
    "social media",
    "branding",
];

const FACILITIES_KEYWORDS: [&str; 6] = [
    "facility",
    "rent",
    "utilities",
    "maintenance",
    "cleaning",
    "building",
];

const FACILITIES_VENDOR_KEYWORDS: [&str; 2] = ["facility", "property"];

const OPERATIONS_KEYWORDS: [&str; 9] = [
    "software",
    "license",
    "service",
    "consulting",
    "equipment",
    "supply",
    "hardware",
    "office",
    "it",
];

/// Assign a spend category from an invoice description and vendor name.
///
/// Keywords are matched case-insensitively as substrings, checking marketing,
/// then facilities, then operations. The first matching rule wins.
///
/// When nothing matches, a category is picked uniformly at random from `rng`,
/// so results are only reproducible for a seeded `rng`.
pub fn classify_category(
    description: &str,
    vendor_name: &str,
    rng: &mut impl Rng,
) -> SpendCategory {
    let description = description.to_lowercase();
    let vendor = vendor_name.to_lowercase();
    let description_has = |keywords: &[&str]| keywords.iter().any(|k| description.contains(k));

    if description_has(&MARKETING_KEYWORDS) || vendor.contains("marketing") {
        return SpendCategory::Marketing;
    }

    if description_has(&FACILITIES_KEYWORDS)
        || FACILITIES_VENDOR_KEYWORDS.iter().any(|k| vendor.contains(k))
    {
        return SpendCategory::Facilities;
    }

    if description_has(&OPERATIONS_KEYWORDS) {
        return SpendCategory::Operations;
    }

    SpendCategory::ALL[rng.gen_range(0..SpendCategory::ALL.len())]
}
