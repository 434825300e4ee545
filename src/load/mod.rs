//! Turning an exported JSON file of extracted invoices into stored rows.

mod name_index;
mod pass;
mod record;

pub use pass::{LoadOptions, LoadSummary, load_from_path, load_records};
pub use record::{SkipReason, parse_date};
