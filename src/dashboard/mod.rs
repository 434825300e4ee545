//! The server-rendered dashboard page.

mod cards;
mod handlers;
mod tables;

pub use handlers::get_dashboard_page;
