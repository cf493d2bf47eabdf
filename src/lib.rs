//! Scraping and registration core for the Mensa IDF activity agenda.
//!
//! The site serves loosely-structured, encoding-irregular HTML; this crate
//! turns its agenda, activity-detail and my-events pages into [`Activity`]
//! records and interprets registration-action responses. A thin blocking
//! [`Client`] handles the authenticated fetches; the extractors themselves
//! never perform I/O.

mod client;
mod error;
mod models;
pub mod scraping;

pub use client::{current_month_year, Client, Session};
pub use error::ScrapeError;
pub use models::{Activity, RegState, NO_DESCRIPTION, UNKNOWN, UNLIMITED};
