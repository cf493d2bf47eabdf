pub mod agenda;
pub mod base;
pub mod detail;
pub mod my_events;
