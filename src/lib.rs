//! Anxiety programme reports: lays out progress, mood and NHS-transition
//! data as paginated documents and serves them as PDF downloads.

pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod layout;
pub mod models;
pub mod pdf;
pub mod report;
pub mod routes;
pub mod store;
pub mod summary;
pub mod tree;
pub mod value;
