//! Open Library scraping source plugin for BookHub.
//!
//! Serves the `scrape.fetch.custom` chain from the Open Library REST API
//! and normalizes drafts on the `scrape.parse` pipeline.

pub mod client;
pub mod hooks;
pub mod models;
pub mod plugin;

pub use plugin::{ENTRY, OpenLibraryPlugin, create};
