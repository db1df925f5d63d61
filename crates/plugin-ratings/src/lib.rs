//! Rating enrichment plugin for BookHub.
//!
//! Fills missing ratings on the `book.data.modify` pipeline and serves the
//! `rating` datum on the `book.data.get` chain, both from settings-backed
//! per-ISBN overrides.

pub mod hooks;
pub mod plugin;

pub use plugin::{ENTRY, RatingsPlugin, create};
