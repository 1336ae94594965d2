//! `backoffice-catalog` — publishable catalog entries.
//!
//! Assets and services share one record shape; the two collections differ
//! only in which store they live in and which roles may touch them.

pub mod entry;

pub use entry::{CatalogEntry, EntryPatch, NewEntry};
