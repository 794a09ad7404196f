//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes the aggregated [`crate::models::Article`] list as a JSON array
//!
//! # Output Structure
//!
//! ```text
//! data/
//! └── articles.json   # overwritten on every run
//! ```

pub mod json;
