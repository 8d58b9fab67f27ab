//! Media catalogue and its flat-file persistence.
//!
//! # Storage Layout
//!
//! ```text
//! ~/.librasys/
//! └── catalogue.txt     # One `;`-delimited record per media item
//! ```

pub mod catalogue;
pub mod record;
pub mod seed;
pub mod store;

pub use catalogue::{Catalogue, CatalogueError, Statistics};
pub use record::{decode_catalogue, encode_catalogue, FormatError, SkipReason, SkippedLine};
pub use store::{CatalogueFile, LoadReport, StoreError};
