//! librasys - media library catalogue
//!
//! Tracks books, videos, audio recordings, ebooks and audiobooks, with
//! borrow/return state, title search and statistics. The catalogue is kept in
//! memory for a session and persisted to a flat `;`-delimited text file.
//!
//! # Modules
//!
//! - `domain`: Data structures (Media, TypeTag, Role)
//! - `library`: Catalogue operations and the record format
//! - `config`: Path and role resolution
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Write the demo catalogue
//! librasys --role admin init
//!
//! # Browse and borrow
//! librasys list
//! librasys search Code
//! librasys borrow 4
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod library;

// Re-export main types at crate root for convenience
pub use domain::{Action, Media, MediaId, MediaKind, Role, TypeTag};
pub use library::{Catalogue, CatalogueError, CatalogueFile, Statistics};
