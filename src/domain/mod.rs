//! Domain types for the media catalogue.
//!
//! This module contains the core data structures:
//! - Media: catalogue entries and their per-kind payloads
//! - Role: session roles and the actions they are allowed

pub mod media;
pub mod role;

// Re-export commonly used types
pub use media::{
    AlreadyUnavailable, AudioInfo, BookInfo, DownloadInfo, Media, MediaId, MediaKind,
    NarrationInfo, TypeTag, VideoInfo,
};
pub use role::{AccessDenied, Action, Role};
