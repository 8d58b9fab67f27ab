//! Demo inventory written by `librasys init`.

use super::catalogue::Catalogue;
use crate::domain::{AudioInfo, BookInfo, DownloadInfo, Media, MediaKind, NarrationInfo};

/// Starter catalogue covering every media kind
pub fn demo_catalogue() -> Catalogue {
    // Shipped checked out, so the demo shows both states
    let moon = Media::restore(
        3,
        "Dark Side of the Moon",
        false,
        MediaKind::Audio(AudioInfo {
            publisher: "Pink Floyd".to_string(),
            duration_minutes: 43,
        }),
    );

    vec![
        Media::book(1, "The Great Gatsby", "F. Scott Fitzgerald", 218),
        Media::video(2, "Inception", 148, "4K"),
        moon,
        Media::ebook(
            4,
            "Clean Code",
            BookInfo {
                author: "Robert C. Martin".to_string(),
                page_count: 464,
            },
            DownloadInfo {
                file_size_mb: 12.5,
                file_format: "PDF".to_string(),
            },
        ),
        Media::audiobook(
            5,
            "Becoming",
            true,
            BookInfo {
                author: "Michelle Obama".to_string(),
                page_count: 448,
            },
            NarrationInfo {
                narrator: "Michelle Obama".to_string(),
                duration_minutes: 1140,
            },
        ),
    ]
    .into()
}
