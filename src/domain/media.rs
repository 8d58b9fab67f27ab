//! Media entities tracked by the catalogue.
//!
//! Every item carries the shared `id`/`title`/`available` state exactly once,
//! plus a [`MediaKind`] payload for its variant. The composite kinds (ebooks
//! and audiobooks) embed the [`BookInfo`] payload next to their second
//! capability instead of inheriting it twice.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a media item (caller-assigned, not guaranteed unique)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(pub i64);

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MediaId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Borrow attempted on an item that is already checked out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Media {id} is already borrowed")]
pub struct AlreadyUnavailable {
    pub id: MediaId,
}

/// Discriminator of the five media kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Book,
    Video,
    Audio,
    Ebook,
    Audiobook,
}

impl TypeTag {
    /// All tags, in declaration order
    pub const ALL: [TypeTag; 5] = [
        TypeTag::Book,
        TypeTag::Video,
        TypeTag::Audio,
        TypeTag::Ebook,
        TypeTag::Audiobook,
    ];

    /// Literal variant name, as written in the first field of a record
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Book => "Book",
            TypeTag::Video => "Video",
            TypeTag::Audio => "Audio",
            TypeTag::Ebook => "Ebook",
            TypeTag::Audiobook => "Audiobook",
        }
    }

    /// Whether this kind is (or contains) a book
    pub fn is_book_like(&self) -> bool {
        matches!(self, TypeTag::Book | TypeTag::Ebook | TypeTag::Audiobook)
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = anyhow::Error;

    /// Lenient parse for user input; records use the exact literal instead.
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "book" | "livre" => Ok(TypeTag::Book),
            "video" => Ok(TypeTag::Video),
            "audio" => Ok(TypeTag::Audio),
            "ebook" | "e-book" => Ok(TypeTag::Ebook),
            "audiobook" | "audio-book" => Ok(TypeTag::Audiobook),
            _ => anyhow::bail!("Unknown media type: {}", s),
        }
    }
}

/// Printed-book details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookInfo {
    pub author: String,
    pub page_count: u32,
}

/// Video details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub duration_minutes: u32,
    pub quality: String,
}

/// Audio recording details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioInfo {
    pub publisher: String,
    pub duration_minutes: u32,
}

/// Downloadable file details (the "downloadable" capability of an ebook)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadInfo {
    pub file_size_mb: f64,
    pub file_format: String,
}

impl DownloadInfo {
    /// Short descriptor such as `12.5 MB PDF`
    pub fn descriptor(&self) -> String {
        format!("{} MB {}", self.file_size_mb, self.file_format)
    }
}

/// Narrated recording details of an audiobook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationInfo {
    pub narrator: String,
    pub duration_minutes: u32,
}

/// Variant-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MediaKind {
    Book(BookInfo),
    Video(VideoInfo),
    Audio(AudioInfo),
    Ebook {
        book: BookInfo,
        download: DownloadInfo,
    },
    Audiobook {
        book: BookInfo,
        narration: NarrationInfo,
    },
}

impl MediaKind {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            MediaKind::Book(_) => TypeTag::Book,
            MediaKind::Video(_) => TypeTag::Video,
            MediaKind::Audio(_) => TypeTag::Audio,
            MediaKind::Ebook { .. } => TypeTag::Ebook,
            MediaKind::Audiobook { .. } => TypeTag::Audiobook,
        }
    }

    /// Book payload, for the kinds that have one
    pub fn book(&self) -> Option<&BookInfo> {
        match self {
            MediaKind::Book(book)
            | MediaKind::Ebook { book, .. }
            | MediaKind::Audiobook { book, .. } => Some(book),
            MediaKind::Video(_) | MediaKind::Audio(_) => None,
        }
    }

    /// Running time in minutes; 0 for kinds without a duration
    pub fn duration_minutes(&self) -> u32 {
        match self {
            MediaKind::Video(video) => video.duration_minutes,
            MediaKind::Audio(audio) => audio.duration_minutes,
            MediaKind::Audiobook { narration, .. } => narration.duration_minutes,
            MediaKind::Book(_) | MediaKind::Ebook { .. } => 0,
        }
    }
}

/// A single catalogue entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    id: MediaId,
    title: String,
    available: bool,
    #[serde(flatten)]
    kind: MediaKind,
}

impl Media {
    /// Rebuild an item with an explicit availability (used when decoding records)
    pub fn restore(
        id: i64,
        title: impl Into<String>,
        available: bool,
        kind: MediaKind,
    ) -> Self {
        Self {
            id: MediaId(id),
            title: title.into(),
            available,
            kind,
        }
    }

    /// Create an available book
    pub fn book(
        id: i64,
        title: impl Into<String>,
        author: impl Into<String>,
        page_count: u32,
    ) -> Self {
        Self::restore(
            id,
            title,
            true,
            MediaKind::Book(BookInfo {
                author: author.into(),
                page_count,
            }),
        )
    }

    /// Create an available video
    pub fn video(
        id: i64,
        title: impl Into<String>,
        duration_minutes: u32,
        quality: impl Into<String>,
    ) -> Self {
        Self::restore(
            id,
            title,
            true,
            MediaKind::Video(VideoInfo {
                duration_minutes,
                quality: quality.into(),
            }),
        )
    }

    /// Create an available audio recording
    pub fn audio(
        id: i64,
        title: impl Into<String>,
        publisher: impl Into<String>,
        duration_minutes: u32,
    ) -> Self {
        Self::restore(
            id,
            title,
            true,
            MediaKind::Audio(AudioInfo {
                publisher: publisher.into(),
                duration_minutes,
            }),
        )
    }

    /// Create an ebook. New ebooks are always available.
    pub fn ebook(
        id: i64,
        title: impl Into<String>,
        book: BookInfo,
        download: DownloadInfo,
    ) -> Self {
        Self::restore(id, title, true, MediaKind::Ebook { book, download })
    }

    /// Create an audiobook with caller-supplied availability
    pub fn audiobook(
        id: i64,
        title: impl Into<String>,
        available: bool,
        book: BookInfo,
        narration: NarrationInfo,
    ) -> Self {
        Self::restore(id, title, available, MediaKind::Audiobook { book, narration })
    }

    pub fn id(&self) -> MediaId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn kind(&self) -> &MediaKind {
        &self.kind
    }

    pub fn type_tag(&self) -> TypeTag {
        self.kind.type_tag()
    }

    pub fn duration_minutes(&self) -> u32 {
        self.kind.duration_minutes()
    }

    /// Check the item out. Fails without mutation if it is already out.
    pub fn borrow(&mut self) -> Result<(), AlreadyUnavailable> {
        if !self.available {
            return Err(AlreadyUnavailable { id: self.id });
        }
        self.available = false;
        Ok(())
    }

    /// Check the item back in (idempotent)
    pub fn return_item(&mut self) {
        self.available = true;
    }

    /// One-line human-readable rendering covering every field of the variant
    pub fn summary(&self) -> String {
        let status = if self.available { "available" } else { "borrowed" };
        let details = match &self.kind {
            MediaKind::Book(book) => book_details(book),
            MediaKind::Video(video) => format!(
                "{} min, {} quality",
                video.duration_minutes, video.quality
            ),
            MediaKind::Audio(audio) => format!(
                "published by {}, {} min",
                audio.publisher, audio.duration_minutes
            ),
            MediaKind::Ebook { book, download } => {
                format!("{}, file: {}", book_details(book), download.descriptor())
            }
            MediaKind::Audiobook { book, narration } => format!(
                "{}, narrated by {}, {} min",
                book_details(book),
                narration.narrator,
                narration.duration_minutes
            ),
        };

        format!(
            "[{}] {} \"{}\" {} ({})",
            self.id,
            self.type_tag(),
            self.title,
            details,
            status
        )
    }
}

fn book_details(book: &BookInfo) -> String {
    format!("by {}, {} pages", book.author, book.page_count)
}

impl std::fmt::Display for Media {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}
