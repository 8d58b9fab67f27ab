//! Line-oriented record format for the persisted catalogue.
//!
//! One media item per line, fields joined by `;`:
//!
//! ```text
//! Book;id;title;available;author;pageCount
//! Video;id;title;available;durationMinutes;quality
//! Audio;id;title;available;publisher;durationMinutes
//! Ebook;id;title;available;author;pageCount;fileSizeMb;fileFormat
//! Audiobook;id;title;available;author;pageCount;narrator;durationMinutes
//! ```
//!
//! `available` is written as `1` or `0`. Field values are not escaped, so a
//! value containing `;` produces a corrupt record. Callers that accept user
//! input should reject such values up front (see [`is_encodable`]).
//!
//! Page counts and durations are unsigned: a negative value such as `-5` is a
//! [`FormatError`] like any other non-numeric token, and aborts the load.
//! File sizes must be finite; `inf` and `NaN` are rejected the same way.

use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use crate::domain::{
    AudioInfo, BookInfo, DownloadInfo, Media, MediaKind, NarrationInfo, TypeTag, VideoInfo,
};

/// Field separator
pub const DELIMITER: char = ';';

/// Shared prefix every record must have: `type;id;title;available`
pub const MIN_FIELDS: usize = 4;

/// A numeric field could not be parsed. Aborts the whole decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Line {line}: field '{field}' is not a valid number: {value:?}")]
pub struct FormatError {
    /// 1-based line number in the decoded text
    pub line: usize,
    pub field: &'static str,
    pub value: String,
}

/// Why a line was ignored during decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than [`MIN_FIELDS`] tokens
    TooFewFields { found: usize },

    /// First token is not a known type tag
    UnknownType(String),

    /// Known type, but fewer tokens than its layout requires
    MissingFields {
        tag: TypeTag,
        found: usize,
        required: usize,
    },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::TooFewFields { found } => {
                write!(f, "expected at least {} fields, found {}", MIN_FIELDS, found)
            }
            SkipReason::UnknownType(tag) => write!(f, "unknown media type {:?}", tag),
            SkipReason::MissingFields {
                tag,
                found,
                required,
            } => write!(f, "{} record needs {} fields, found {}", tag, required, found),
        }
    }
}

/// A line that was skipped, with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: usize,
    pub reason: SkipReason,
}

/// Result of decoding a single line
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Media(Media),
    Skipped(SkipReason),
}

/// Result of decoding a whole catalogue text
#[derive(Debug, Clone, Default)]
pub struct DecodedCatalogue {
    /// Successfully decoded items, in file order
    pub media: Vec<Media>,

    /// Malformed lines that were ignored
    pub skipped: Vec<SkippedLine>,
}

impl DecodedCatalogue {
    /// Number of records decoded successfully
    pub fn decoded_count(&self) -> usize {
        self.media.len()
    }
}

/// Number of fields in the layout of `tag`
pub fn field_count(tag: TypeTag) -> usize {
    match tag {
        TypeTag::Book | TypeTag::Video | TypeTag::Audio => 6,
        TypeTag::Ebook | TypeTag::Audiobook => 8,
    }
}

/// Resolve the exact literal written in the first field
fn parse_tag(token: &str) -> Option<TypeTag> {
    TypeTag::ALL.into_iter().find(|tag| tag.as_str() == token)
}

/// Encode one item as a record (without trailing newline)
pub fn encode_record(media: &Media) -> String {
    let mut fields = vec![
        media.type_tag().as_str().to_string(),
        media.id().to_string(),
        media.title().to_string(),
        if media.is_available() { "1" } else { "0" }.to_string(),
    ];

    match media.kind() {
        MediaKind::Book(book) => {
            fields.push(book.author.clone());
            fields.push(book.page_count.to_string());
        }
        MediaKind::Video(video) => {
            fields.push(video.duration_minutes.to_string());
            fields.push(video.quality.clone());
        }
        MediaKind::Audio(audio) => {
            fields.push(audio.publisher.clone());
            fields.push(audio.duration_minutes.to_string());
        }
        MediaKind::Ebook { book, download } => {
            fields.push(book.author.clone());
            fields.push(book.page_count.to_string());
            fields.push(download.file_size_mb.to_string());
            fields.push(download.file_format.clone());
        }
        MediaKind::Audiobook { book, narration } => {
            fields.push(book.author.clone());
            fields.push(book.page_count.to_string());
            fields.push(narration.narrator.clone());
            fields.push(narration.duration_minutes.to_string());
        }
    }

    fields.join(&DELIMITER.to_string())
}

/// Encode a sequence of items, one newline-terminated record each
pub fn encode_catalogue<'a>(items: impl IntoIterator<Item = &'a Media>) -> String {
    encode_counted(items).0
}

/// Encode a sequence of items, also returning how many records were written
pub fn encode_counted<'a>(items: impl IntoIterator<Item = &'a Media>) -> (String, usize) {
    let mut out = String::new();
    let mut count = 0;
    for media in items {
        count += 1;
        if !is_encodable(media) {
            warn!(id = %media.id(), "Record will not decode cleanly");
        }
        out.push_str(&encode_record(media));
        out.push('\n');
    }
    (out, count)
}

/// Whether `media` encodes to a record that decodes back to it: text fields
/// free of the delimiter and newlines, file size finite
pub fn is_encodable(media: &Media) -> bool {
    let size_ok = match media.kind() {
        MediaKind::Ebook { download, .. } => download.file_size_mb.is_finite(),
        _ => true,
    };
    size_ok && text_fields(media).iter().all(|value| is_valid_field(value))
}

/// Whether a single text value can be stored without corrupting its record
pub fn is_valid_field(value: &str) -> bool {
    !value.contains(DELIMITER) && !value.contains('\n') && !value.contains('\r')
}

fn text_fields(media: &Media) -> Vec<&str> {
    let mut fields = vec![media.title()];
    match media.kind() {
        MediaKind::Book(book) => fields.push(&book.author),
        MediaKind::Video(video) => fields.push(&video.quality),
        MediaKind::Audio(audio) => fields.push(&audio.publisher),
        MediaKind::Ebook { book, download } => {
            fields.push(&book.author);
            fields.push(&download.file_format);
        }
        MediaKind::Audiobook { book, narration } => {
            fields.push(&book.author);
            fields.push(&narration.narrator);
        }
    }
    fields
}

/// Tokens of one record, with enough context to report parse failures
struct Fields<'a> {
    tokens: Vec<&'a str>,
    line: usize,
}

impl<'a> Fields<'a> {
    fn text(&self, index: usize) -> String {
        self.tokens[index].to_string()
    }

    fn number<T: FromStr>(&self, index: usize, field: &'static str) -> Result<T, FormatError> {
        let value = self.tokens[index];
        value.parse().map_err(|_| FormatError {
            line: self.line,
            field,
            value: value.to_string(),
        })
    }

    fn size(&self, index: usize, field: &'static str) -> Result<f64, FormatError> {
        let size: f64 = self.number(index, field)?;
        if !size.is_finite() {
            return Err(FormatError {
                line: self.line,
                field,
                value: self.tokens[index].to_string(),
            });
        }
        Ok(size)
    }

    fn book(&self) -> Result<BookInfo, FormatError> {
        Ok(BookInfo {
            author: self.text(4),
            page_count: self.number(5, "pageCount")?,
        })
    }
}

/// Decode one line. `line` is the 1-based line number used in errors.
///
/// Malformed lines (too few fields, unknown type) are reported as
/// [`Decoded::Skipped`]; a non-numeric numeric field is a hard [`FormatError`].
pub fn decode_record(text: &str, line: usize) -> Result<Decoded, FormatError> {
    let tokens: Vec<&str> = text.split(DELIMITER).collect();
    if tokens.len() < MIN_FIELDS {
        return Ok(Decoded::Skipped(SkipReason::TooFewFields {
            found: tokens.len(),
        }));
    }

    let Some(tag) = parse_tag(tokens[0]) else {
        return Ok(Decoded::Skipped(SkipReason::UnknownType(
            tokens[0].to_string(),
        )));
    };

    let required = field_count(tag);
    if tokens.len() < required {
        return Ok(Decoded::Skipped(SkipReason::MissingFields {
            tag,
            found: tokens.len(),
            required,
        }));
    }

    let fields = Fields { tokens, line };
    let id: i64 = fields.number(1, "id")?;
    let title = fields.text(2);
    let available = fields.tokens[3] == "1";

    let kind = match tag {
        TypeTag::Book => MediaKind::Book(fields.book()?),
        TypeTag::Video => MediaKind::Video(VideoInfo {
            duration_minutes: fields.number(4, "durationMinutes")?,
            quality: fields.text(5),
        }),
        TypeTag::Audio => MediaKind::Audio(AudioInfo {
            publisher: fields.text(4),
            duration_minutes: fields.number(5, "durationMinutes")?,
        }),
        TypeTag::Ebook => MediaKind::Ebook {
            book: fields.book()?,
            download: DownloadInfo {
                file_size_mb: fields.size(6, "fileSizeMb")?,
                file_format: fields.text(7),
            },
        },
        TypeTag::Audiobook => MediaKind::Audiobook {
            book: fields.book()?,
            narration: NarrationInfo {
                narrator: fields.text(6),
                duration_minutes: fields.number(7, "durationMinutes")?,
            },
        },
    };

    Ok(Decoded::Media(Media::restore(id, title, available, kind)))
}

/// Decode a whole catalogue text, skipping blank and malformed lines
pub fn decode_catalogue(text: &str) -> Result<DecodedCatalogue, FormatError> {
    let mut decoded = DecodedCatalogue::default();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if raw.trim().is_empty() {
            continue;
        }

        match decode_record(raw, line)? {
            Decoded::Media(media) => decoded.media.push(media),
            Decoded::Skipped(reason) => {
                warn!(line, %reason, "Skipping malformed record");
                decoded.skipped.push(SkippedLine { line, reason });
            }
        }
    }

    Ok(decoded)
}
