//! Command-line interface for librasys.
//!
//! Provides commands for browsing and searching the catalogue, borrowing and
//! returning items, and (for staff roles) maintaining the inventory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::config;
use crate::domain::{
    Action, BookInfo, DownloadInfo, Media, MediaId, NarrationInfo, Role, TypeTag,
};
use crate::library::{record, seed, Catalogue, CatalogueError, CatalogueFile};

/// librasys - media library catalogue
#[derive(Parser, Debug)]
#[command(name = "librasys")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Catalogue file (defaults to the configured location)
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Session role (defaults to LIBRASYS_ROLE or the config file)
    #[arg(long, global = true, value_enum)]
    pub role: Option<Role>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the catalogue, sorted by id
    List {
        /// Only show one kind (book, video, audio, ebook, audiobook)
        #[arg(short = 't', long = "type")]
        kind: Option<TypeTag>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one item
    Show {
        /// Media ID
        id: i64,
    },

    /// Search titles (case-sensitive substring)
    Search {
        /// Text to look for
        needle: String,
    },

    /// Add an item to the catalogue
    Add {
        #[command(subcommand)]
        media: AddMedia,
    },

    /// Remove an item
    Remove {
        /// Media ID
        id: i64,
    },

    /// Borrow an item
    Borrow {
        /// Media ID
        id: i64,
    },

    /// Return a borrowed item
    Return {
        /// Media ID
        id: i64,
    },

    /// Show catalogue statistics
    Stats {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Write the demo catalogue
    Init {
        /// Overwrite an existing catalogue
        #[arg(long)]
        force: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Media to add, one subcommand per kind
#[derive(Subcommand, Debug)]
pub enum AddMedia {
    /// Printed book
    Book {
        id: i64,
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        pages: u32,
    },

    /// Video
    Video {
        id: i64,
        title: String,
        /// Running time in minutes
        #[arg(long)]
        duration: u32,
        #[arg(long)]
        quality: String,
    },

    /// Audio recording
    Audio {
        id: i64,
        title: String,
        #[arg(long)]
        publisher: String,
        /// Running time in minutes
        #[arg(long)]
        duration: u32,
    },

    /// Downloadable book
    Ebook {
        id: i64,
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        pages: u32,
        /// File size in megabytes
        #[arg(long, value_parser = parse_size_mb)]
        size_mb: f64,
        /// File format (PDF, EPUB, ...)
        #[arg(long)]
        format: String,
    },

    /// Narrated book
    Audiobook {
        id: i64,
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        pages: u32,
        #[arg(long)]
        narrator: String,
        /// Running time in minutes
        #[arg(long)]
        duration: u32,
        /// Register the item as already checked out
        #[arg(long)]
        borrowed: bool,
    },
}

impl AddMedia {
    fn into_media(self) -> Media {
        match self {
            AddMedia::Book {
                id,
                title,
                author,
                pages,
            } => Media::book(id, title, author, pages),
            AddMedia::Video {
                id,
                title,
                duration,
                quality,
            } => Media::video(id, title, duration, quality),
            AddMedia::Audio {
                id,
                title,
                publisher,
                duration,
            } => Media::audio(id, title, publisher, duration),
            AddMedia::Ebook {
                id,
                title,
                author,
                pages,
                size_mb,
                format,
            } => Media::ebook(
                id,
                title,
                BookInfo {
                    author,
                    page_count: pages,
                },
                DownloadInfo {
                    file_size_mb: size_mb,
                    file_format: format,
                },
            ),
            AddMedia::Audiobook {
                id,
                title,
                author,
                pages,
                narrator,
                duration,
                borrowed,
            } => Media::audiobook(
                id,
                title,
                !borrowed,
                BookInfo {
                    author,
                    page_count: pages,
                },
                NarrationInfo {
                    narrator,
                    duration_minutes: duration,
                },
            ),
        }
    }
}

/// File sizes must be finite so the record decodes again
fn parse_size_mb(value: &str) -> Result<f64, String> {
    let size: f64 = value.parse().map_err(|e| format!("{}", e))?;
    if size.is_finite() {
        Ok(size)
    } else {
        Err(format!("{} is not a finite size", value))
    }
}

/// Store and role for the current invocation
struct Session {
    store: CatalogueFile,
    role: Role,
}

impl Session {
    fn open(file: Option<PathBuf>, role: Option<Role>) -> Result<Self> {
        let store = match file {
            Some(path) => CatalogueFile::new(path),
            None => CatalogueFile::open_default()?,
        };
        let role = match role {
            Some(role) => role,
            None => config::default_role()?,
        };
        Ok(Self { store, role })
    }

    fn authorize(&self, action: Action) -> Result<()> {
        self.role.authorize(action)?;
        Ok(())
    }

    async fn load(&self) -> Result<Catalogue> {
        let report = self.store.load().await?;
        if !report.skipped.is_empty() {
            eprintln!(
                "Skipped {} malformed record(s) in {}",
                report.skipped.len(),
                self.store.path().display()
            );
        }
        Ok(report.catalogue)
    }

    async fn save(&self, catalogue: &Catalogue) -> Result<()> {
        self.store
            .save(catalogue)
            .await
            .with_context(|| format!("Failed to save catalogue: {}", self.store.path().display()))?;
        Ok(())
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let session = Session::open(self.file, self.role)?;

        match self.command {
            Commands::List { kind, json } => list_media(&session, kind, json).await,
            Commands::Show { id } => show_media(&session, MediaId(id)).await,
            Commands::Search { needle } => search_media(&session, &needle).await,
            Commands::Add { media } => add_media(&session, media.into_media()).await,
            Commands::Remove { id } => remove_media(&session, MediaId(id)).await,
            Commands::Borrow { id } => set_availability(&session, MediaId(id), false).await,
            Commands::Return { id } => set_availability(&session, MediaId(id), true).await,
            Commands::Stats { json } => show_statistics(&session, json).await,
            Commands::Init { force } => init_catalogue(&session, force).await,
            Commands::Config => show_config(&session),
        }
    }
}

fn status_label(media: &Media) -> &'static str {
    if media.is_available() {
        "available"
    } else {
        "borrowed"
    }
}

fn print_table<'a>(items: impl IntoIterator<Item = &'a Media>) {
    println!("{:<8} {:<10} {:<10} {}", "ID", "TYPE", "STATUS", "TITLE");
    println!("{}", "-".repeat(60));
    for media in items {
        println!(
            "{:<8} {:<10} {:<10} {}",
            media.id(),
            media.type_tag(),
            status_label(media),
            media.title()
        );
    }
}

/// List the catalogue sorted by id; the sorted order is saved back
async fn list_media(session: &Session, kind: Option<TypeTag>, json: bool) -> Result<()> {
    session.authorize(Action::View)?;
    let mut catalogue = session.load().await?;
    let reordered = !catalogue.is_sorted_by_id();

    {
        let items: Vec<&Media> = catalogue
            .list_all_sorted_by_id()
            .iter()
            .filter(|m| kind.map_or(true, |k| m.type_tag() == k))
            .collect();

        if json {
            println!("{}", serde_json::to_string_pretty(&items)?);
        } else if items.is_empty() {
            println!("Catalogue is empty. Use 'librasys add' or 'librasys init' to add media.");
        } else {
            print_table(items);
        }
    }

    if reordered {
        session.save(&catalogue).await?;
    }

    Ok(())
}

/// Show a single item
async fn show_media(session: &Session, id: MediaId) -> Result<()> {
    session.authorize(Action::View)?;
    let catalogue = session.load().await?;

    let media = catalogue.get(id).ok_or(CatalogueError::NotFound(id))?;
    println!("{}", media);

    Ok(())
}

/// Search titles
async fn search_media(session: &Session, needle: &str) -> Result<()> {
    session.authorize(Action::Search)?;
    let catalogue = session.load().await?;

    let results = catalogue.find_by_title(needle);
    if results.clone().next().is_none() {
        println!("No media found matching '{}'", needle);
        return Ok(());
    }

    for media in results {
        println!("{}", media);
    }

    Ok(())
}

/// Add an item
async fn add_media(session: &Session, media: Media) -> Result<()> {
    session.authorize(Action::Add)?;

    if !record::is_encodable(&media) {
        anyhow::bail!(
            "Fields may not contain '{}' or line breaks",
            record::DELIMITER
        );
    }

    let mut catalogue = session.load().await?;
    if catalogue.get(media.id()).is_some() {
        warn!(id = %media.id(), "Another item already uses this id");
    }

    println!("Added {}", media);
    catalogue.add(media);
    session.save(&catalogue).await
}

/// Remove an item
async fn remove_media(session: &Session, id: MediaId) -> Result<()> {
    session.authorize(Action::Remove)?;
    let mut catalogue = session.load().await?;

    if !catalogue.remove_by_id(id) {
        return Err(CatalogueError::NotFound(id).into());
    }

    session.save(&catalogue).await?;
    println!("Removed media {}", id);
    Ok(())
}

/// Borrow (`available == false`) or return an item
async fn set_availability(session: &Session, id: MediaId, available: bool) -> Result<()> {
    session.authorize(if available {
        Action::Return
    } else {
        Action::Borrow
    })?;
    let mut catalogue = session.load().await?;

    match catalogue.set_availability(id, available) {
        Ok(()) => {}
        Err(e @ CatalogueError::AlreadyUnavailable(_)) => {
            // Nothing changed, nothing to save
            eprintln!("{}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    session.save(&catalogue).await?;
    if available {
        println!("Returned media {}", id);
    } else {
        println!("Borrowed media {}", id);
    }
    Ok(())
}

/// Show statistics
async fn show_statistics(session: &Session, json: bool) -> Result<()> {
    session.authorize(Action::Statistics)?;
    let catalogue = session.load().await?;
    let stats = catalogue.statistics();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Total items:     {}", stats.total_count);
    println!("Available:       {}", stats.available_count);
    println!("Borrowed:        {}", stats.borrowed_count);
    println!("Book-like items: {}", stats.book_like_count);
    println!("Total duration:  {} min", stats.total_duration_minutes);
    println!("\nBy type:");
    for (tag, count) in &stats.by_type {
        println!("  {:<10} {}", tag, count);
    }

    Ok(())
}

/// Write the demo catalogue
async fn init_catalogue(session: &Session, force: bool) -> Result<()> {
    session.authorize(Action::Seed)?;

    if session.store.exists().await && !force {
        anyhow::bail!(
            "Catalogue already exists at {}. Use --force to overwrite.",
            session.store.path().display()
        );
    }

    let catalogue = seed::demo_catalogue();
    session.save(&catalogue).await?;
    println!(
        "Wrote {} demo items to {}",
        catalogue.len(),
        session.store.path().display()
    );
    Ok(())
}

/// Print the resolved configuration
fn show_config(session: &Session) -> Result<()> {
    let config = config::config()?;

    println!(
        "Config file: {}",
        config
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!("Home:        {}", config.home.display());
    println!("Catalogue:   {}", session.store.path().display());
    println!("Role:        {}", session.role);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_ebook() {
        let cli = Cli::try_parse_from([
            "librasys", "--role", "admin", "add", "ebook", "4", "Clean Code", "--author",
            "Robert C. Martin", "--pages", "464", "--size-mb", "12.5", "--format", "PDF",
        ])
        .unwrap();

        assert_eq!(cli.role, Some(Role::Admin));
        let Commands::Add { media } = cli.command else {
            panic!("expected add");
        };
        let media = media.into_media();
        assert_eq!(media.type_tag(), TypeTag::Ebook);
        assert_eq!(
            record::encode_record(&media),
            "Ebook;4;Clean Code;1;Robert C. Martin;464;12.5;PDF"
        );
    }

    #[test]
    fn test_parse_list_type_filter() {
        let cli = Cli::try_parse_from(["librasys", "list", "--type", "audiobook"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List {
                kind: Some(TypeTag::Audiobook),
                json: false
            }
        ));
    }

    #[test]
    fn test_parse_super_admin_role() {
        let cli = Cli::try_parse_from(["librasys", "stats", "--role", "super-admin"]).unwrap();
        assert_eq!(cli.role, Some(Role::SuperAdmin));
    }

    #[test]
    fn test_parse_rejects_non_finite_size() {
        for size in ["inf", "NaN", "-inf"] {
            let result = Cli::try_parse_from([
                "librasys", "add", "ebook", "4", "Clean Code", "--author", "Robert C. Martin",
                "--pages", "464", "--size-mb", size, "--format", "PDF",
            ]);
            assert!(result.is_err(), "{size} should be rejected");
        }
    }

    fn session(temp: &TempDir, role: Role) -> Session {
        Session {
            store: CatalogueFile::new(temp.path().join("catalogue.txt")),
            role,
        }
    }

    #[tokio::test]
    async fn test_client_cannot_add() {
        let temp = TempDir::new().unwrap();
        let client = session(&temp, Role::Client);

        let err = add_media(&client, Media::book(1, "Dune", "Herbert", 412))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not allowed"));
        assert!(!client.store.exists().await);
    }

    #[tokio::test]
    async fn test_add_borrow_and_list_persist() {
        let temp = TempDir::new().unwrap();
        let admin = session(&temp, Role::Admin);

        add_media(&admin, Media::book(3, "Emma", "Austen", 474)).await.unwrap();
        add_media(&admin, Media::book(1, "Dune", "Herbert", 412)).await.unwrap();
        set_availability(&admin, MediaId(1), false).await.unwrap();
        // Second borrow is reported, not fatal
        set_availability(&admin, MediaId(1), false).await.unwrap();
        assert!(set_availability(&admin, MediaId(9), false).await.is_err());

        list_media(&admin, None, false).await.unwrap();
        let content = std::fs::read_to_string(admin.store.path()).unwrap();
        assert_eq!(
            content,
            "Book;1;Dune;0;Herbert;412\nBook;3;Emma;1;Austen;474\n"
        );
    }

    #[tokio::test]
    async fn test_add_rejects_delimiter() {
        let temp = TempDir::new().unwrap();
        let admin = session(&temp, Role::Admin);

        let result = add_media(&admin, Media::book(1, "Dune; Messiah", "Herbert", 331)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_add_rejects_non_finite_size() {
        let temp = TempDir::new().unwrap();
        let admin = session(&temp, Role::Admin);

        let ebook = Media::ebook(
            4,
            "Clean Code",
            BookInfo {
                author: "Robert C. Martin".to_string(),
                page_count: 464,
            },
            DownloadInfo {
                file_size_mb: f64::INFINITY,
                file_format: "PDF".to_string(),
            },
        );
        assert!(add_media(&admin, ebook).await.is_err());
        assert!(!admin.store.exists().await);
        assert!(admin.store.load().await.unwrap().catalogue.is_empty());
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let admin = session(&temp, Role::SuperAdmin);

        init_catalogue(&admin, false).await.unwrap();
        assert!(init_catalogue(&admin, false).await.is_err());
        init_catalogue(&admin, true).await.unwrap();

        let report = admin.store.load().await.unwrap();
        assert_eq!(report.decoded_count(), 5);
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let admin = session(&temp, Role::Admin);

        let err = remove_media(&admin, MediaId(42)).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<CatalogueError>(),
            Some(&CatalogueError::NotFound(MediaId(42)))
        );
    }
}
