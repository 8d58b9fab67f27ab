//! In-memory catalogue of media items.
//!
//! The catalogue owns its items outright and preserves insertion order.
//! Ids are not checked for uniqueness: lookups, removal and availability
//! changes act on the first matching item.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::{Media, MediaId, TypeTag};

/// Errors from catalogue operations. None of them mutate the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CatalogueError {
    #[error("Media not found: {0}")]
    NotFound(MediaId),

    #[error("Media {0} is already borrowed")]
    AlreadyUnavailable(MediaId),
}

/// Aggregate figures over the whole catalogue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_count: usize,
    pub available_count: usize,
    pub borrowed_count: usize,

    /// Sum of running times; kinds without a duration count as 0
    pub total_duration_minutes: u64,

    /// Books, ebooks and audiobooks
    pub book_like_count: usize,

    /// Item count per kind (kinds with no items are omitted)
    pub by_type: BTreeMap<TypeTag, usize>,
}

/// Ordered collection of media items for one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogue {
    items: Vec<Media>,
}

impl Catalogue {
    /// Create an empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item. Duplicate ids are accepted as-is.
    pub fn add(&mut self, media: Media) {
        debug!(id = %media.id(), kind = %media.type_tag(), "Adding media");
        self.items.push(media);
    }

    /// Get the first item with `id`
    pub fn get(&self, id: MediaId) -> Option<&Media> {
        self.items.iter().find(|m| m.id() == id)
    }

    /// Remove the first item with `id`; returns whether anything was removed
    pub fn remove_by_id(&mut self, id: MediaId) -> bool {
        match self.items.iter().position(|m| m.id() == id) {
            Some(pos) => {
                self.items.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Items whose title contains `needle` (case-sensitive).
    ///
    /// The iterator is lazy and can be cloned to restart the search.
    pub fn find_by_title<'a>(
        &'a self,
        needle: &'a str,
    ) -> impl Iterator<Item = &'a Media> + Clone + 'a {
        self.items.iter().filter(move |m| m.title().contains(needle))
    }

    /// Items of a single kind
    pub fn filter_by_type(&self, tag: TypeTag) -> Vec<&Media> {
        self.items.iter().filter(|m| m.type_tag() == tag).collect()
    }

    /// Borrow (`available == false`) or return (`available == true`) the
    /// first item with `id`
    pub fn set_availability(&mut self, id: MediaId, available: bool) -> Result<(), CatalogueError> {
        let media = self
            .items
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or(CatalogueError::NotFound(id))?;

        if available {
            media.return_item();
        } else {
            media
                .borrow()
                .map_err(|e| CatalogueError::AlreadyUnavailable(e.id))?;
        }

        debug!(%id, available, "Availability updated");
        Ok(())
    }

    /// Check out the first item with `id`
    pub fn borrow(&mut self, id: MediaId) -> Result<(), CatalogueError> {
        self.set_availability(id, false)
    }

    /// Check in the first item with `id`
    pub fn return_item(&mut self, id: MediaId) -> Result<(), CatalogueError> {
        self.set_availability(id, true)
    }

    /// Sort the catalogue by id in place (stable) and return the new order.
    ///
    /// The sorted order becomes the order written on the next save.
    pub fn list_all_sorted_by_id(&mut self) -> &[Media] {
        self.items.sort_by_key(|m| m.id());
        &self.items
    }

    /// Whether the items are already in ascending id order
    pub fn is_sorted_by_id(&self) -> bool {
        self.items.windows(2).all(|w| w[0].id() <= w[1].id())
    }

    /// Compute aggregate statistics
    pub fn statistics(&self) -> Statistics {
        let mut stats = Statistics::default();

        for media in &self.items {
            let tag = media.type_tag();
            stats.total_count += 1;
            if media.is_available() {
                stats.available_count += 1;
            } else {
                stats.borrowed_count += 1;
            }
            stats.total_duration_minutes += u64::from(media.duration_minutes());
            if tag.is_book_like() {
                stats.book_like_count += 1;
            }
            *stats.by_type.entry(tag).or_insert(0) += 1;
        }

        stats
    }

    /// Items in current order
    pub fn items(&self) -> &[Media] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Media> {
        self.items.iter()
    }

    /// Get the number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalogue is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<Media>> for Catalogue {
    fn from(items: Vec<Media>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a Catalogue {
    type Item = &'a Media;
    type IntoIter = std::slice::Iter<'a, Media>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
