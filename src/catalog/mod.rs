//! The diagram catalog: records, asset storage, uploads and the gallery.
//!
//! Storage and the metadata model are collaborators reached through traits:
//!
//! - [`ObjectStore`]: holds uploaded SVG files and serves them by public URL
//! - [`RecordStore`]: holds [`Diagram`] records
//! - [`MetadataGenerator`]: proposes a title, description and tags for an upload
//!
//! [`memory`] provides in-process implementations of both stores.

pub mod gallery;
pub mod memory;
pub mod metadata;
pub mod upload;

pub use gallery::{CARD_TAG_LIMIT, DiagramCard, Gallery};
pub use memory::{MemoryObjectStore, MemoryRecordStore};
pub use metadata::{
    DEFAULT_TITLE, METADATA_PROMPT, Metadata, MetadataError, MetadataGenerator,
    ModelMetadataGenerator, TextModel, metadata_or_default, parse_metadata_response,
};
pub use upload::{UploadError, UploadFile, UploadRequest, Uploader};

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::HexColor;
use crate::editor::Editor;

/// Storage bucket for uploaded diagrams.
pub const DEFAULT_BUCKET: &str = "diagram-assets";

// ============================================================================
// Records
// ============================================================================

/// Identifier of a diagram record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagramId(String);

impl DiagramId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DiagramId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A catalog entry. Read-only to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
    pub id: DiagramId,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Hex colors found in the SVG at upload time.
    pub colors: Vec<HexColor>,
    pub svg_url: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
    pub updated_at: u64,
}

impl Diagram {
    /// Returns true if `query` occurs in the title or description, ignoring case.
    ///
    /// A blank query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

/// Insert payload for a new record. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewDiagram {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub colors: Vec<HexColor>,
    pub svg_url: String,
}

/// Location of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub public_url: String,
}

// ============================================================================
// Errors
// ============================================================================

/// Failures reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("object {0:?} already exists")]
    AlreadyExists(String),

    #[error("{0:?} not found")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Failures while looking up a diagram for viewing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("diagram {0} not found")]
    NotFound(DiagramId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// Collaborators
// ============================================================================

/// Binary asset storage with public URLs.
pub trait ObjectStore {
    /// Stores `bytes` under `bucket`/`key`. Existing keys are never overwritten.
    fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, StoreError>;

    /// Fetches a stored object by its public URL as UTF-8 text.
    fn fetch_text(&self, public_url: &str) -> Result<String, StoreError>;
}

/// Diagram record storage.
pub trait RecordStore {
    fn get(&self, id: &DiagramId) -> Result<Option<Diagram>, StoreError>;

    /// Records matching `query` (see [`Diagram::matches`]), newest first.
    fn list(&self, query: Option<&str>) -> Result<Vec<Diagram>, StoreError>;

    fn insert(&self, diagram: NewDiagram) -> Result<Diagram, StoreError>;
}

impl<O: ObjectStore + ?Sized> ObjectStore for &O {
    fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, StoreError> {
        (**self).put(bucket, key, bytes, content_type)
    }

    fn fetch_text(&self, public_url: &str) -> Result<String, StoreError> {
        (**self).fetch_text(public_url)
    }
}

impl<R: RecordStore + ?Sized> RecordStore for &R {
    fn get(&self, id: &DiagramId) -> Result<Option<Diagram>, StoreError> {
        (**self).get(id)
    }

    fn list(&self, query: Option<&str>) -> Result<Vec<Diagram>, StoreError> {
        (**self).list(query)
    }

    fn insert(&self, diagram: NewDiagram) -> Result<Diagram, StoreError> {
        (**self).insert(diagram)
    }
}

/// Looks up diagram `id`, fetches its SVG and opens an editor on it.
pub fn open_editor<R, O>(records: &R, objects: &O, id: &DiagramId) -> Result<Editor, CatalogError>
where
    R: RecordStore + ?Sized,
    O: ObjectStore + ?Sized,
{
    let diagram = records
        .get(id)?
        .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
    let svg = objects.fetch_text(&diagram.svg_url)?;
    debug!(id = id.as_str(), bytes = svg.len(); "Opening editor");
    Ok(Editor::open(diagram, svg))
}
