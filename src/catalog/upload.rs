//! Admin upload flow: store the asset, describe it, record it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{info, warn};
use thiserror::Error;

use super::memory::now_millis;
use super::metadata::metadata_or_default;
use super::{DEFAULT_BUCKET, Diagram, MetadataGenerator, NewDiagram, ObjectStore, RecordStore, StoreError};
use crate::color::extract_colors;
use crate::render::SVG_MIME;

/// Why an upload did not produce a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// Wrong secret or unusable file. Nothing was stored.
    #[error("upload rejected: {0}")]
    Rejected(String),

    #[error("upload failed: {0}")]
    Storage(StoreError),

    /// The asset was stored but the record insert failed.
    #[error("record insert failed: {0}")]
    Record(StoreError),
}

/// A file picked for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// The admin upload form.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub password: String,
    pub file: Option<UploadFile>,
}

impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("password", &"<redacted>")
            .field("file", &self.file)
            .finish()
    }
}

/// Runs admin uploads against injected stores and a metadata generator.
pub struct Uploader<O, R, M> {
    objects: O,
    records: R,
    metadata: M,
    admin_password: String,
    bucket: String,
    seq: AtomicU64,
}

impl<O, R, M> Uploader<O, R, M>
where
    O: ObjectStore,
    R: RecordStore,
    M: MetadataGenerator,
{
    /// Creates an uploader guarded by `admin_password`.
    ///
    /// An empty password rejects every upload.
    pub fn new(objects: O, records: R, metadata: M, admin_password: impl Into<String>) -> Self {
        Self {
            objects,
            records,
            metadata,
            admin_password: admin_password.into(),
            bucket: DEFAULT_BUCKET.to_string(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Uploads the request's file and inserts a record for it.
    ///
    /// Metadata generation is best effort: any failure falls back to the
    /// default title with no description or tags.
    pub fn upload(&self, request: &UploadRequest) -> Result<Diagram, UploadError> {
        if self.admin_password.is_empty() || request.password != self.admin_password {
            warn!("Rejected upload with invalid admin password");
            return Err(UploadError::Rejected("invalid admin password".into()));
        }
        let file = request
            .file
            .as_ref()
            .ok_or_else(|| UploadError::Rejected("no file uploaded".into()))?;
        if file.bytes.is_empty() {
            return Err(UploadError::Rejected(format!("{} is empty", file.name)));
        }

        let key = self.object_key(&file.name);
        let stored = self
            .objects
            .put(&self.bucket, &key, &file.bytes, SVG_MIME)
            .map_err(UploadError::Storage)?;

        let metadata = metadata_or_default(&self.metadata, &file.bytes, SVG_MIME);
        let colors = extract_colors(&String::from_utf8_lossy(&file.bytes));

        let diagram = self
            .records
            .insert(NewDiagram {
                title: metadata.title,
                description: metadata.description,
                tags: metadata.tags,
                colors,
                svg_url: stored.public_url,
            })
            .map_err(UploadError::Record)?;

        info!(id = diagram.id.as_str(), key = key.as_str(); "Uploaded diagram");
        Ok(diagram)
    }

    /// `<millis>-<seq>-<file name>`, unique within this uploader.
    fn object_key(&self, file_name: &str) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{seq}-{file_name}", now_millis())
    }
}
