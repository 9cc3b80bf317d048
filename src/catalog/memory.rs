//! In-process stores.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use parking_lot::RwLock;

use super::{Diagram, DiagramId, NewDiagram, ObjectStore, RecordStore, StoreError, StoredObject};

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

// ============================================================================
// MemoryObjectStore
// ============================================================================

#[derive(Debug, Clone)]
struct StoredBytes {
    bytes: Vec<u8>,
    content_type: String,
}

/// Object storage kept in memory, keyed by public URL.
///
/// Public URLs follow `<base>/storage/v1/object/public/<bucket>/<key>`.
#[derive(Debug)]
pub struct MemoryObjectStore {
    base_url: String,
    objects: RwLock<HashMap<String, StoredBytes>>,
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{key}", self.base_url)
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Content type an object was stored with.
    pub fn content_type(&self, public_url: &str) -> Option<String> {
        self.objects
            .read()
            .get(public_url)
            .map(|stored| stored.content_type.clone())
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, StoreError> {
        let public_url = self.public_url(bucket, key);
        let mut objects = self.objects.write();
        if objects.contains_key(&public_url) {
            return Err(StoreError::AlreadyExists(format!("{bucket}/{key}")));
        }

        objects.insert(
            public_url.clone(),
            StoredBytes {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        debug!(bucket = bucket, key = key, bytes = bytes.len(); "Stored object");

        Ok(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            public_url,
        })
    }

    fn fetch_text(&self, public_url: &str) -> Result<String, StoreError> {
        let objects = self.objects.read();
        let stored = objects
            .get(public_url)
            .ok_or_else(|| StoreError::NotFound(public_url.to_string()))?;
        String::from_utf8(stored.bytes.clone())
            .map_err(|e| StoreError::Backend(format!("{public_url} is not UTF-8: {e}")))
    }
}

// ============================================================================
// MemoryRecordStore
// ============================================================================

#[derive(Debug, Default)]
struct Records {
    rows: Vec<Diagram>,
    next_id: u64,
    last_stamp: u64,
}

/// Record storage kept in memory.
///
/// Ids are sequential numbers. Creation stamps are strictly increasing, so
/// newest-first ordering is stable even for inserts within one millisecond.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<Records>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().rows.is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, id: &DiagramId) -> Result<Option<Diagram>, StoreError> {
        Ok(self
            .records
            .read()
            .rows
            .iter()
            .find(|d| &d.id == id)
            .cloned())
    }

    fn list(&self, query: Option<&str>) -> Result<Vec<Diagram>, StoreError> {
        let records = self.records.read();
        let mut found: Vec<Diagram> = records
            .rows
            .iter()
            .filter(|d| query.is_none_or(|q| d.matches(q)))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    fn insert(&self, diagram: NewDiagram) -> Result<Diagram, StoreError> {
        let mut records = self.records.write();
        records.next_id += 1;
        let stamp = now_millis().max(records.last_stamp + 1);
        records.last_stamp = stamp;

        let NewDiagram {
            title,
            description,
            tags,
            colors,
            svg_url,
        } = diagram;
        let row = Diagram {
            id: DiagramId::new(records.next_id.to_string()),
            title,
            description,
            tags,
            colors,
            svg_url,
            created_at: stamp,
            updated_at: stamp,
        };
        records.rows.push(row.clone());
        debug!(id = row.id.as_str(); "Inserted diagram record");
        Ok(row)
    }
}
