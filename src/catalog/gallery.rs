//! Browsing and searching the catalog.

use log::debug;
use serde::Serialize;

use super::{Diagram, DiagramId, RecordStore, StoreError};

/// Tags shown on a card before the rest are summarized as a count.
pub const CARD_TAG_LIMIT: usize = 3;

/// One gallery tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramCard {
    pub id: DiagramId,
    pub title: String,
    /// At most [`CARD_TAG_LIMIT`] tags.
    pub tags: Vec<String>,
    /// Number of tags not shown.
    pub more_tags: usize,
    pub svg_url: String,
    pub created_at: u64,
}

impl From<&Diagram> for DiagramCard {
    fn from(diagram: &Diagram) -> Self {
        let shown = diagram.tags.len().min(CARD_TAG_LIMIT);
        Self {
            id: diagram.id.clone(),
            title: diagram.title.clone(),
            tags: diagram.tags[..shown].to_vec(),
            more_tags: diagram.tags.len() - shown,
            svg_url: diagram.svg_url.clone(),
            created_at: diagram.created_at,
        }
    }
}

/// The public listing of diagrams.
#[derive(Debug, Clone)]
pub struct Gallery<R> {
    records: R,
}

impl<R: RecordStore> Gallery<R> {
    pub fn new(records: R) -> Self {
        Self { records }
    }

    /// Every diagram, newest first.
    pub fn list(&self) -> Result<Vec<DiagramCard>, StoreError> {
        self.cards(None)
    }

    /// Diagrams whose title or description contains `query`, newest first.
    pub fn search(&self, query: &str) -> Result<Vec<DiagramCard>, StoreError> {
        let query = query.trim();
        self.cards((!query.is_empty()).then_some(query))
    }

    fn cards(&self, query: Option<&str>) -> Result<Vec<DiagramCard>, StoreError> {
        let cards: Vec<DiagramCard> = self
            .records
            .list(query)?
            .iter()
            .map(DiagramCard::from)
            .collect();
        debug!(query = query.unwrap_or(""), results = cards.len(); "Listed gallery");
        Ok(cards)
    }
}
