//! Title, description and tags proposed by a language model for an upload.

use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Instruction sent to the model along with the SVG.
pub const METADATA_PROMPT: &str = "This is an SVG diagram. Please generate a concise title (max 50 chars), \
a short description (max 100 chars), and 3-5 relevant tags (comma separated) for this image. \
Output JSON format: { \"title\": \"...\", \"description\": \"...\", \"tags\": [\"tag1\", \"tag2\"] }";

/// Title used when the model proposes none.
pub const DEFAULT_TITLE: &str = "New Diagram";

/// From the first `{` to the last `}`, across lines.
static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid JSON block regex"));

/// Descriptive fields of a diagram record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: String::new(),
            tags: Vec::new(),
        }
    }
}

/// Why no metadata could be generated. Never fatal to an upload.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("model request failed: {0}")]
    Model(String),

    #[error("model reply contains no JSON object")]
    NoJson,

    #[error("model reply is not valid metadata: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Produces metadata for an uploaded file.
pub trait MetadataGenerator {
    fn generate(&self, bytes: &[u8], mime_type: &str) -> Result<Metadata, MetadataError>;
}

impl<M: MetadataGenerator + ?Sized> MetadataGenerator for &M {
    fn generate(&self, bytes: &[u8], mime_type: &str) -> Result<Metadata, MetadataError> {
        (**self).generate(bytes, mime_type)
    }
}

/// A generative model that answers a prompt about an attached file.
pub trait TextModel {
    fn complete(&self, prompt: &str, data: &[u8], mime_type: &str) -> Result<String, MetadataError>;
}

impl<T: TextModel + ?Sized> TextModel for &T {
    fn complete(&self, prompt: &str, data: &[u8], mime_type: &str) -> Result<String, MetadataError> {
        (**self).complete(prompt, data, mime_type)
    }
}

/// Asks a [`TextModel`] for metadata and parses its reply.
#[derive(Debug, Clone)]
pub struct ModelMetadataGenerator<T> {
    model: T,
    prompt: String,
}

impl<T: TextModel> ModelMetadataGenerator<T> {
    pub fn new(model: T) -> Self {
        Self {
            model,
            prompt: METADATA_PROMPT.to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}

impl<T: TextModel> MetadataGenerator for ModelMetadataGenerator<T> {
    fn generate(&self, bytes: &[u8], mime_type: &str) -> Result<Metadata, MetadataError> {
        let reply = self.model.complete(&self.prompt, bytes, mime_type)?;
        debug!(bytes = reply.len(); "Model replied");
        parse_metadata_response(&reply)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMetadata {
    title: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
}

/// Extracts metadata from a model reply.
///
/// The reply may wrap the JSON object in prose or a code fence. Fields that
/// are missing, null or empty fall back to their defaults one by one.
///
/// ```
/// use diagram_studio::catalog::parse_metadata_response;
///
/// let reply = "```json\n{\"title\": \"Pipeline\", \"tags\": [\"ci\"]}\n```";
/// let metadata = parse_metadata_response(reply).unwrap();
/// assert_eq!(metadata.title, "Pipeline");
/// assert_eq!(metadata.description, "");
/// assert_eq!(metadata.tags, ["ci"]);
/// ```
pub fn parse_metadata_response(reply: &str) -> Result<Metadata, MetadataError> {
    let block = JSON_BLOCK.find(reply).ok_or(MetadataError::NoJson)?;
    let raw: RawMetadata = serde_json::from_str(block.as_str())?;
    let defaults = Metadata::default();

    Ok(Metadata {
        title: non_empty(raw.title).unwrap_or(defaults.title),
        description: non_empty(raw.description).unwrap_or(defaults.description),
        tags: raw.tags.unwrap_or(defaults.tags),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Generates metadata, falling back to the defaults on any failure.
pub fn metadata_or_default<M>(generator: &M, bytes: &[u8], mime_type: &str) -> Metadata
where
    M: MetadataGenerator + ?Sized,
{
    generator.generate(bytes, mime_type).unwrap_or_else(|err| {
        warn!(error = err.to_string(); "Metadata generation failed, using defaults");
        Metadata::default()
    })
}
