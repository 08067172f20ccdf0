//! The run-scoped [`TransformCache`]. Parsing a source document is the most
//! expensive step of a build and the same document is needed more than once
//! (to render its own page, and again when a parent index page lists it), so
//! every parse goes through the cache and happens exactly once per path.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The output of a [`Transformer`]: the rendered HTML body and the metadata
/// parsed from the document's frontmatter.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub contents: String,
    pub meta: Metadata,
}

/// The metadata of a source document.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Metadata {
    /// The document title.
    #[serde(rename = "Title")]
    pub title: String,

    /// The date, as written. Validated when the document becomes a
    /// [`crate::post::Post`].
    #[serde(rename = "Date")]
    pub date: String,

    /// The document classification (`Post`, `Page`, `Index`, ...).
    #[serde(rename = "Template")]
    pub template: String,

    /// The tags. Either a YAML list or a single space-separated string.
    #[serde(default, rename = "Tags", deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        List(Vec<String>),
        Words(String),
    }

    Ok(match Option::<Tags>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Tags::List(tags)) => tags,
        Some(Tags::Words(words)) => {
            words.split_whitespace().map(str::to_owned).collect()
        }
    })
}

/// Converts a source file into a [`Document`]. Implementations must be
/// deterministic for a given input within one build.
pub trait Transformer {
    type Error: std::error::Error;

    fn parse(&self, path: &Path) -> Result<Document, Self::Error>;
}

/// Memoizes a [`Transformer`] by source path. Entries are never evicted; the
/// cache lives for exactly one build.
pub struct TransformCache<T> {
    transformer: T,
    documents: HashMap<PathBuf, Document>,
}

impl<T: Transformer> TransformCache<T> {
    pub fn new(transformer: T) -> Self {
        TransformCache {
            transformer,
            documents: HashMap::new(),
        }
    }

    /// Returns the document for `path`, invoking the transformer only if the
    /// path hasn't been seen before. Nothing is cached when the transformer
    /// fails.
    pub fn get_or_create(&mut self, path: &Path) -> Result<&Document, T::Error> {
        if self.documents.contains_key(path) {
            tracing::debug!(path = %path.display(), "transform cache hit");
        } else {
            let document = self.transformer.parse(path)?;
            self.documents.insert(path.to_owned(), document);
        }
        Ok(&self.documents[path])
    }

    /// The number of cached documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
