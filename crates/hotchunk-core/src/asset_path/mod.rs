//! Output-path resolution for chunk and hot-update files.
//!
//! The build system hands the runtime a public path prefix, filename
//! templates, the current build hash, and per-chunk hash/name maps. This
//! module renders a template for a concrete chunk and joins it onto the
//! public path to produce the URL the transport fetches.

mod template;

use std::collections::HashMap;

use thiserror::Error;
use url::Url;

use crate::id::ChunkId;

pub(crate) use template::{render, ChunkRef, RenderContext};

/// Failure to resolve a concrete asset path from a template.
#[derive(Debug, Error)]
pub enum AssetPathError {
    #[error("unknown placeholder [{0}] in filename template")]
    UnknownPlaceholder(String),
    #[error("unclosed placeholder in filename template")]
    UnclosedPlaceholder,
    #[error("placeholder [{0}] needs a chunk context")]
    PlaceholderNeedsChunk(String),
    #[error("no chunk hash recorded for chunk {0}")]
    MissingChunkHash(ChunkId),
    #[error("bad truncation length in [{0}]")]
    BadTruncation(String),
}

/// Filename templates, hashes and the public path for one deployed build.
#[derive(Debug, Clone)]
pub struct AssetPaths {
    public_path: String,
    chunk_filename: String,
    hot_update_chunk_filename: String,
    hot_update_main_filename: String,
    build_hash: String,
    chunk_hashes: HashMap<ChunkId, String>,
    chunk_names: HashMap<ChunkId, String>,
}

impl AssetPaths {
    /// New path set with the stock filename templates.
    pub fn new(public_path: impl Into<String>, build_hash: impl Into<String>) -> Self {
        Self {
            public_path: public_path.into(),
            chunk_filename: "[id].bundle.js".to_string(),
            hot_update_chunk_filename: "[id].[hash].hot-update.js".to_string(),
            hot_update_main_filename: "[hash].hot-update.json".to_string(),
            build_hash: build_hash.into(),
            chunk_hashes: HashMap::new(),
            chunk_names: HashMap::new(),
        }
    }

    pub fn with_chunk_filename(mut self, template: impl Into<String>) -> Self {
        self.chunk_filename = template.into();
        self
    }

    pub fn with_hot_update_chunk_filename(mut self, template: impl Into<String>) -> Self {
        self.hot_update_chunk_filename = template.into();
        self
    }

    pub fn with_hot_update_main_filename(mut self, template: impl Into<String>) -> Self {
        self.hot_update_main_filename = template.into();
        self
    }

    /// Records the content hash the build assigned to one chunk
    /// (consumed by `[chunkhash]`).
    pub fn with_chunk_hash(mut self, id: ChunkId, hash: impl Into<String>) -> Self {
        self.chunk_hashes.insert(id, hash.into());
        self
    }

    /// Records a human-readable name for one chunk (consumed by `[name]`;
    /// unnamed chunks fall back to their id).
    pub fn with_chunk_name(mut self, id: ChunkId, name: impl Into<String>) -> Self {
        self.chunk_names.insert(id, name.into());
        self
    }

    /// Replaces the build hash. The hot-update poller advances to the hash
    /// a manifest announced before polling again.
    pub fn with_build_hash(mut self, hash: impl Into<String>) -> Self {
        self.build_hash = hash.into();
        self
    }

    pub fn build_hash(&self) -> &str {
        &self.build_hash
    }

    /// URL of the script file for a chunk.
    pub fn chunk_url(&self, id: &ChunkId) -> Result<String, AssetPathError> {
        let filename = render(&self.chunk_filename, &self.context(Some(id)))?;
        Ok(self.join(&filename))
    }

    /// URL of the hot-update file for a chunk.
    pub fn hot_update_chunk_url(&self, id: &ChunkId) -> Result<String, AssetPathError> {
        let filename = render(&self.hot_update_chunk_filename, &self.context(Some(id)))?;
        Ok(self.join(&filename))
    }

    /// URL of the hot-update manifest for the current build hash.
    pub fn manifest_url(&self) -> Result<String, AssetPathError> {
        let filename = render(&self.hot_update_main_filename, &self.context(None))?;
        Ok(self.join(&filename))
    }

    fn context<'a>(&'a self, id: Option<&'a ChunkId>) -> RenderContext<'a> {
        RenderContext {
            build_hash: &self.build_hash,
            chunk: id.map(|id| ChunkRef {
                id,
                hash: self.chunk_hashes.get(id).map(String::as_str),
                name: self.chunk_names.get(id).map(String::as_str),
            }),
        }
    }

    fn join(&self, filename: &str) -> String {
        let base = if self.public_path.is_empty() || self.public_path.ends_with('/') {
            self.public_path.clone()
        } else {
            format!("{}/", self.public_path)
        };
        match Url::parse(&base) {
            Ok(url) => url
                .join(filename)
                .map(Into::into)
                .unwrap_or_else(|_| format!("{}{}", base, filename)),
            // Relative public paths are kept as plain string prefixes.
            Err(_) => format!("{}{}", base, filename),
        }
    }
}
