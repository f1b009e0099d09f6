//! Metadata sinks.
//!
//! Publishing the descriptor is a collaborator concern; the engine only
//! hands over the finished value. The shipped sink writes pretty JSON to a
//! file.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::export::descriptor::ArtifactDescriptor;
use crate::util::fs::write_string;

/// Consumes artifact descriptors after a successful evaluation.
pub trait MetadataSink {
    /// Publish a descriptor.
    fn publish(&mut self, descriptor: &ArtifactDescriptor) -> Result<()>;
}

/// Writes the descriptor as pretty-printed JSON.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Create a sink writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSink { path: path.into() }
    }

    /// The output path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl MetadataSink for JsonFileSink {
    fn publish(&mut self, descriptor: &ArtifactDescriptor) -> Result<()> {
        let json = serde_json::to_string_pretty(descriptor)
            .context("failed to serialize artifact descriptor")?;

        write_string(&self.path, &json)?;

        tracing::info!(path = %self.path.display(), "published artifact descriptor");
        Ok(())
    }
}
