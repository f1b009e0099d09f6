//! Artifact descriptor export.

pub mod descriptor;
pub mod sink;

pub use descriptor::{export_descriptor, ArtifactDescriptor, Component, ExportError};
pub use sink::{JsonFileSink, MetadataSink};
