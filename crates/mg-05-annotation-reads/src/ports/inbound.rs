//! # Driving Ports (Inbound API)

use crate::domain::{ReadError, ReadResponse};
use async_trait::async_trait;
use shared_types::Annotation;

/// What the gateway calls to answer `GET /annotations`.
#[async_trait]
pub trait AnnotationReadApi: Send + Sync {
    /// Every live annotation on `url`, newest first, with comments and
    /// author profiles.
    async fn read_annotations(&self, url: &str) -> Result<ReadResponse, ReadError>;

    /// One annotation on `url`. Still covers every candidate shard.
    async fn read_annotation(&self, url: &str, id: &str) -> Result<ReadResponse, ReadError>;

    /// Recently seen annotations, newest first.
    fn recent(&self, limit: usize) -> Vec<Annotation>;
}
