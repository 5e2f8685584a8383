use crate::domain::{ReadError, ReadResponse};
use crate::ports::AnnotationReadApi;
use crate::service::ReadService;
use async_trait::async_trait;
use shared_types::Annotation;

#[async_trait]
impl AnnotationReadApi for ReadService {
    async fn read_annotations(&self, url: &str) -> Result<ReadResponse, ReadError> {
        self.read(url, None).await
    }

    async fn read_annotation(&self, url: &str, id: &str) -> Result<ReadResponse, ReadError> {
        self.read(url, Some(id)).await
    }

    fn recent(&self, limit: usize) -> Vec<Annotation> {
        self.recent.snapshot(limit)
    }
}
