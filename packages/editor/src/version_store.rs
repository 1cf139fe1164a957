use formdraft_client::{ClientError, FormService};
use formdraft_schema::{VersionDetail, VersionSummary};
use std::sync::Arc;

/// Read-through accessor for a form's versions.
///
/// Pure query, no caching and no retries; failures surface as-is.
#[derive(Clone)]
pub struct VersionStore {
    service: Arc<dyn FormService>,
}

impl VersionStore {
    pub fn new(service: Arc<dyn FormService>) -> Self {
        Self { service }
    }

    /// Version summaries without field payloads
    pub async fn list_versions(&self, form_id: &str) -> Result<Vec<VersionSummary>, ClientError> {
        self.service.list_versions(form_id).await
    }

    /// One version with its full field list
    pub async fn get_version_detail(
        &self,
        form_id: &str,
        version_id: &str,
    ) -> Result<VersionDetail, ClientError> {
        self.service.get_version(form_id, version_id).await
    }
}
