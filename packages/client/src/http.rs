//! HTTP form-service client
//!
//! JSON over HTTPS with a bearer token. Failures are mapped onto
//! [`ClientError`] and returned as-is; retrying is left to the caller.

use crate::{ClientConfig, ClientError, FormService, Result};
use async_trait::async_trait;
use formdraft_schema::wire::ReorderRequest;
use formdraft_schema::{
    BranchedVersion, Field, FieldOrder, FieldPatch, FieldTypeInfo, Form, FormPatch, NewField,
    VersionDetail, VersionSummary,
};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

pub struct HttpFormService {
    http: Client,
    base_url: String,
    token: String,
}

impl HttpFormService {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;

        if config.token.trim().is_empty() {
            return Err(ClientError::Config("bearer token is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            token: config.token.clone(),
        })
    }

    /// Build a request for the path made of `segments`.
    ///
    /// Each segment is percent-encoded, so ids may contain `/` or `?`. The
    /// returned string is the encoded path, used in logs and error messages.
    fn request(&self, method: Method, segments: &[&str]) -> Result<(RequestBuilder, String)> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("invalid api url '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("api url '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        let path = url.path().to_string();

        let request = self
            .http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json");
        Ok((request, path))
    }

    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(path, status = status.as_u16(), "form service response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::from_status(
            status.as_u16(),
            error_message(&body, path),
        ))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, path: &str) -> Result<T> {
        let response = self.execute(request, path).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("{}: {}", path, e)))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Prefer the service's `{"message": ...}` body; fall back to a truncated raw body
fn error_message(body: &str, path: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }

    let trimmed: String = body.chars().take(200).collect();
    if trimmed.is_empty() {
        path.to_string()
    } else {
        trimmed
    }
}

#[async_trait]
impl FormService for HttpFormService {
    async fn get_form(&self, form_id: &str) -> Result<Form> {
        let (request, path) = self.request(Method::GET, &["forms", form_id])?;
        self.fetch(request, &path).await
    }

    async fn list_field_types(&self) -> Result<Vec<FieldTypeInfo>> {
        let (request, path) = self.request(Method::GET, &["field-types"])?;
        self.fetch(request, &path).await
    }

    async fn list_versions(&self, form_id: &str) -> Result<Vec<VersionSummary>> {
        let (request, path) = self.request(Method::GET, &["forms", form_id, "versions"])?;
        self.fetch(request, &path).await
    }

    async fn get_version(&self, form_id: &str, version_id: &str) -> Result<VersionDetail> {
        let (request, path) =
            self.request(Method::GET, &["forms", form_id, "versions", version_id])?;
        self.fetch(request, &path).await
    }

    async fn create_branch(&self, form_id: &str) -> Result<BranchedVersion> {
        let (request, path) = self.request(Method::POST, &["forms", form_id, "versions"])?;
        self.fetch(request, &path).await
    }

    async fn publish_version(&self, form_id: &str, version_id: &str) -> Result<()> {
        let (request, path) =
            self.request(Method::PUT, &["forms", form_id, "versions", version_id, "publish"])?;
        self.execute(request, &path).await?;
        Ok(())
    }

    async fn activate_version(&self, form_id: &str, version_id: &str) -> Result<()> {
        let (request, path) =
            self.request(Method::PUT, &["forms", form_id, "versions", version_id, "activate"])?;
        self.execute(request, &path).await?;
        Ok(())
    }

    async fn add_field(&self, version_id: &str, field: &NewField) -> Result<Field> {
        let (request, path) =
            self.request(Method::POST, &["form-versions", version_id, "fields"])?;
        self.fetch(request.json(field), &path).await
    }

    async fn update_field(
        &self,
        version_id: &str,
        field_id: &str,
        patch: &FieldPatch,
    ) -> Result<Field> {
        let (request, path) =
            self.request(Method::PATCH, &["form-versions", version_id, "fields", field_id])?;
        self.fetch(request.json(patch), &path).await
    }

    async fn delete_field(&self, version_id: &str, field_id: &str) -> Result<()> {
        let (request, path) =
            self.request(Method::DELETE, &["form-versions", version_id, "fields", field_id])?;
        self.execute(request, &path).await?;
        Ok(())
    }

    async fn reorder_fields(&self, version_id: &str, order: &[FieldOrder]) -> Result<()> {
        let (request, path) =
            self.request(Method::PUT, &["form-versions", version_id, "fields", "reorder"])?;
        let body = ReorderRequest {
            fields: order.to_vec(),
        };
        self.execute(request.json(&body), &path).await?;
        Ok(())
    }

    async fn update_form(&self, form_id: &str, patch: &FormPatch) -> Result<Form> {
        let (request, path) = self.request(Method::PATCH, &["forms", form_id])?;
        self.fetch(request.json(patch), &path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"message":"Version is not a draft"}"#, "/x"),
            "Version is not a draft"
        );
        assert_eq!(error_message("", "/forms/f1"), "/forms/f1");
        assert_eq!(error_message("boom", "/x"), "boom");
    }

    #[test]
    fn test_new_rejects_empty_token() {
        let config = ClientConfig::new("https://forms.example.com", " ");
        assert!(matches!(
            HttpFormService::new(&config),
            Err(ClientError::Config(_))
        ));
    }
}
