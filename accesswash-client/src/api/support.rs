//! Service request endpoints (`/support/requests/...`)
//!
//! List bodies may be paginated or bare arrays; single resources may be bare
//! or wrapped in the standard envelope. Both shapes are accepted everywhere.

use super::{ApiClient, MaybeEnveloped};
use crate::error::{ClientError, ClientResult};
use accesswash_shared::models::response::Listing;
use accesswash_shared::models::service_request::{
    CreateServiceRequestBody, NewServiceRequest, Rating, ServiceRequest, ServiceRequestComment,
};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::{json, Value as JsonValue};
use validator::Validate;

/// Photo attached to a service request
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl PhotoUpload {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

fn request_path(id: &str) -> String {
    format!("/support/requests/{}/", id)
}

impl ApiClient {
    pub async fn service_requests(&self) -> ClientResult<Vec<ServiceRequest>> {
        let listing: Listing<ServiceRequest> = self
            .get_json("/support/requests/", "Failed to load service requests")
            .await?;
        Ok(listing.into_vec())
    }

    pub async fn service_request(&self, id: &str) -> ClientResult<ServiceRequest> {
        const FALLBACK: &str = "Failed to load service request";

        let body: MaybeEnveloped<ServiceRequest> = self.get_json(&request_path(id), FALLBACK).await?;
        body.into_result(FALLBACK)
    }

    /// Opens a ticket; coordinates are sent as a GeoJSON point
    pub async fn create_service_request(&self, request: NewServiceRequest) -> ClientResult<ServiceRequest> {
        const FALLBACK: &str = "Failed to create service request";

        request.validate()?;
        let body = CreateServiceRequestBody::from(request);

        let response: MaybeEnveloped<ServiceRequest> = self
            .send_json(Method::POST, "/support/requests/", &body, FALLBACK)
            .await?;
        response.into_result(FALLBACK)
    }

    pub async fn comments(&self, request_id: &str) -> ClientResult<Vec<ServiceRequestComment>> {
        let path = format!("{}comments/", request_path(request_id));
        let listing: Listing<ServiceRequestComment> =
            self.get_json(&path, "Failed to load comments").await?;
        Ok(listing.into_vec())
    }

    pub async fn add_comment(&self, request_id: &str, comment: &str) -> ClientResult<ServiceRequestComment> {
        const FALLBACK: &str = "Failed to add comment";

        if comment.trim().is_empty() {
            return Err(ClientError::InvalidInput {
                message: "Comment cannot be empty".to_string(),
                fields: Default::default(),
            });
        }

        let path = format!("{}comments/", request_path(request_id));
        let response: MaybeEnveloped<ServiceRequestComment> = self
            .send_json(Method::POST, &path, &json!({ "comment": comment }), FALLBACK)
            .await?;
        response.into_result(FALLBACK)
    }

    /// Rates a resolved ticket (1-5 stars)
    ///
    /// The response body is not inspected; some deployments answer 204.
    pub async fn rate_service_request(&self, request_id: &str, rating: &Rating) -> ClientResult<()> {
        rating.validate()?;

        let path = format!("{}rating/", request_path(request_id));
        self.execute(
            self.request(Method::POST, &path).json(rating),
            "Failed to submit rating",
        )
        .await?;
        Ok(())
    }

    /// Uploads a photo as the multipart `photo` field
    pub async fn upload_photo(&self, request_id: &str, photo: PhotoUpload) -> ClientResult<JsonValue> {
        const FALLBACK: &str = "Failed to upload photo";

        let mut part = Part::bytes(photo.data.to_vec()).file_name(photo.file_name);
        if let Some(content_type) = &photo.content_type {
            part = part.mime_str(content_type).map_err(|_| ClientError::InvalidInput {
                message: format!("Unsupported content type: {}", content_type),
                fields: Default::default(),
            })?;
        }

        let path = format!("{}photos/", request_path(request_id));
        let builder = self
            .request(Method::POST, &path)
            .multipart(Form::new().part("photo", part));

        let response = self.execute(builder, FALLBACK).await?;
        Self::decode(response, FALLBACK).await
    }
}
