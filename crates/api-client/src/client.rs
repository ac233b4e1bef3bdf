//! Asset manager API client.
//!
//! Async HTTP client using `reqwest`. Every request carries both the bearer
//! token and the vendor `x-api-key` header.

use std::time::Duration;

use assetmgr_protocol::constants::{
    ABORT_UPLOAD_PATH, COMPLETE_UPLOAD_PATH, CREATE_UPLOAD_PATH, DEFAULT_API_BASE_URL,
    DEFAULT_UPLOAD_BASE_URL, HEADER_API_KEY, HEADER_PART_NUMBER, HEADER_STORAGE_KEY,
    HEADER_UPLOAD_ID, HEALTH_PATH, HEALTH_TIMEOUT, ORGANIZATIONS_PATH, PART_TIMEOUT_FACTOR,
    PROJECTS_PATH, REQUEST_TIMEOUT, UPLOAD_PART_PATH,
};
use assetmgr_protocol::{
    AbortUploadRequest, CompleteUploadRequest, CreateUploadRequest, CreateUploadResponse,
    Organization, OrganizationsResponse, PartResult, Project, ProjectsResponse,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Errors from the asset manager client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx response whose body reports a failure.
    #[error("{0}")]
    Application(String),

    #[error("invalid response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid API key")]
    InvalidKey,
}

impl Error {
    /// HTTP status code, when the server answered with a non-2xx status.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for failures reported by the API itself in a 2xx body.
    pub fn is_application(&self) -> bool {
        matches!(self, Error::Application(_))
    }
}

/// Endpoints and timeouts, fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub upload_base_url: String,
    /// Timeout for metadata and control calls.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            upload_base_url: DEFAULT_UPLOAD_BASE_URL.to_string(),
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Timeout for part transfers.
    pub fn part_timeout(&self) -> Duration {
        self.request_timeout * PART_TIMEOUT_FACTOR
    }
}

/// Asset manager API client.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Client {
    /// Creates a client for the production endpoints.
    pub fn new(api_key: &str) -> Result<Self, Error> {
        Self::with_config(api_key, ClientConfig::default())
    }

    /// Creates a client with explicit endpoints and timeouts.
    pub fn with_config(api_key: &str, config: ClientConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| Error::InvalidKey)?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let mut key = HeaderValue::from_str(api_key).map_err(|_| Error::InvalidKey)?;
        key.set_sensitive(true);
        headers.insert(HEADER_API_KEY, key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            config: ClientConfig {
                api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
                upload_base_url: config.upload_base_url.trim_end_matches('/').to_string(),
                request_timeout: config.request_timeout,
            },
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Multipart upload protocol
    // -----------------------------------------------------------------------

    /// Opens a multipart upload and returns the server-assigned identifiers.
    pub async fn create_upload(
        &self,
        req: &CreateUploadRequest,
    ) -> Result<CreateUploadResponse, Error> {
        let url = format!("{}{}", self.config.upload_base_url, CREATE_UPLOAD_PATH);
        debug!(file = %req.file_name, size = req.file_size, "create upload");
        let body = self
            .send(self.http.post(&url).json(req), self.config.request_timeout)
            .await?;
        classify(&body, false, "Failed to create upload")
    }

    /// Sends one raw chunk. Uses the longer part timeout.
    pub async fn upload_part(
        &self,
        upload_id: &str,
        key: &str,
        part_number: u32,
        data: Vec<u8>,
    ) -> Result<PartResult, Error> {
        let url = format!("{}{}", self.config.upload_base_url, UPLOAD_PART_PATH);
        debug!(upload_id, part_number, bytes = data.len(), "upload part");
        let request = self
            .http
            .post(&url)
            .header(HEADER_UPLOAD_ID, upload_id)
            .header(HEADER_PART_NUMBER, part_number.to_string())
            .header(HEADER_STORAGE_KEY, key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(data);
        let body = self.send(request, self.config.part_timeout()).await?;
        classify(&body, false, "Failed to upload part")
    }

    /// Finalizes the upload and returns the server's result document.
    pub async fn complete_upload(
        &self,
        req: &CompleteUploadRequest,
    ) -> Result<serde_json::Value, Error> {
        let url = format!("{}{}", self.config.upload_base_url, COMPLETE_UPLOAD_PATH);
        debug!(upload_id = %req.upload_id, parts = req.parts.len(), "complete upload");
        let body = self
            .send(self.http.post(&url).json(req), self.config.request_timeout)
            .await?;
        classify(&body, false, "Failed to complete upload")
    }

    /// Discards a multipart upload. An empty or non-JSON 2xx body counts as
    /// success.
    pub async fn abort_upload(&self, req: &AbortUploadRequest) -> Result<(), Error> {
        let url = format!("{}{}", self.config.upload_base_url, ABORT_UPLOAD_PATH);
        debug!(upload_id = %req.upload_id, "abort upload");
        let body = self
            .send(self.http.post(&url).json(req), self.config.request_timeout)
            .await?;
        match serde_json::from_slice::<serde_json::Value>(&body) {
            Ok(value) => check_success(&value, false, "Failed to abort upload"),
            Err(_) => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Metadata reads
    // -----------------------------------------------------------------------

    /// Lists the organizations visible to the API key.
    pub async fn get_organizations(&self) -> Result<Vec<Organization>, Error> {
        let url = format!("{}{}", self.config.api_base_url, ORGANIZATIONS_PATH);
        let body = self
            .send(self.http.get(&url), self.config.request_timeout)
            .await?;
        let resp: OrganizationsResponse = classify(&body, true, "Failed to load organizations")?;
        Ok(resp.organizations)
    }

    /// Lists projects, optionally restricted to one organization.
    pub async fn get_projects(&self, organization_id: Option<&str>) -> Result<Vec<Project>, Error> {
        let url = format!("{}{}", self.config.api_base_url, PROJECTS_PATH);
        let mut request = self.http.get(&url);
        if let Some(org) = organization_id.filter(|o| !o.is_empty()) {
            request = request.query(&[("organization_id", org)]);
        }
        let body = self.send(request, self.config.request_timeout).await?;
        let resp: ProjectsResponse = classify(&body, true, "Failed to load projects")?;
        Ok(resp.folders)
    }

    /// Probes the health endpoint.
    pub async fn test_connection(&self) -> Result<(), Error> {
        let url = format!("{}{}", self.config.api_base_url, HEALTH_PATH);
        self.send(self.http.get(&url), HEALTH_TIMEOUT).await?;
        Ok(())
    }

    /// Sends a request and returns the body of a 2xx response.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<Vec<u8>, Error> {
        let resp = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_send_error(e, timeout))?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(|e| map_send_error(e, timeout))?;
        Ok(bytes.to_vec())
    }
}

fn map_send_error(e: reqwest::Error, timeout: Duration) -> Error {
    if e.is_timeout() {
        Error::Timeout(timeout)
    } else {
        Error::Http(e)
    }
}

/// Parses a 2xx body, honouring the API's `success` flag.
///
/// With `require_flag`, a body without `"success": true` is a failure;
/// otherwise only an explicit `"success": false` is.
fn classify<T: DeserializeOwned>(body: &[u8], require_flag: bool, fallback: &str) -> Result<T, Error> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    check_success(&value, require_flag, fallback)?;
    Ok(serde_json::from_value(value)?)
}

fn check_success(value: &serde_json::Value, require_flag: bool, fallback: &str) -> Result<(), Error> {
    let ok = match value.get("success") {
        Some(serde_json::Value::Bool(flag)) => *flag,
        None => !require_flag,
        Some(_) => false,
    };
    if ok {
        return Ok(());
    }
    let message = ["error", "message"]
        .iter()
        .find_map(|field| value.get(*field).and_then(|v| v.as_str()))
        .unwrap_or(fallback);
    Err(Error::Application(message.to_string()))
}
