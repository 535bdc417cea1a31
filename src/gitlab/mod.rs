pub mod error;
pub mod schema;
pub mod types;
pub mod url;

pub use error::{api_error, GitLabError};
pub use schema::{ApproveMergeRequestArgs, ValidationError};
pub use types::{ApprovalRequest, MergeRequest, MergeRequestIid, ProjectId};

use reqwest::{header, Client};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::GitLabConfig;

/// Client for the merge request approval endpoint of the GitLab REST API.
///
/// Holds no state between calls besides the HTTP connection pool; every
/// approval is a single independent `POST`.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    client: Client,
    api_root: String,
}

impl GitLabClient {
    /// Build a client from explicit configuration.
    ///
    /// The base address is normalized once here. When a token is configured it
    /// is sent as a bearer `Authorization` header on every request.
    pub fn new(config: &GitLabConfig) -> Result<Self, GitLabError> {
        let api_root = url::normalize_api_url(config.base_url.as_deref().unwrap_or_default());
        reqwest::Url::parse(&api_root)
            .map_err(|e| GitLabError::Client(format!("invalid GitLab URL {}: {}", api_root, e)))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = &config.token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| GitLabError::Client("invalid token format".to_string()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent("mr-approve")
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GitLabError::Client(e.to_string()))?;

        Ok(Self { client, api_root })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Approve a merge request and return the updated record.
    ///
    /// Sends exactly one `POST /projects/:id/merge_requests/:iid/approve`.
    /// Non-2xx responses become [`GitLabError::Api`], a missing response becomes
    /// [`GitLabError::Transport`], and a 2xx body that is not a valid merge
    /// request becomes [`GitLabError::InvalidResponse`]. Nothing is retried.
    pub async fn approve_merge_request(
        &self,
        project_id: &ProjectId,
        merge_request_iid: MergeRequestIid,
    ) -> Result<MergeRequest, GitLabError> {
        let request = ApprovalRequest {
            project_id: project_id.clone(),
            merge_request_iid,
        };
        self.send_approval(&request).await
    }

    /// Approve from loosely-typed arguments
    /// (`{"project_id": ..., "merge_request_iid": ...}`).
    ///
    /// Arguments are validated before anything is sent; on failure no request
    /// is made and [`GitLabError::InvalidInput`] lists every bad field.
    pub async fn approve_merge_request_with_args(
        &self,
        args: &serde_json::Value,
    ) -> Result<MergeRequest, GitLabError> {
        let args = ApproveMergeRequestArgs::from_value(args).map_err(|e| {
            debug!(fields = ?e.fields(), "rejected approval arguments");
            GitLabError::InvalidInput(e)
        })?;
        self.approve_merge_request(&args.project_id, args.merge_request_iid)
            .await
    }

    #[instrument(skip(self, request), fields(project = %request.project_id, iid = %request.merge_request_iid))]
    async fn send_approval(&self, request: &ApprovalRequest) -> Result<MergeRequest, GitLabError> {
        let url = url::endpoint(&self.api_root, &request.path());

        debug!(%url, "sending approval request");
        let response = self.client.post(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(status = status.as_u16(), error = %e, "failed to read error body");
                    String::new()
                }
            };
            let err = api_error(status, &body);
            warn!(status = status.as_u16(), error = %err, "approval rejected");
            return Err(err);
        }

        let body = response.text().await?;
        debug!(status = status.as_u16(), body_bytes = body.len(), "received approval response");

        let json: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            GitLabError::InvalidResponse(ValidationError::single(
                None,
                format!("body is not valid JSON: {}", e),
            ))
        })?;
        let merge_request = schema::parse_merge_request(json).map_err(GitLabError::InvalidResponse)?;

        debug!(id = merge_request.id, state = %merge_request.state, "merge request approved");
        Ok(merge_request)
    }
}
