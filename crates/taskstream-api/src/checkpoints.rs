use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use taskstream_core::SessionId;

use crate::client::{segment, ApiClient};
use crate::error::ApiError;
use crate::types::{Checkpoint, Page};

const CHECKPOINT_PAGE_SIZE: u32 = 50;

impl ApiClient {
    #[instrument(skip(self), fields(session = %session))]
    pub async fn list_checkpoints(&self, session: &SessionId) -> Result<Vec<Checkpoint>, ApiError> {
        let path = format!("/session/checkpoint/{}/checkpoints", segment(session.as_str()));
        let req = self
            .request(Method::GET, &path)
            .query(&[("page", 1), ("items_per_page", CHECKPOINT_PAGE_SIZE)]);
        let page: Page<Checkpoint> = self.send_json(req).await?;
        Ok(page.data)
    }

    #[instrument(skip(self), fields(session = %session))]
    pub async fn create_checkpoint(&self, session: &SessionId, label: &str) -> Result<(), ApiError> {
        let path = format!("/session/{}/checkpoint", segment(session.as_str()));
        let req = self
            .request(Method::POST, &path)
            .query(&[("label", label)])
            .json(&json!({}));
        self.send_unit(req).await
    }

    /// Roll the session's workspace to `checkpoint`.
    #[instrument(skip(self), fields(session = %session))]
    pub async fn activate_checkpoint(
        &self,
        session: &SessionId,
        checkpoint: &str,
    ) -> Result<(), ApiError> {
        let path = format!(
            "/session/checkpoint/{}/checkpoint/activate/{}",
            segment(session.as_str()),
            segment(checkpoint)
        );
        self.send_unit(self.request(Method::POST, &path)).await
    }

    /// Leave the active checkpoint, optionally keeping changes made on it.
    #[instrument(skip(self), fields(session = %session))]
    pub async fn deactivate_checkpoint(
        &self,
        session: &SessionId,
        store_changes: bool,
    ) -> Result<(), ApiError> {
        let path = format!(
            "/session/checkpoint/{}/checkpoint/deactivate",
            segment(session.as_str())
        );
        let req = self
            .request(Method::POST, &path)
            .query(&[("store_changes", store_changes)])
            .json(&json!({}));
        self.send_unit(req).await
    }

    #[instrument(skip(self))]
    pub async fn delete_checkpoint(&self, checkpoint: &str) -> Result<(), ApiError> {
        let path = format!("/session/checkpoint/checkpoint/{}", segment(checkpoint));
        self.send_unit(self.request(Method::DELETE, &path)).await
    }
}
