use reqwest::Method;
use serde_json::json;
use tracing::{debug, instrument};
use uuid::Uuid;

use taskstream_core::SessionId;

use crate::client::{segment, ApiClient};
use crate::error::ApiError;
use crate::types::{CopiedSession, CopyOptions, Page, SessionSummary, StartSession};

impl ApiClient {
    /// Register a new session. The id is chosen client-side.
    #[instrument(skip(self, data_context))]
    pub async fn start_session(
        &self,
        name: &str,
        data_context: &str,
    ) -> Result<SessionId, ApiError> {
        let session_id = Uuid::new_v4().to_string();
        let body = StartSession {
            session_id: session_id.clone(),
            name: name.to_string(),
            data_context: data_context.to_string(),
        };
        self.send_unit(self.request(Method::POST, "/session/start").json(&body))
            .await?;
        debug!(session = %session_id, "session started");
        Ok(SessionId(session_id))
    }

    /// One page (1-based) of the caller's sessions.
    #[instrument(skip(self))]
    pub async fn list_sessions(
        &self,
        page: u32,
        items_per_page: u32,
    ) -> Result<Page<SessionSummary>, ApiError> {
        let req = self
            .request(Method::GET, "/session/user/sessions")
            .query(&[("page", page), ("items_per_page", items_per_page)]);
        self.send_json(req).await
    }

    #[instrument(skip(self), fields(session = %session))]
    pub async fn delete_session(&self, session: &SessionId) -> Result<(), ApiError> {
        let path = format!("/session/{}", segment(session.as_str()));
        self.send_unit(self.request(Method::DELETE, &path)).await
    }

    #[instrument(skip(self), fields(session = %session))]
    pub async fn copy_session(
        &self,
        session: &SessionId,
        new_name: &str,
        options: CopyOptions,
    ) -> Result<SessionId, ApiError> {
        let path = format!("/session/{}/copy", segment(session.as_str()));
        let req = self
            .request(Method::POST, &path)
            .json(&json!({ "new_name": new_name, "copy_options": options }));
        let copied: CopiedSession = self.send_json(req).await?;
        Ok(SessionId(copied.new_session_id))
    }

    /// Share a session with another registered user by email.
    #[instrument(skip(self), fields(session = %session))]
    pub async fn share_session(&self, session: &SessionId, email: &str) -> Result<(), ApiError> {
        let path = format!("/session/{}/share", segment(session.as_str()));
        let req = self
            .request(Method::POST, &path)
            .json(&json!({ "email": email }));
        self.send_unit(req).await
    }
}
