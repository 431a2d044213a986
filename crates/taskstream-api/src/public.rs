use reqwest::Method;
use serde_json::json;
use tracing::{debug, instrument};

use taskstream_core::types::VISITOR_HEADER;
use taskstream_core::{SessionId, VisitorId};

use crate::client::{segment, ApiClient};
use crate::error::ApiError;
use crate::types::{FileListing, FileMeta, ShareToken, SharedSessionInfo, VisitorBootstrap};

impl ApiClient {
    /// Publish a session under a public link valid for `ttl_days`; returns
    /// the share token.
    #[instrument(skip(self), fields(session = %session))]
    pub async fn create_public_share(
        &self,
        session: &SessionId,
        ttl_days: u32,
        label: Option<&str>,
    ) -> Result<String, ApiError> {
        let path = format!("/public/share/session/{}", segment(session.as_str()));
        let mut req = self
            .request(Method::POST, &path)
            .query(&[("ttl_days", ttl_days)]);
        if let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) {
            req = req.query(&[("label", label)]);
        }
        let token: ShareToken = self.send_json(req).await?;
        Ok(token.share_token)
    }

    #[instrument(skip(self))]
    pub async fn public_session(&self, share_token: &str) -> Result<SharedSessionInfo, ApiError> {
        let path = format!("/public/{}", segment(share_token));
        self.send_json(self.request(Method::GET, &path)).await
    }

    /// Register `visitor` on first contact with a shared session.
    #[instrument(skip(self), fields(visitor = %visitor))]
    pub async fn bootstrap_visitor(
        &self,
        share_token: &str,
        visitor: &VisitorId,
    ) -> Result<VisitorBootstrap, ApiError> {
        let path = format!("/public/{}/bootstrap", segment(share_token));
        let req = self
            .request(Method::POST, &path)
            .header(VISITOR_HEADER, visitor.as_str())
            .json(&json!({}));
        let boot: VisitorBootstrap = self.send_json(req).await?;
        debug!(first_visit = boot.first_visit, "visitor bootstrapped");
        Ok(boot)
    }

    /// Output files of a shared session as seen by `visitor`.
    #[instrument(skip(self), fields(visitor = %visitor))]
    pub async fn list_public_files(
        &self,
        share_token: &str,
        visitor: &VisitorId,
    ) -> Result<Vec<FileMeta>, ApiError> {
        let path = format!(
            "/public/{}/files/{}",
            segment(share_token),
            segment(visitor.as_str())
        );
        let listing: FileListing = self.send_json(self.request(Method::GET, &path)).await?;
        Ok(listing.files)
    }
}
