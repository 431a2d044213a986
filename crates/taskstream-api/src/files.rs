use reqwest::Method;
use tracing::instrument;

use taskstream_core::SessionId;

use crate::client::{segment, ApiClient};
use crate::error::ApiError;
use crate::types::{FileListing, FileMeta, NewShareLink, ShareLinkUpdate, ShareToken, SharedFile};

impl ApiClient {
    /// Output files of a session, optionally only those modified after `since`.
    #[instrument(skip(self), fields(session = %session))]
    pub async fn list_outputs(
        &self,
        session: &SessionId,
        since: Option<i64>,
    ) -> Result<Vec<FileMeta>, ApiError> {
        let path = format!("/session/{}/outputs", segment(session.as_str()));
        let mut req = self.request(Method::GET, &path);
        if let Some(since) = since {
            req = req.query(&[("since", since)]);
        }
        let listing: FileListing = self.send_json(req).await?;
        Ok(listing.files)
    }

    /// Raw content of one output file.
    #[instrument(skip(self), fields(session = %session))]
    pub async fn download_output(&self, session: &SessionId, name: &str) -> Result<Vec<u8>, ApiError> {
        let path = format!(
            "/session/{}/outputs/{}",
            segment(session.as_str()),
            segment(name)
        );
        self.send_bytes(self.request(Method::GET, &path)).await
    }

    #[instrument(skip(self), fields(session = %session))]
    pub async fn list_share_links(
        &self,
        session: &SessionId,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<SharedFile>, ApiError> {
        let path = format!("/files/session/{}/shares", segment(session.as_str()));
        let req = self
            .request(Method::GET, &path)
            .query(&[("skip", skip), ("limit", limit)]);
        self.send_json(req).await
    }

    /// Create (or reuse) a download link for an output file; returns its token.
    #[instrument(skip(self, link), fields(session = %session))]
    pub async fn create_share_link(
        &self,
        session: &SessionId,
        file_name: &str,
        link: &NewShareLink,
    ) -> Result<String, ApiError> {
        let path = format!(
            "/files/session/{}/outputs/{}/share",
            segment(session.as_str()),
            segment(file_name)
        );
        let token: ShareToken = self
            .send_json(self.request(Method::POST, &path).json(link))
            .await?;
        Ok(token.share_token)
    }

    #[instrument(skip(self, update))]
    pub async fn update_share_link(&self, link_id: i64, update: &ShareLinkUpdate) -> Result<(), ApiError> {
        let path = format!("/files/share_links/{link_id}");
        self.send_unit(self.request(Method::PATCH, &path).json(update))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_share_link(&self, link_id: i64) -> Result<(), ApiError> {
        let path = format!("/files/share_links/{link_id}");
        self.send_unit(self.request(Method::DELETE, &path)).await
    }
}
