//! Announcements API.

use crate::client::LyceumClient;
use crate::error::Result;
use crate::types::{Announcement, CreateAnnouncementRequest, UpdateAnnouncementRequest};

/// Announcements API client.
pub struct AnnouncementsApi {
    client: LyceumClient,
}

impl AnnouncementsApi {
    pub(crate) fn new(client: LyceumClient) -> Self {
        Self { client }
    }

    /// List announcements, pinned first.
    pub async fn list(&self) -> Result<Vec<Announcement>> {
        let mut items: Vec<Announcement> = self.client.get("api/announcements").await?;
        // Stable, so the server's order is kept within each group.
        items.sort_by_key(|a| !a.pinned);
        Ok(items)
    }

    /// Get an announcement by ID.
    pub async fn get(&self, id: &str) -> Result<Announcement> {
        self.client.get(&format!("api/announcements/{}", id)).await
    }

    /// Publish an announcement.
    pub async fn create(&self, request: CreateAnnouncementRequest) -> Result<Announcement> {
        self.client.post("api/announcements", &request).await
    }

    /// Update an announcement.
    pub async fn update(
        &self,
        id: &str,
        request: UpdateAnnouncementRequest,
    ) -> Result<Announcement> {
        self.client
            .put(&format!("api/announcements/{}", id), &request)
            .await
    }

    /// Delete an announcement.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .delete(&format!("api/announcements/{}", id))
            .await
    }
}
