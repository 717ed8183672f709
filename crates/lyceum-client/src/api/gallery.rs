//! Gallery API.
//!
//! Uploads are sent as `multipart/form-data` with a `file` part and
//! optional `title` and `caption` text parts.

use crate::client::LyceumClient;
use crate::error::Result;
use crate::request::FormPart;
use crate::types::{GalleryItem, GalleryUpload, MediaType, UpdateGalleryItemRequest};

/// Query parameters for listing gallery items.
#[derive(Debug, Default, serde::Serialize)]
pub struct ListGalleryQuery {
    /// Only items of this kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
}

/// Gallery API client.
pub struct GalleryApi {
    client: LyceumClient,
}

impl GalleryApi {
    pub(crate) fn new(client: LyceumClient) -> Self {
        Self { client }
    }

    /// List all gallery items.
    pub async fn list(&self) -> Result<Vec<GalleryItem>> {
        self.client.get("api/gallery").await
    }

    /// List only images or only videos.
    pub async fn list_by_type(&self, media_type: MediaType) -> Result<Vec<GalleryItem>> {
        let query = ListGalleryQuery {
            media_type: Some(media_type),
        };
        self.client.get_with_query("api/gallery", &query).await
    }

    /// Upload a photo or video.
    pub async fn upload(&self, upload: GalleryUpload) -> Result<GalleryItem> {
        let mut file = FormPart::file("file", upload.file_name.clone(), upload.bytes);
        if let Some(mime) = MediaType::mime_for(&upload.file_name) {
            file = file.with_mime(mime);
        }

        let mut parts = vec![file];
        if let Some(title) = upload.title {
            parts.push(FormPart::text("title", title));
        }
        if let Some(caption) = upload.caption {
            parts.push(FormPart::text("caption", caption));
        }

        self.client.post_multipart("api/gallery", parts).await
    }

    /// Update the title or caption of an item.
    pub async fn update(
        &self,
        id: &str,
        request: UpdateGalleryItemRequest,
    ) -> Result<GalleryItem> {
        self.client
            .patch(&format!("api/gallery/{}", id), &request)
            .await
    }

    /// Delete an item.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("api/gallery/{}", id)).await
    }
}
