//! Leaders API.

use crate::client::LyceumClient;
use crate::error::Result;
use crate::types::{CreateLeaderRequest, Leader, UpdateLeaderRequest};

/// Leaders API client.
pub struct LeadersApi {
    client: LyceumClient,
}

impl LeadersApi {
    pub(crate) fn new(client: LyceumClient) -> Self {
        Self { client }
    }

    /// List the leadership directory, in display order.
    pub async fn list(&self) -> Result<Vec<Leader>> {
        let mut leaders: Vec<Leader> = self.client.get("api/leaders").await?;
        leaders.sort_by_key(|leader| leader.order);
        Ok(leaders)
    }

    /// Get a leader by ID.
    pub async fn get(&self, id: &str) -> Result<Leader> {
        self.client.get(&format!("api/leaders/{}", id)).await
    }

    /// Add a leader.
    pub async fn create(&self, request: CreateLeaderRequest) -> Result<Leader> {
        self.client.post("api/leaders", &request).await
    }

    /// Update a leader.
    pub async fn update(&self, id: &str, request: UpdateLeaderRequest) -> Result<Leader> {
        self.client
            .put(&format!("api/leaders/{}", id), &request)
            .await
    }

    /// Remove a leader.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("api/leaders/{}", id)).await
    }
}
