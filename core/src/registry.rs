// Node registry persistence
use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ConsoleConfig;
use crate::node::NodeRecord;
use crate::refresh::with_segment;
use crate::transport::build_client;
use crate::Result;

/// Remote store holding the authoritative node list
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Insert or overwrite the record with the same id
    async fn save(&self, record: &NodeRecord) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// `NodeStore` talking to the dashboard's save/delete endpoints. Response
/// bodies are not interpreted; only transport failures are errors.
pub struct HttpNodeStore {
    config: ConsoleConfig,
    http_client: reqwest::Client,
}

impl HttpNodeStore {
    pub fn new(config: ConsoleConfig) -> Self {
        let http_client = build_client(&config);
        Self {
            config,
            http_client,
        }
    }
}

#[async_trait]
impl NodeStore for HttpNodeStore {
    async fn save(&self, record: &NodeRecord) -> Result<()> {
        let url = self.config.absolute_url(&self.config.endpoints.save_node);
        info!(target: "registry", id = %record.id, name = %record.name, "Saving node");

        let response = self.http_client.post(&url).json(record).send().await?;
        debug!(target: "registry", status = %response.status(), "Save completed");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let path = with_segment(&self.config.endpoints.delete_node, id);
        let url = self.config.absolute_url(&path);
        info!(target: "registry", id = %id, "Deleting node");

        let response = self.http_client.post(&url).send().await?;
        debug!(target: "registry", status = %response.status(), "Delete completed");
        Ok(())
    }
}
