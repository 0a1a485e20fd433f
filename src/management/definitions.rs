use reqwest::Method;
use serde_json::Value;
use tracing::info;

use super::support::{ManagementClient, Transport};
use crate::constants::API_DEFINITIONS;
use crate::error::Result;
use crate::types::Broker;

/// Whole-vhost configuration export and import
///
/// The document is opaque here; the broker validates it.
pub struct Definitions<'a, T> {
    client: &'a ManagementClient<T>,
}

impl<'a, T: Transport> Definitions<'a, T> {
    pub(crate) const fn new(client: &'a ManagementClient<T>) -> Self {
        Self { client }
    }

    /// Export the definitions of `vhost`
    pub async fn get(&self, broker: &Broker, vhost: &str) -> Result<Value> {
        self.client.get_json(broker, &[API_DEFINITIONS, vhost]).await
    }

    /// Import `definitions` into `vhost`
    pub async fn load(&self, broker: &Broker, vhost: &str, definitions: &Value) -> Result<()> {
        self.client
            .send_json(Method::POST, broker, &[API_DEFINITIONS, vhost], definitions)
            .await?;
        info!("loaded definitions into vhost {vhost}");
        Ok(())
    }
}
