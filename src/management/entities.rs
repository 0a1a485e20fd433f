use reqwest::Method;
use serde_json::Value;
use tracing::info;

use super::support::{ManagementClient, Transport};
use crate::error::Result;
use crate::types::{Broker, DestinationType};

/// Exchanges or queues of a vhost
///
/// Both collections share one shape and differ only in their path segment. There is no
/// existence precondition: the broker's status codes decide the outcome of create/delete.
pub struct NamedEntities<'a, T> {
    client: &'a ManagementClient<T>,
    kind:   DestinationType,
}

impl<'a, T: Transport> NamedEntities<'a, T> {
    pub(crate) const fn new(client: &'a ManagementClient<T>, kind: DestinationType) -> Self {
        Self { client, kind }
    }

    /// Which collection this view addresses
    #[must_use]
    pub const fn kind(&self) -> DestinationType {
        self.kind
    }

    /// Entity names in server order
    pub async fn list(&self, broker: &Broker, vhost: &str) -> Result<Vec<String>> {
        self.client
            .list_names(broker, &[self.kind.collection(), vhost])
            .await
    }

    /// Whether `name` is listed in `vhost`
    pub async fn is_present(&self, broker: &Broker, vhost: &str, name: &str) -> Result<bool> {
        Ok(self
            .list(broker, vhost)
            .await?
            .iter()
            .any(|existing| existing == name))
    }

    /// PUT `body` as the entity's attributes
    pub async fn create(&self, broker: &Broker, vhost: &str, name: &str, body: &Value) -> Result<()> {
        self.client
            .send_json(Method::PUT, broker, &[self.kind.collection(), vhost, name], body)
            .await?;
        info!("created {:?} {name} in vhost {vhost}", self.kind);
        Ok(())
    }

    /// DELETE `name`; the broker decides whether it existed
    pub async fn delete(&self, broker: &Broker, vhost: &str, name: &str) -> Result<()> {
        self.client
            .send_empty(Method::DELETE, broker, &[self.kind.collection(), vhost, name])
            .await?;
        info!("deleted {:?} {name} in vhost {vhost}", self.kind);
        Ok(())
    }
}
