use std::collections::BTreeSet;

use reqwest::Method;
use tracing::{debug, info};

use super::support::{ManagementClient, Transport};
use crate::constants::API_VHOSTS;
use crate::error::{Error, Result};
use crate::types::Broker;

/// Virtual host resource
///
/// Create and delete check existence locally first so callers get `VhostAlreadyExists` /
/// `VhostNotFound` instead of raw statuses. Check and mutation are two separate requests and
/// are not atomic: a concurrent caller can change the vhost in between.
pub struct Vhosts<'a, T> {
    client: &'a ManagementClient<T>,
}

impl<'a, T: Transport> Vhosts<'a, T> {
    pub(crate) const fn new(client: &'a ManagementClient<T>) -> Self {
        Self { client }
    }

    /// Names of every vhost on the broker
    pub async fn list(&self, broker: &Broker) -> Result<BTreeSet<String>> {
        let names = self.client.list_names(broker, &[API_VHOSTS]).await?;
        Ok(names.into_iter().collect())
    }

    /// Whether `vhost` is listed
    pub async fn is_present(&self, broker: &Broker, vhost: &str) -> Result<bool> {
        Ok(self.list(broker).await?.contains(vhost))
    }

    /// PUT `vhost`, refusing when it already exists
    pub async fn create(&self, broker: &Broker, vhost: &str) -> Result<()> {
        if self.is_present(broker, vhost).await? {
            debug!("vhost {vhost} already present, not creating");
            return Err(Error::VhostAlreadyExists {
                vhost: vhost.to_string(),
            });
        }

        self.client
            .send_empty(Method::PUT, broker, &[API_VHOSTS, vhost])
            .await?;
        info!("created vhost {vhost} on {}", broker.host);
        Ok(())
    }

    /// DELETE `vhost`, refusing when it does not exist
    pub async fn delete(&self, broker: &Broker, vhost: &str) -> Result<()> {
        if !self.is_present(broker, vhost).await? {
            debug!("vhost {vhost} missing, not deleting");
            return Err(Error::VhostNotFound {
                vhost: vhost.to_string(),
            });
        }

        self.client
            .send_empty(Method::DELETE, broker, &[API_VHOSTS, vhost])
            .await?;
        info!("deleted vhost {vhost} on {}", broker.host);
        Ok(())
    }
}
