use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::support::{ManagementClient, Transport};
use crate::constants::{
    API_BINDINGS, API_BINDINGS_SOURCE, API_EXCHANGES, BINDING_CODE_EXCHANGE, JSON_FIELD_ARGUMENTS,
    JSON_FIELD_ROUTING_KEY,
};
use crate::error::Result;
use crate::types::{Broker, DestinationType};

/// Routing rule from a source exchange to an exchange or queue
///
/// Equality ignores `properties_key`: the broker assigns it, so it is not part of what the
/// binding means.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binding {
    /// Source exchange
    pub source:           String,
    /// Destination exchange or queue
    pub destination:      String,
    /// Whether `destination` is an exchange or a queue
    pub destination_type: DestinationType,
    /// Routing key; empty when absent
    #[serde(default)]
    pub routing_key:      String,
    /// Binding arguments; null when absent
    #[serde(default)]
    pub arguments:        Value,
    /// Broker-assigned key addressing this binding for deletion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties_key:   Option<String>,
}

impl Binding {
    /// Binding with no arguments and no properties key
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        destination_type: DestinationType,
        routing_key: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            destination_type,
            routing_key: routing_key.into(),
            arguments: Value::Null,
            properties_key: None,
        }
    }

    /// Replace the arguments
    #[must_use]
    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = arguments;
        self
    }

    /// Set the key used by `Bindings::delete`
    #[must_use]
    pub fn with_properties_key(mut self, properties_key: impl Into<String>) -> Self {
        self.properties_key = Some(properties_key.into());
        self
    }

    /// `e/{source}/{e|q}/{destination}`
    #[must_use]
    pub fn path(&self) -> String {
        self.path_segments().join("/")
    }

    fn path_segments(&self) -> [&str; 4] {
        [
            BINDING_CODE_EXCHANGE,
            &self.source,
            self.destination_type.path_code(),
            &self.destination,
        ]
    }

    /// Request body for create: only what is not already in the path
    #[must_use]
    pub fn body(&self) -> Value {
        json!({
            JSON_FIELD_ROUTING_KEY: self.routing_key,
            JSON_FIELD_ARGUMENTS: self.arguments,
        })
    }

    /// The identity fields, without `properties_key`
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "source": self.source,
            "destination": self.destination,
            "destination_type": self.destination_type,
            "routing_key": self.routing_key,
            "arguments": self.arguments,
        })
    }

    /// Compare against an arbitrary JSON value
    ///
    /// Returns `None` when `other` does not describe a binding at all.
    #[must_use]
    pub fn matches(&self, other: &Value) -> Option<bool> {
        Self::deserialize(other).ok().map(|other| *self == other)
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.destination == other.destination
            && self.destination_type == other.destination_type
            && self.routing_key == other.routing_key
            && self.arguments == other.arguments
    }
}

/// Bindings of a vhost
pub struct Bindings<'a, T> {
    client: &'a ManagementClient<T>,
}

impl<'a, T: Transport> Bindings<'a, T> {
    pub(crate) const fn new(client: &'a ManagementClient<T>) -> Self {
        Self { client }
    }

    /// Every binding in `vhost`
    pub async fn list(&self, broker: &Broker, vhost: &str) -> Result<Vec<Binding>> {
        self.client.get_json(broker, &[API_BINDINGS, vhost]).await
    }

    /// Bindings whose source is the exchange `source`
    pub async fn list_from_source(
        &self,
        broker: &Broker,
        vhost: &str,
        source: &str,
    ) -> Result<Vec<Binding>> {
        let [bindings, direction] = API_BINDINGS_SOURCE;
        self.client
            .get_json(broker, &[API_EXCHANGES, vhost, source, bindings, direction])
            .await
    }

    /// POST the binding; source, destination and type travel in the path
    pub async fn create(&self, broker: &Broker, vhost: &str, binding: &Binding) -> Result<()> {
        let mut segments = vec![API_BINDINGS, vhost];
        segments.extend(binding.path_segments());
        self.client
            .send_json(Method::POST, broker, &segments, &binding.body())
            .await?;
        info!("created binding {} in vhost {vhost}", binding.path());
        Ok(())
    }

    /// Delete by path and `properties_key`; a binding without one addresses the empty key
    pub async fn delete(&self, broker: &Broker, vhost: &str, binding: &Binding) -> Result<()> {
        let mut segments = vec![API_BINDINGS, vhost];
        segments.extend(binding.path_segments());
        segments.push(binding.properties_key.as_deref().unwrap_or_default());
        self.client
            .send_empty(Method::DELETE, broker, &segments)
            .await?;
        info!("deleted binding {} in vhost {vhost}", binding.path());
        Ok(())
    }
}
