//! Management API client shared by every resource
//!
//! The client holds nothing but its transport. Broker coordinates travel with each call, so
//! no connection or session outlives a single operation.

use reqwest::{Method, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::response_handler::{handle_response, handle_response_with_body};
use super::transport::{ApiRequest, HttpTransport, Transport};
use crate::constants::{API_ROOT, MANAGEMENT_SCHEME};
use crate::error::{Error, Result};
use crate::management::{Bindings, Definitions, NamedEntities, Policies, Vhosts};
use crate::types::{Broker, DestinationType};

/// Element shape of every list endpoint we project names from
#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: String,
}

/// Entry point to the management API resources
#[derive(Debug, Clone, Default)]
pub struct ManagementClient<T = HttpTransport> {
    transport: T,
}

impl<T: Transport> ManagementClient<T> {
    /// Client over `transport`
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Underlying transport
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Vhost resource
    #[must_use]
    pub const fn vhosts(&self) -> Vhosts<'_, T> {
        Vhosts::new(self)
    }

    /// Exchange resource
    #[must_use]
    pub const fn exchanges(&self) -> NamedEntities<'_, T> {
        NamedEntities::new(self, DestinationType::Exchange)
    }

    /// Queue resource
    #[must_use]
    pub const fn queues(&self) -> NamedEntities<'_, T> {
        NamedEntities::new(self, DestinationType::Queue)
    }

    /// Binding resource
    #[must_use]
    pub const fn bindings(&self) -> Bindings<'_, T> {
        Bindings::new(self)
    }

    /// Policy resource
    #[must_use]
    pub const fn policies(&self) -> Policies<'_, T> {
        Policies::new(self)
    }

    /// Definitions resource
    #[must_use]
    pub const fn definitions(&self) -> Definitions<'_, T> {
        Definitions::new(self)
    }

    /// GET and decode the JSON body
    pub(crate) async fn get_json<R: DeserializeOwned>(
        &self,
        broker: &Broker,
        segments: &[&str],
    ) -> Result<R> {
        let url = api_url(broker, segments)?;
        let response = self
            .transport
            .send(ApiRequest::new(Method::GET, url.clone(), broker))
            .await?;
        handle_response(&response, &url)?;
        response.json(&url)
    }

    /// GET a JSON array and project each element's `name`, keeping server order
    pub(crate) async fn list_names(&self, broker: &Broker, segments: &[&str]) -> Result<Vec<String>> {
        let entries: Vec<NamedEntry> = self.get_json(broker, segments).await?;
        Ok(entries.into_iter().map(|entry| entry.name).collect())
    }

    /// Send a request without a body; a 400 has nothing to attach
    pub(crate) async fn send_empty(
        &self,
        method: Method,
        broker: &Broker,
        segments: &[&str],
    ) -> Result<()> {
        let url = api_url(broker, segments)?;
        let response = self
            .transport
            .send(ApiRequest::new(method, url.clone(), broker))
            .await?;
        handle_response(&response, &url)
    }

    /// Send `body` as JSON; a 400 carries it back for diagnostics
    pub(crate) async fn send_json(
        &self,
        method: Method,
        broker: &Broker,
        segments: &[&str],
        body: &Value,
    ) -> Result<()> {
        let url = api_url(broker, segments)?;
        let request = ApiRequest::new(method, url.clone(), broker).json(body.clone());
        let response = self.transport.send(request).await?;
        handle_response_with_body(&response, &url, body)
    }
}

impl ManagementClient<HttpTransport> {
    /// Client over the default HTTPS transport
    #[must_use]
    pub fn https() -> Self {
        Self::new(HttpTransport::new())
    }
}

/// Build `https://{host}/api/{segments..}`, percent-encoding each segment
///
/// `.` and `..` are rejected: URL normalisation would drop them, in encoded form too, and the
/// request would reach a different resource.
pub fn api_url(broker: &Broker, segments: &[&str]) -> Result<String> {
    if let Some(dot) = segments.iter().find(|segment| matches!(**segment, "." | "..")) {
        return Err(Error::UnaddressableName {
            name: (*dot).to_string(),
        });
    }
    let invalid = || Error::InvalidHost {
        host: broker.host.clone(),
    };
    let mut url = Url::parse(&format!("{MANAGEMENT_SCHEME}://{}/{API_ROOT}/", broker.host))
        .map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|()| invalid())?
        .pop_if_empty()
        .extend(segments);
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_plain_segments() {
        let broker = Broker::new("fake-broker", "guest", "guest");
        assert_eq!(
            api_url(&broker, &["vhosts", "test2"]).unwrap(),
            "https://fake-broker/api/vhosts/test2"
        );
        assert_eq!(api_url(&broker, &["vhosts"]).unwrap(), "https://fake-broker/api/vhosts");
    }

    #[test]
    fn test_api_url_encodes_default_vhost() {
        let broker = Broker::new("fake-broker:15672", "guest", "guest");
        assert_eq!(
            api_url(&broker, &["queues", "/", "orders"]).unwrap(),
            "https://fake-broker:15672/api/queues/%2F/orders"
        );
    }

    #[test]
    fn test_api_url_rejects_dot_segments() {
        let broker = Broker::new("fake-broker", "guest", "guest");
        for segments in [
            &["queues", "EA", "."][..],
            &["vhosts", ".."][..],
            &["bindings", "EA", "e", "..", "q", "orders"][..],
        ] {
            let err = api_url(&broker, segments).unwrap_err();
            assert!(
                matches!(err, Error::UnaddressableName { ref name } if name == "." || name == ".."),
                "{segments:?} gave {err:?}"
            );
        }
        assert_eq!(
            api_url(&broker, &["queues", "EA", "..orders."]).unwrap(),
            "https://fake-broker/api/queues/EA/..orders."
        );
    }

    #[tokio::test]
    async fn test_dot_names_send_no_request() {
        use crate::management::support::testing::{RecordingTransport, fake_broker};

        let client = ManagementClient::new(RecordingTransport::new());
        let err = client.queues().delete(&fake_broker(), "EA", ".").await.unwrap_err();
        assert!(matches!(err, Error::UnaddressableName { ref name } if name == "."));
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn test_api_url_rejects_bad_host() {
        let broker = Broker::new("bad host", "guest", "guest");
        let err = api_url(&broker, &["vhosts"]).unwrap_err();
        assert!(matches!(err, Error::InvalidHost { ref host } if host == "bad host"));
    }
}
