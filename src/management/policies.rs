use reqwest::Method;
use serde_json::Value;
use tracing::info;

use super::support::{ManagementClient, Transport};
use crate::constants::API_POLICIES;
use crate::error::Result;
use crate::templates::Templates;
use crate::types::Broker;

/// Policies of a vhost
pub struct Policies<'a, T> {
    client: &'a ManagementClient<T>,
}

impl<'a, T: Transport> Policies<'a, T> {
    pub(crate) const fn new(client: &'a ManagementClient<T>) -> Self {
        Self { client }
    }

    /// Policy names in `vhost`, in server order
    pub async fn list(&self, broker: &Broker, vhost: &str) -> Result<Vec<String>> {
        self.client.list_names(broker, &[API_POLICIES, vhost]).await
    }

    /// Whether policy `name` exists in `vhost`
    pub async fn is_present(&self, broker: &Broker, vhost: &str, name: &str) -> Result<bool> {
        Ok(self
            .list(broker, vhost)
            .await?
            .iter()
            .any(|existing| existing == name))
    }

    /// PUT `policy` (`pattern`, `definition`, `priority`, `apply-to`) under `name`
    pub async fn create(&self, broker: &Broker, vhost: &str, name: &str, policy: &Value) -> Result<()> {
        self.client
            .send_json(Method::PUT, broker, &[API_POLICIES, vhost, name], policy)
            .await?;
        info!("created policy {name} in vhost {vhost}");
        Ok(())
    }

    /// Load `template` and create the policy from it
    pub async fn create_from_template(
        &self,
        broker: &Broker,
        vhost: &str,
        name: &str,
        templates: &Templates,
        template: &str,
    ) -> Result<()> {
        let policy = templates.load(template)?;
        self.create(broker, vhost, name, &policy).await
    }

    /// DELETE policy `name`
    pub async fn delete(&self, broker: &Broker, vhost: &str, name: &str) -> Result<()> {
        self.client
            .send_empty(Method::DELETE, broker, &[API_POLICIES, vhost, name])
            .await?;
        info!("deleted policy {name} in vhost {vhost}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::Error;
    use crate::management::support::testing::{RecordingTransport, fake_broker};
    use crate::templates::tests::fixture_templates;

    const POLICY_URL: &str = "https://fake-broker/api/policies/test/policy";

    fn client(transport: RecordingTransport) -> ManagementClient<RecordingTransport> {
        ManagementClient::new(transport)
    }

    #[tokio::test]
    async fn test_list_and_is_present() {
        let client = client(
            RecordingTransport::new()
                .respond(200, json!([{"name": "one"}, {"name": "two"}]))
                .respond(200, json!([{"name": "one"}, {"name": "two"}])),
        );
        let broker = fake_broker();

        assert_eq!(client.policies().list(&broker, "EA").await.unwrap(), vec!["one", "two"]);
        assert!(client.policies().is_present(&broker, "EA", "two").await.unwrap());
        assert_eq!(client.transport().last_request().url, "https://fake-broker/api/policies/EA");
    }

    #[tokio::test]
    async fn test_list_unknown_vhost() {
        let client = client(RecordingTransport::new().respond(404, json!({})));
        let err = client.policies().list(&fake_broker(), "unknown-vhost").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { ref message, .. } if message == "resource not found"));
    }

    #[tokio::test]
    async fn test_create_puts_policy() {
        let client = client(RecordingTransport::new().respond(201, json!({})));
        let policy = json!({"pattern": ".*", "definition": {"ha-mode": "all"}});
        client
            .policies()
            .create(&fake_broker(), "test", "policy", &policy)
            .await
            .unwrap();

        let request = client.transport().last_request();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.url, POLICY_URL);
        assert_eq!(request.body, Some(policy));
    }

    #[tokio::test]
    async fn test_create_failures() {
        let client = client(
            RecordingTransport::new()
                .respond(500, json!({}))
                .respond(400, json!({}))
                .respond_with_reason(512, "bad"),
        );
        let broker = fake_broker();
        let policy = json!({"no-good": "policy"});
        let policies = client.policies();

        let err = policies.create(&broker, "test", "policy", &policy).await.unwrap_err();
        assert!(matches!(err, Error::ServerError { ref url, .. } if url == POLICY_URL));
        let err = policies.create(&broker, "test", "policy", &policy).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest { body: Some(ref b), .. } if *b == policy));
        let err = policies.create(&broker, "test", "policy", &policy).await.unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedStatus { status: 512, reason: Some(ref r) } if r == "bad"
        ));
    }

    #[tokio::test]
    async fn test_create_from_template() {
        let client = client(RecordingTransport::new().respond(201, json!({})));
        client
            .policies()
            .create_from_template(
                &fake_broker(),
                "test",
                "policy",
                &fixture_templates(),
                "policies/dead-letter-policy",
            )
            .await
            .unwrap();

        let request = client.transport().last_request();
        assert_eq!(request.url, POLICY_URL);
        assert_eq!(
            request.body,
            Some(json!({"apply-to": "all", "definition": {"dead-letter-exchange": "exchange"},
                        "pattern": ".*", "priority": 0}))
        );
    }

    #[tokio::test]
    async fn test_create_from_missing_template_sends_nothing() {
        let client = client(RecordingTransport::new());
        let err = client
            .policies()
            .create_from_template(
                &fake_broker(),
                "test",
                "policy",
                &fixture_templates(),
                "policies/non-existing-policy",
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::FileNotFound { .. }));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let client = client(
            RecordingTransport::new()
                .respond(204, json!({}))
                .respond(401, json!({}))
                .respond(404, json!({}))
                .respond(500, json!({})),
        );
        let broker = fake_broker();
        let policies = client.policies();

        policies.delete(&broker, "test", "policy").await.unwrap();
        let request = client.transport().last_request();
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.url, POLICY_URL);

        let err = policies.delete(&broker, "test", "policy").await.unwrap_err();
        assert!(matches!(err, Error::Unauthorised { .. }));
        let err = policies.delete(&broker, "test", "policy").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        let err = policies.delete(&broker, "test", "policy").await.unwrap_err();
        assert!(matches!(err, Error::ServerError { .. }));
    }
}
