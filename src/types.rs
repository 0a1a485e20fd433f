//! Broker coordinates and destination kinds

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{API_EXCHANGES, API_QUEUES, BINDING_CODE_EXCHANGE, BINDING_CODE_QUEUE};

/// Connection info for one broker's management API
///
/// Resolved once per environment and passed explicitly to every resource call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broker {
    /// Host, with port when not the default
    pub host:     String,
    /// Management API user
    pub user:     String,
    /// Management API password, `passwd` on disk
    #[serde(rename = "passwd")]
    pub password: String,
}

impl Broker {
    /// Broker from its three coordinates
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host:     host.into(),
            user:     user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broker")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Kind of entity a binding routes to; also selects the exchange or queue collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DestinationType {
    /// Exchange-to-exchange binding
    Exchange,
    /// Exchange-to-queue binding
    Queue,
}

impl DestinationType {
    /// Collection segment under `/api`
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Exchange => API_EXCHANGES,
            Self::Queue => API_QUEUES,
        }
    }

    /// Single-letter code used in binding paths
    #[must_use]
    pub const fn path_code(self) -> &'static str {
        match self {
            Self::Exchange => BINDING_CODE_EXCHANGE,
            Self::Queue => BINDING_CODE_QUEUE,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_broker_reads_passwd_field() {
        let broker: Broker = serde_json::from_value(json!({
            "host": "yellow-hobbit.rmq.cloudamqp.com",
            "user": "admin_dev",
            "passwd": "pass_dev"
        }))
        .unwrap();
        assert_eq!(
            broker,
            Broker::new("yellow-hobbit.rmq.cloudamqp.com", "admin_dev", "pass_dev")
        );
    }

    #[test]
    fn test_broker_debug_hides_password() {
        let broker = Broker::new("fake-broker", "guest", "s3cret");
        let debug = format!("{broker:?}");
        assert!(debug.contains("fake-broker"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_destination_type_codes() {
        assert_eq!(DestinationType::Exchange.path_code(), "e");
        assert_eq!(DestinationType::Queue.path_code(), "q");
        assert_eq!(DestinationType::Exchange.collection(), "exchanges");
        assert_eq!(DestinationType::Queue.collection(), "queues");
        assert_eq!(
            serde_json::from_value::<DestinationType>(json!("queue")).unwrap(),
            DestinationType::Queue
        );
    }
}
