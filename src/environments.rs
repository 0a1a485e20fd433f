//! Environment and account registries
//!
//! Both are static JSON documents keyed by name:
//!
//! ```json
//! { "dev": { "host": "broker.example.com", "user": "admin", "passwd": "secret" } }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::types::Broker;

fn read_registry<T: DeserializeOwned>(path: &Path) -> Result<HashMap<String, T>> {
    let content = fs::read_to_string(path).map_err(|e| Error::from_io("read", path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("{} is not a valid registry: {e}", path.display())))
}

/// Logical environment name to broker connection info
#[derive(Debug, Clone, Default)]
pub struct Environments {
    brokers: HashMap<String, Broker>,
}

impl Environments {
    /// Read the registry at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            brokers: read_registry(path.as_ref())?,
        })
    }

    /// Broker for environment `name`
    pub fn get_env(&self, name: &str) -> Result<Broker> {
        self.brokers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownEnvironment {
                name: name.to_string(),
            })
    }

    /// Host of environment `name`
    pub fn get_host(&self, name: &str) -> Result<String> {
        Ok(self.get_env(name)?.host)
    }

    /// Every registered environment name, in no particular order
    #[must_use]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.brokers.keys().map(String::as_str)
    }
}

/// Messaging credentials used for smoke tests
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    /// AMQP user
    pub user:     String,
    /// AMQP password, `passwd` on disk
    #[serde(rename = "passwd")]
    pub password: String,
    /// Vhost to connect to
    pub vhost:    String,
    /// Exchange to publish to or queue to consume from
    pub artefact: String,
}

/// Account name to messaging credentials
#[derive(Debug, Clone, Default)]
pub struct Accounts {
    accounts: HashMap<String, Account>,
}

impl Accounts {
    /// Read the registry at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            accounts: read_registry(path.as_ref())?,
        })
    }

    /// Credentials for account `name`
    pub fn get_account(&self, name: &str) -> Result<&Account> {
        self.accounts
            .get(name)
            .ok_or_else(|| Error::UnknownAccount {
                name: name.to_string(),
            })
    }
}
