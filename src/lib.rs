//! Provisioning client for the RabbitMQ HTTP management API
//!
//! Resources (vhosts, exchanges, queues, bindings, policies, definitions) are reached through a
//! [`ManagementClient`], one request per operation, against the broker named by an environment.
//! Request bodies can come from JSON templates; runs can be recorded in a local history store.

pub mod config;
pub mod constants;
pub mod environments;
pub mod error;
pub mod history;
pub mod logging;
pub mod management;
pub mod messaging;
pub mod report;
pub mod templates;
pub mod types;

pub use error::{Error, Result};
pub use management::{Binding, ManagementClient, Transport};
pub use types::{Broker, DestinationType};
