//! RabbitMQ HTTP management API resources
//!
//! Each resource is a thin borrowed view over [`ManagementClient`]. Every operation takes the
//! [`Broker`](crate::types::Broker) explicitly and issues one request, except vhost
//! create/delete which first check existence with a GET.

mod bindings;
mod definitions;
mod entities;
mod policies;
pub mod support;
mod vhosts;

pub use bindings::{Binding, Bindings};
pub use definitions::Definitions;
pub use entities::NamedEntities;
pub use policies::Policies;
pub use support::{ApiRequest, ApiResponse, HttpTransport, ManagementClient, Transport};
pub use vhosts::Vhosts;
