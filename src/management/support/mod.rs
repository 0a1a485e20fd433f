//! Local support modules for the management API resources

mod client;
mod response_handler;
#[cfg(test)]
pub(crate) mod testing;
mod transport;

pub use client::{ManagementClient, api_url};
pub use response_handler::{handle_response, handle_response_with_body};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
