//! Outbound HTTP client for service-to-service calls

mod service_client;

pub use service_client::ServiceClient;
