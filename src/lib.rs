//! Single-target HTTP forwarding proxy library.
//!
//! Accepts inbound GET/POST requests on `/api`, copies their query
//! parameters (and body or uploaded files) onto one fixed upstream
//! endpoint, and relays the upstream reply or a JSON error envelope.

pub mod config;
pub mod forward;
pub mod http;
pub mod lifecycle;

pub use config::ForwarderConfig;
pub use forward::Forwarder;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
