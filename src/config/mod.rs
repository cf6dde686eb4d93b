//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → ForwarderConfig (validated, immutable)
//!     → shared with the HTTP server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the target host is fixed at process start
//! - All fields have defaults so the proxy runs with no config file at all
//! - `TARGET_URL` and `PORT` env vars override file values
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ForwarderConfig;
pub use schema::ListenerConfig;
pub use schema::TargetConfig;
