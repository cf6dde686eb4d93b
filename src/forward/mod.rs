//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! inbound query + body (already parsed by http/)
//!     → client.rs (append query pairs to the fixed target URL,
//!                  build GET / multipart / raw-body request)
//!     → one upstream call (reqwest, bounded by the request timeout)
//!     → UpstreamReply (verbatim body + content type) on 2xx JSON
//!     → ForwardError on anything else
//! ```
//!
//! # Design Decisions
//! - Exactly one upstream call per inbound request; no retries, no caching
//! - Every failure mode (transport, non-2xx status, non-JSON body) collapses
//!   into the single `ForwardError` kind the caller maps to HTTP 500

pub mod client;
pub mod error;

pub use client::{query_param, Forwarder, UploadedFile, UpstreamReply};
pub use error::ForwardError;
