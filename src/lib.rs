//! kubeling: a minimal HTTP service for Kubernetes orchestration demos.
//!
//! Two components run in every instance: a readiness controller owning the
//! pod-local "willing to receive traffic" flag, and a fail-soft client for
//! the key-value store all instances share (visit counter, key-value
//! entries, cookie-backed sessions). A store outage degrades only the
//! store-dependent endpoints; probes keep answering.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod readiness;
pub mod routes;
pub mod state;
pub mod store;
