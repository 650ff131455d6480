//! HTTP server startup and lifecycle.
//!
//! The server runs plain HTTP; in-cluster TLS termination belongs to the
//! platform (Ingress or service mesh), not this service. Shutdown honors the
//! platform contract: on SIGTERM the server stops accepting connections,
//! drains in-flight requests within a bounded window, and exits.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
