//! Outbound resilience: bounded concurrency, timeouts and retries.

pub mod backoff;
pub mod client;

pub use client::{ResilientClient, TransportFault, UpstreamUnavailable};
