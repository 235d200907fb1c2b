//! Shared HTTP client plumbing for the integration adapters.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
