//! HTTP client used for calls to the identity provider.

mod client;

pub use client::{HttpClientBuilder, HttpClientConfig};
