mod client;
mod error;
mod retry;

pub use client::{Payload, UpstreamClient, UpstreamResponse};
pub use error::UpstreamError;
pub use retry::RetryPolicy;
