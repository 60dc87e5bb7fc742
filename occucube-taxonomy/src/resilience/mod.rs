/// Retry support for calls to the taxonomy service

pub mod retry;

pub use retry::{RetryPolicy, with_retry_async};
