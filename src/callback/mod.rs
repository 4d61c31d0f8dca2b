use anyhow::Result;

mod http;
mod reporter;

pub use http::HttpCallbackTransport;
pub use reporter::CallbackReporter;

/// Delivers a serialized callback body to the orchestrator's response URL.
pub trait CallbackTransport: Send + Sync {
    /// One attempt. Non-2xx responses are errors.
    fn put(&self, url: &str, body: Vec<u8>) -> Result<()>;
}
