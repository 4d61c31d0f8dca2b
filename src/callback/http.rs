use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use super::CallbackTransport;

/// PUTs callback bodies to pre-signed S3 URLs. The client is built on first use.
pub struct HttpCallbackTransport {
    timeout: Duration,
    client: OnceLock<Client>,
}

impl HttpCallbackTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> Result<&Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .context("Failed to build callback HTTP client")?;
        Ok(self.client.get_or_init(|| client))
    }
}

impl CallbackTransport for HttpCallbackTransport {
    fn put(&self, url: &str, body: Vec<u8>) -> Result<()> {
        // Pre-signed URL: the content type must stay empty.
        let response = self
            .client()?
            .put(url)
            .header(CONTENT_TYPE, "")
            .body(body)
            .send()
            .context("Network error when responding to CloudFormation")?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().ok().filter(|body| !body.trim().is_empty());
        Err(status_error(status, body))
    }
}

pub fn status_error(status: StatusCode, body: Option<String>) -> anyhow::Error {
    if status == StatusCode::FORBIDDEN {
        return anyhow!("callback URL rejected the response ({status}); it may have expired");
    }
    if let Some(body) = body {
        return anyhow!("callback endpoint returned {status}: {body}");
    }
    anyhow!("callback endpoint returned {status}")
}
