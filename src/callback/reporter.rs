use log::{error, info};

use crate::event::CallbackResponse;

use super::CallbackTransport;

/// Sends the final callback. Never fails the invocation and never retries.
pub struct CallbackReporter {
    transport: Box<dyn CallbackTransport>,
}

impl CallbackReporter {
    pub fn new(transport: Box<dyn CallbackTransport>) -> Self {
        Self { transport }
    }

    /// Returns whether the endpoint accepted the response; callers only log it.
    pub fn report(&self, response_url: Option<&str>, response: &CallbackResponse) -> bool {
        let Some(url) = response_url.filter(|url| !url.trim().is_empty()) else {
            error!("[callback] Missing ResponseURL in event; cannot report status");
            return false;
        };

        let body = match serde_json::to_vec(response) {
            Ok(body) => body,
            Err(err) => {
                error!("[callback] Failed to serialize CloudFormation response: {err}");
                return false;
            }
        };
        info!(
            "[callback] Sending CloudFormation response: {}",
            String::from_utf8_lossy(&body)
        );

        match self.transport.put(url, body) {
            Ok(()) => {
                info!("[callback] CloudFormation accepted {} response", response.status);
                true
            }
            Err(err) => {
                error!("[callback] Failed to PUT response to CloudFormation: {err:#}");
                false
            }
        }
    }
}
