use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{error, info};

use crate::callback::CallbackReporter;
use crate::clients::ServiceClients;
use crate::config::{InvocationContext, RequestorConfig};
use crate::error::{RequestorError, RequestorResult};
use crate::event::{CallbackResponse, ResourceEvent, ResponseStatus};
use crate::issuance::flow::{ReconcileOutcome, Reconciler};
use crate::issuance::retry::{Clock, SystemClock};

/// Runs one custom resource request end to end and always reports back.
pub struct RequestHandler {
    clients: Arc<dyn ServiceClients>,
    reporter: CallbackReporter,
    config: RequestorConfig,
    context: InvocationContext,
    clock: Arc<dyn Clock>,
}

impl RequestHandler {
    pub fn new(
        clients: Arc<dyn ServiceClients>,
        reporter: CallbackReporter,
        config: RequestorConfig,
        context: InvocationContext,
    ) -> Self {
        Self {
            clients,
            reporter,
            config,
            context,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Reconciles, builds the response, and delivers it exactly once.
    pub fn handle(&self, event: &ResourceEvent) -> CallbackResponse {
        info!(
            "[handler] RequestId={} RequestType={} LogicalResourceId={}",
            event.request_id, event.request_type, event.logical_resource_id
        );

        let reconciler = Reconciler::new(self.clients.as_ref(), &self.config, self.clock.clone());
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| reconciler.reconcile(event)))
            .unwrap_or_else(|payload| Err(RequestorError::Panicked(panic_message(payload.as_ref()))));
        if let Err(err) = &outcome {
            let failed_during = reconciler.fail();
            error!("[handler] Certificate requestor failed during {failed_during}: {err}");
        }

        let response = build_response(event, &self.context, outcome);
        self.reporter
            .report(event.response_url.as_deref(), &response);
        response
    }
}

/// Maps a reconciliation outcome onto the callback body.
pub fn build_response(
    event: &ResourceEvent,
    context: &InvocationContext,
    outcome: RequestorResult<ReconcileOutcome>,
) -> CallbackResponse {
    let fallback_id = || {
        event
            .physical_resource_id
            .clone()
            .unwrap_or_else(|| context.log_stream_name.clone())
    };
    let default_reason = || format!("See CloudWatch Logs: {}", context.log_stream_name);

    let (status, reason, physical_resource_id, data) = match outcome {
        Ok(ReconcileOutcome {
            physical_resource_id,
            result,
        }) => (
            ResponseStatus::Success,
            default_reason(),
            physical_resource_id.unwrap_or_else(fallback_id),
            result.map(|result| result.into_data()).unwrap_or_default(),
        ),
        Err(err) => (
            ResponseStatus::Failed,
            err.to_string(),
            fallback_id(),
            BTreeMap::new(),
        ),
    };

    CallbackResponse {
        status,
        reason: Some(reason),
        physical_resource_id,
        stack_id: event.stack_id.clone(),
        request_id: event.request_id.clone(),
        logical_resource_id: event.logical_resource_id.clone(),
        no_echo: false,
        data,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
