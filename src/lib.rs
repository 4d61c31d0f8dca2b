//! Reconciles an ACM certificate and its Route 53 DNS validation records on behalf of a
//! CloudFormation custom resource, then reports the outcome to the stack's callback URL.

pub mod callback;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod event;
pub mod handler;
pub mod issuance;

#[cfg(test)]
mod testing;

pub use callback::{CallbackReporter, CallbackTransport, HttpCallbackTransport};
pub use clients::{AwsServiceClients, ServiceClients};
pub use config::{InvocationContext, RequestorConfig};
pub use error::{RequestorError, ServiceError};
pub use event::{CallbackResponse, ResourceEvent, ResponseStatus};
pub use handler::RequestHandler;
