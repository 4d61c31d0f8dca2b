use thiserror::Error;

/// Failures reported by the PKI or DNS service adapters.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The addressed resource does not exist. Direct ARN lookups downgrade this to "not found".
    #[error("{service} {operation}: resource not found: {message}")]
    NotFound {
        service: &'static str,
        operation: &'static str,
        message: String,
    },
    #[error("{service} {operation} failed: {message}")]
    Call {
        service: &'static str,
        operation: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub fn call(service: &'static str, operation: &'static str, message: impl Into<String>) -> Self {
        Self::Call {
            service,
            operation,
            message: message.into(),
        }
    }

    pub fn not_found(
        service: &'static str,
        operation: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            service,
            operation,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Every way a reconciliation can fail. Each variant maps to a FAILED callback.
#[derive(Error, Debug)]
pub enum RequestorError {
    #[error("Missing required property {0}")]
    MissingField(&'static str),
    #[error("Invalid value for property {name}: {value}")]
    InvalidProperty { name: &'static str, value: String },
    #[error("Unsupported RequestType {0}")]
    UnsupportedRequestType(String),
    #[error(
        "Timed out waiting for DomainValidationOptions for certificate {arn} after {attempts} attempts"
    )]
    ValidationRecordsTimeout { arn: String, attempts: u32 },
    #[error("Certificate {arn} still pending validation after {timeout_secs}s")]
    IssuanceTimeout { arn: String, timeout_secs: u64 },
    #[error("Certificate {arn} failed with status {status}")]
    IssuanceFailed { arn: String, status: String },
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Certificate requestor panicked: {0}")]
    Panicked(String),
}

pub type RequestorResult<T> = Result<T, RequestorError>;
