mod parser;
mod types;

pub use parser::{DesiredCertificateSpec, parse_desired_state};
pub use types::{
    CallbackResponse, ReconciliationResult, RequestType, ResourceEvent, ResponseStatus,
};
