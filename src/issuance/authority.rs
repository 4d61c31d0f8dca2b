use std::collections::BTreeSet;

use crate::error::ServiceError;

use super::certificate::{CertificateRecord, CertificateStatus, CertificateSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransparencyPreference {
    Enabled,
    Disabled,
}

impl TransparencyPreference {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "ENABLED" => Some(Self::Enabled),
            "DISABLED" => Some(Self::Disabled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "ENABLED",
            Self::Disabled => "DISABLED",
        }
    }
}

/// Parameters for a single DNS-validated certificate request.
#[derive(Debug, Clone)]
pub struct CertificateRequest {
    pub domain: String,
    pub sans: BTreeSet<String>,
    pub transparency: Option<TransparencyPreference>,
    pub idempotency_token: String,
}

/// Operations the reconciler needs from a certificate authority.
pub trait CertificateAuthority: Send + Sync {
    /// Lists every certificate in any of `statuses`, following pagination.
    fn list_certificates(
        &self,
        statuses: &[CertificateStatus],
    ) -> Result<Vec<CertificateSummary>, ServiceError>;

    /// Returns `ServiceError::NotFound` when the ARN no longer exists.
    fn describe_certificate(&self, arn: &str) -> Result<CertificateRecord, ServiceError>;

    /// Requests a certificate and returns its ARN without waiting for issuance.
    fn request_certificate(&self, request: &CertificateRequest) -> Result<String, ServiceError>;
}
