use std::sync::Arc;

use log::info;
use sha2::{Digest, Sha256};

use crate::error::RequestorResult;
use crate::event::DesiredCertificateSpec;

use super::authority::{CertificateAuthority, CertificateRequest};

/// ACM caps idempotency tokens at 32 word characters.
const TOKEN_LEN: usize = 32;

/// Derives the idempotency token from the triggering request id, not from the names.
pub fn idempotency_token(request_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request_id.as_bytes());
    let mut token = hex::encode(hasher.finalize());
    token.truncate(TOKEN_LEN);
    token
}

/// Requests new DNS-validated certificates.
pub struct CertificateIssuer {
    authority: Arc<dyn CertificateAuthority>,
}

impl CertificateIssuer {
    pub fn new(authority: Arc<dyn CertificateAuthority>) -> Self {
        Self { authority }
    }

    /// Issues one request and returns the new ARN. Does not wait for issuance.
    pub fn request(&self, spec: &DesiredCertificateSpec, request_id: &str) -> RequestorResult<String> {
        let request = CertificateRequest {
            domain: spec.domain.clone(),
            sans: spec.sans.clone(),
            transparency: spec.transparency,
            idempotency_token: idempotency_token(request_id),
        };
        let arn = self.authority.request_certificate(&request)?;
        info!("[issuer] Requested certificate {} for {}", arn, spec.domain);
        Ok(arn)
    }
}
