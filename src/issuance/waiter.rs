use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::error::{RequestorError, RequestorResult};

use super::authority::CertificateAuthority;
use super::certificate::{CertificateRecord, CertificateStatus};
use super::retry::{Clock, Poll, PollPolicy, poll_until};

/// Polls a certificate until it is issued, fails, or the deadline passes.
pub struct IssuanceWaiter {
    authority: Arc<dyn CertificateAuthority>,
    clock: Arc<dyn Clock>,
}

impl IssuanceWaiter {
    pub fn new(authority: Arc<dyn CertificateAuthority>, clock: Arc<dyn Clock>) -> Self {
        Self { authority, clock }
    }

    pub fn wait(
        &self,
        certificate_arn: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> RequestorResult<CertificateRecord> {
        let outcome = poll_until(
            self.clock.as_ref(),
            "certificate issuance",
            PollPolicy::deadline(timeout, poll_interval),
            |_| -> RequestorResult<Poll<CertificateRecord>> {
                let certificate = self.authority.describe_certificate(certificate_arn)?;
                info!(
                    "[issuance-wait] Certificate {} status: {}",
                    certificate_arn, certificate.status
                );
                if certificate.status == CertificateStatus::Issued {
                    return Ok(Poll::Ready(certificate));
                }
                if certificate.status.is_terminal_failure() {
                    return Err(RequestorError::IssuanceFailed {
                        arn: certificate_arn.to_string(),
                        status: certificate.status.to_string(),
                    });
                }
                Ok(Poll::Pending)
            },
        )?;

        outcome.map_err(|_| RequestorError::IssuanceTimeout {
            arn: certificate_arn.to_string(),
            timeout_secs: timeout.as_secs(),
        })
    }
}
