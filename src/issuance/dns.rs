use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::domain::normalize_zone_id;
use crate::error::{RequestorError, RequestorResult};

use super::authority::CertificateAuthority;
use super::certificate::DnsValidationChallenge;
use super::dns_providers::{DnsZoneWriter, RecordUpsert};
use super::retry::{Clock, Poll, PollPolicy, poll_until};

/// Validation records only need to live until the CA has checked them.
pub const VALIDATION_RECORD_TTL: i64 = 60;
pub const CHANGE_BATCH_COMMENT: &str = "Ensure ACM validation records";

/// Publishes the DNS validation records a certificate needs.
pub struct DnsValidator {
    authority: Arc<dyn CertificateAuthority>,
    zone_writer: Arc<dyn DnsZoneWriter>,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
    interval: Duration,
}

impl DnsValidator {
    pub fn new(
        authority: Arc<dyn CertificateAuthority>,
        zone_writer: Arc<dyn DnsZoneWriter>,
        clock: Arc<dyn Clock>,
        max_attempts: u32,
        interval: Duration,
    ) -> Self {
        Self {
            authority,
            zone_writer,
            clock,
            max_attempts,
            interval,
        }
    }

    /// Waits for the challenges to appear, then UPSERTs each unique record once.
    ///
    /// Runs for reused certificates too: their records may have been removed from the zone.
    pub fn ensure_validation_records(
        &self,
        certificate_arn: &str,
        hosted_zone_id: &str,
    ) -> RequestorResult<Vec<DnsValidationChallenge>> {
        let zone_id = normalize_zone_id(hosted_zone_id);

        let outcome = poll_until(
            self.clock.as_ref(),
            "validation records",
            PollPolicy::attempts(self.max_attempts, self.interval),
            |attempt| -> RequestorResult<Poll<Vec<DnsValidationChallenge>>> {
                let certificate = self.authority.describe_certificate(certificate_arn)?;
                let challenges = unique_challenges(&certificate.validation_challenges);
                if challenges.is_empty() {
                    info!(
                        "[dns-validation] DomainValidationOptions not ready (attempt {}/{}); sleeping {}s",
                        attempt,
                        self.max_attempts,
                        self.interval.as_secs()
                    );
                    return Ok(Poll::Pending);
                }
                Ok(Poll::Ready(challenges))
            },
        )?;

        let challenges = outcome.map_err(|exhausted| RequestorError::ValidationRecordsTimeout {
            arn: certificate_arn.to_string(),
            attempts: exhausted.attempts,
        })?;

        let upserts: Vec<RecordUpsert> = challenges
            .iter()
            .map(|challenge| RecordUpsert {
                name: challenge.record_name.clone(),
                record_type: challenge.record_type.clone(),
                value: challenge.record_value.clone(),
                ttl: VALIDATION_RECORD_TTL,
            })
            .collect();
        self.zone_writer
            .upsert_records(&zone_id, CHANGE_BATCH_COMMENT, &upserts)?;
        info!(
            "[dns-validation] Ensured {} validation record(s) for {} in zone {}",
            upserts.len(),
            certificate_arn,
            zone_id
        );
        Ok(challenges)
    }
}

/// Actionable challenges, one per record name, in first-seen order.
fn unique_challenges(challenges: &[DnsValidationChallenge]) -> Vec<DnsValidationChallenge> {
    let mut seen = HashSet::new();
    challenges
        .iter()
        .filter(|challenge| challenge.is_actionable())
        .filter(|challenge| seen.insert(challenge.record_name.clone()))
        .cloned()
        .collect()
}
