use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use log::info;

use crate::clients::ServiceClients;
use crate::config::RequestorConfig;
use crate::error::RequestorResult;
use crate::event::{
    DesiredCertificateSpec, ReconciliationResult, RequestType, ResourceEvent, parse_desired_state,
};

use super::dns::DnsValidator;
use super::issuer::CertificateIssuer;
use super::locator::CertificateLocator;
use super::retry::Clock;
use super::waiter::IssuanceWaiter;

/// Where an invocation currently is. Only used for logging and failure context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Locating,
    Matched,
    Issuing,
    Validating,
    Waiting,
    SkipWait,
    Done,
    DeleteNoop,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::Locating => "LOCATING",
            Self::Matched => "MATCHED",
            Self::Issuing => "ISSUING",
            Self::Validating => "VALIDATING",
            Self::Waiting => "WAITING",
            Self::SkipWait => "SKIP_WAIT",
            Self::Done => "DONE",
            Self::DeleteNoop => "DELETE_NOOP",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// What a successful reconciliation hands back to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// `None` keeps whatever identifier the stack already had.
    pub physical_resource_id: Option<String>,
    pub result: Option<ReconciliationResult>,
}

/// Sequences locate → issue → validate → wait for one request.
pub struct Reconciler<'a> {
    clients: &'a dyn ServiceClients,
    config: &'a RequestorConfig,
    clock: Arc<dyn Clock>,
    phase: Cell<Phase>,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        clients: &'a dyn ServiceClients,
        config: &'a RequestorConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            clients,
            config,
            clock,
            phase: Cell::new(Phase::Start),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    /// Moves to `FAILED` and returns the phase the failure happened in.
    pub fn fail(&self) -> Phase {
        let failed_during = self.phase.get();
        if failed_during != Phase::Failed {
            self.enter(Phase::Failed);
        }
        failed_during
    }

    fn enter(&self, phase: Phase) {
        info!("[reconcile] {} -> {}", self.phase.get(), phase);
        self.phase.set(phase);
    }

    pub fn reconcile(&self, event: &ResourceEvent) -> RequestorResult<ReconcileOutcome> {
        match RequestType::parse(&event.request_type)? {
            RequestType::Delete => {
                self.enter(Phase::DeleteNoop);
                info!("[reconcile] Delete request received; leaving certificate in place for reuse");
                Ok(ReconcileOutcome {
                    physical_resource_id: None,
                    result: None,
                })
            }
            RequestType::Create | RequestType::Update => {
                let spec = parse_desired_state(
                    event.resource_properties.as_ref(),
                    &self.config.default_region,
                )?;
                let result = self.ensure_certificate(event, &spec)?;
                Ok(ReconcileOutcome {
                    physical_resource_id: Some(result.certificate_arn.clone()),
                    result: Some(result),
                })
            }
        }
    }

    fn ensure_certificate(
        &self,
        event: &ResourceEvent,
        spec: &DesiredCertificateSpec,
    ) -> RequestorResult<ReconciliationResult> {
        let authority = self.clients.certificate_authority(&spec.region)?;
        let zone_writer = self.clients.dns_zone_writer()?;

        self.enter(Phase::Locating);
        let located = CertificateLocator::new(authority.clone()).find(
            event.physical_resource_id.as_deref(),
            &spec.domain,
            &spec.sans,
        )?;
        let certificate = match located {
            Some(certificate) => {
                self.enter(Phase::Matched);
                certificate
            }
            None => {
                self.enter(Phase::Issuing);
                let arn = CertificateIssuer::new(authority.clone()).request(spec, &event.request_id)?;
                authority.describe_certificate(&arn)?
            }
        };

        self.enter(Phase::Validating);
        DnsValidator::new(
            authority.clone(),
            zone_writer,
            self.clock.clone(),
            self.config.validation_poll_attempts,
            self.config.validation_poll_interval,
        )
        .ensure_validation_records(&certificate.arn, &spec.hosted_zone_id)?;

        if self.config.skip_wait {
            self.enter(Phase::SkipWait);
            info!("[reconcile] SKIP_WAIT enabled; returning without waiting for issuance");
            return Ok(ReconciliationResult {
                certificate_arn: certificate.arn,
                certificate_status: certificate.status.to_string(),
            });
        }

        self.enter(Phase::Waiting);
        let issued = IssuanceWaiter::new(authority, self.clock.clone()).wait(
            &certificate.arn,
            self.config.max_wait,
            self.config.issuance_poll_interval,
        )?;
        if let Some(issued_at) = issued.issued_at {
            info!("[reconcile] Certificate {} issued at {}", issued.arn, issued_at);
        }

        self.enter(Phase::Done);
        Ok(ReconciliationResult {
            certificate_arn: issued.arn,
            certificate_status: issued.status.to_string(),
        })
    }
}
