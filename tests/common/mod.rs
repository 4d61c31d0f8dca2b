#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::anyhow;
use certificate_requestor::callback::CallbackTransport;
use certificate_requestor::clients::ServiceClients;
use certificate_requestor::error::ServiceError;
use certificate_requestor::issuance::authority::{CertificateAuthority, CertificateRequest};
use certificate_requestor::issuance::certificate::{
    CertificateRecord, CertificateStatus, CertificateSummary, ChallengeStatus,
    DnsValidationChallenge,
};
use certificate_requestor::issuance::dns_providers::{DnsZoneWriter, RecordUpsert};
use certificate_requestor::issuance::retry::Clock;
use certificate_requestor::{
    CallbackReporter, InvocationContext, RequestHandler, RequestorConfig, ResourceEvent,
};
use serde_json::{Value, json};

pub const REQUESTED_ARN: &str = "arn:aws:acm:us-east-1:123456789012:certificate/new";

/// Single-certificate ACM stand-in: every request returns the same ARN and the
/// certificate walks through `statuses`, one per describe, repeating the last.
pub struct ScriptedAuthority {
    statuses: Vec<CertificateStatus>,
    describes: AtomicU32,
    pub requests: Mutex<Vec<CertificateRequest>>,
    pub lists: AtomicU32,
}

impl ScriptedAuthority {
    pub fn new(statuses: Vec<CertificateStatus>) -> Self {
        Self {
            statuses,
            describes: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
            lists: AtomicU32::new(0),
        }
    }

    pub fn describe_count(&self) -> u32 {
        self.describes.load(Ordering::SeqCst)
    }
}

impl CertificateAuthority for ScriptedAuthority {
    fn list_certificates(
        &self,
        _statuses: &[CertificateStatus],
    ) -> Result<Vec<CertificateSummary>, ServiceError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    fn describe_certificate(&self, arn: &str) -> Result<CertificateRecord, ServiceError> {
        if arn != REQUESTED_ARN {
            return Err(ServiceError::not_found("ACM", "DescribeCertificate", arn));
        }
        let index = self.describes.fetch_add(1, Ordering::SeqCst) as usize;
        let status = self
            .statuses
            .get(index)
            .or(self.statuses.last())
            .cloned()
            .unwrap_or(CertificateStatus::PendingValidation);
        Ok(CertificateRecord {
            arn: REQUESTED_ARN.to_string(),
            domain: "example.com".to_string(),
            sans: Default::default(),
            status,
            validation_challenges: vec![DnsValidationChallenge {
                record_name: "_abc.example.com.".to_string(),
                record_type: "CNAME".to_string(),
                record_value: "_def.acm-validations.aws.".to_string(),
                status: ChallengeStatus::PendingValidation,
            }],
            created_at: None,
            issued_at: None,
        })
    }

    fn request_certificate(&self, request: &CertificateRequest) -> Result<String, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(REQUESTED_ARN.to_string())
    }
}

#[derive(Default)]
pub struct RecordingZone {
    pub batches: Mutex<Vec<Vec<RecordUpsert>>>,
    pub failure: Option<String>,
}

impl DnsZoneWriter for RecordingZone {
    fn upsert_records(
        &self,
        _zone_id: &str,
        _comment: &str,
        records: &[RecordUpsert],
    ) -> Result<(), ServiceError> {
        self.batches.lock().unwrap().push(records.to_vec());
        match &self.failure {
            Some(message) => Err(ServiceError::call(
                "Route53",
                "ChangeResourceRecordSets",
                message.clone(),
            )),
            None => Ok(()),
        }
    }
}

pub struct StubClients {
    pub authority: Arc<ScriptedAuthority>,
    pub zone: Arc<RecordingZone>,
    pub panic_on_use: bool,
}

impl StubClients {
    pub fn new(statuses: Vec<CertificateStatus>) -> Self {
        Self {
            authority: Arc::new(ScriptedAuthority::new(statuses)),
            zone: Arc::new(RecordingZone::default()),
            panic_on_use: false,
        }
    }
}

impl ServiceClients for StubClients {
    fn certificate_authority(
        &self,
        _region: &str,
    ) -> Result<Arc<dyn CertificateAuthority>, ServiceError> {
        if self.panic_on_use {
            panic!("credentials provider exploded");
        }
        Ok(self.authority.clone())
    }

    fn dns_zone_writer(&self) -> Result<Arc<dyn DnsZoneWriter>, ServiceError> {
        Ok(self.zone.clone())
    }
}

#[derive(Clone, Default)]
pub struct CapturingTransport {
    pub calls: Arc<Mutex<Vec<(String, Value)>>>,
    pub fail: bool,
}

impl CapturingTransport {
    pub fn bodies(&self) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| body.clone())
            .collect()
    }
}

impl CallbackTransport for CapturingTransport {
    fn put(&self, url: &str, body: Vec<u8>) -> anyhow::Result<()> {
        let body: Value = serde_json::from_slice(&body)?;
        self.calls.lock().unwrap().push((url.to_string(), body));
        if self.fail {
            return Err(anyhow!("503 Slow Down"));
        }
        Ok(())
    }
}

pub struct InstantClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl Default for InstantClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }
}

impl Clock for InstantClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        *self.offset.lock().unwrap() += duration;
    }
}

pub fn handler(
    clients: impl ServiceClients + 'static,
    transport: &CapturingTransport,
    config: RequestorConfig,
) -> RequestHandler {
    RequestHandler::new(
        Arc::new(clients),
        CallbackReporter::new(Box::new(transport.clone())),
        config,
        InvocationContext::new("2026/10/18/[$LATEST]0123"),
    )
    .with_clock(Arc::new(InstantClock::default()))
}

pub fn resource_event(request_type: &str, properties: Value) -> ResourceEvent {
    serde_json::from_value(json!({
        "RequestType": request_type,
        "RequestId": "6c1b8f2e-request",
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/site/1",
        "LogicalResourceId": "SiteCertificate",
        "ResponseURL": "https://cloudformation-custom-resource-response-useast1.s3.amazonaws.com/signed",
        "ResourceProperties": properties
    }))
    .unwrap()
}

pub fn site_properties() -> Value {
    json!({
        "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:requestor",
        "DomainName": "example.com",
        "HostedZoneId": "/hostedzone/Z0123456789",
        "CertificateTransparencyLoggingPreference": "ENABLED"
    })
}
