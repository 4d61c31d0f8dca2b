//! In-memory stand-ins for ACM, Route 53, the callback endpoint, and the clock.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::anyhow;
use serde_json::{Value, json};

use crate::callback::CallbackTransport;
use crate::clients::ServiceClients;
use crate::error::ServiceError;
use crate::event::{DesiredCertificateSpec, ResourceEvent};
use crate::issuance::authority::{CertificateAuthority, CertificateRequest};
use crate::issuance::certificate::{
    CertificateRecord, CertificateStatus, CertificateSummary, ChallengeStatus,
    DnsValidationChallenge,
};
use crate::issuance::dns_providers::{DnsZoneWriter, RecordUpsert};
use crate::issuance::retry::Clock;

pub fn names(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub fn challenge(record_name: &str, status: ChallengeStatus) -> DnsValidationChallenge {
    DnsValidationChallenge {
        record_name: record_name.to_string(),
        record_type: "CNAME".to_string(),
        record_value: format!("{}acm-validations.aws.", record_name.trim_start_matches('_')),
        status,
    }
}

pub fn desired_spec(domain: &str, sans: &[&str]) -> DesiredCertificateSpec {
    DesiredCertificateSpec {
        domain: domain.to_string(),
        sans: names(sans),
        hosted_zone_id: "Z123".to_string(),
        region: "us-east-1".to_string(),
        transparency: None,
    }
}

pub fn event(request_type: &str, properties: Value) -> ResourceEvent {
    let mut event: ResourceEvent = serde_json::from_value(json!({
        "RequestType": request_type,
        "RequestId": "req-1",
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/site/1",
        "LogicalResourceId": "SiteCertificate",
        "ResponseURL": "https://callback.example/response"
    }))
    .unwrap();
    event.resource_properties = properties.as_object().cloned();
    event
}

/// Clock whose `sleep` advances time instantly.
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        *self.offset.lock().unwrap() += duration;
    }
}

struct FakeCertificate {
    record: CertificateRecord,
    describes: u32,
    issue_after: Option<u32>,
    reveal_after: Option<(u32, Vec<DnsValidationChallenge>)>,
}

#[derive(Default)]
struct AuthorityState {
    certificates: BTreeMap<String, FakeCertificate>,
    tokens: HashMap<String, String>,
    requests: Vec<CertificateRequest>,
    describe_count: u32,
    list_count: u32,
    describe_failure: Option<String>,
    auto_issue_after: Option<u32>,
}

/// ACM stand-in. Honors idempotency tokens the way the real service does.
#[derive(Default)]
pub struct FakeAuthority {
    state: Mutex<AuthorityState>,
}

impl FakeAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, arn: &str, domain: &str, sans: &[&str], status: CertificateStatus) {
        let record = CertificateRecord {
            arn: arn.to_string(),
            domain: domain.to_string(),
            sans: names(sans),
            status,
            validation_challenges: Vec::new(),
            created_at: None,
            issued_at: None,
        };
        self.state.lock().unwrap().certificates.insert(
            arn.to_string(),
            FakeCertificate {
                record,
                describes: 0,
                issue_after: None,
                reveal_after: None,
            },
        );
    }

    fn with_certificate(&self, arn: &str, f: impl FnOnce(&mut FakeCertificate)) {
        let mut state = self.state.lock().unwrap();
        let certificate = state
            .certificates
            .get_mut(arn)
            .unwrap_or_else(|| panic!("unknown certificate {arn}"));
        f(certificate);
    }

    pub fn set_challenges(&self, arn: &str, challenges: Vec<DnsValidationChallenge>) {
        self.with_certificate(arn, |certificate| {
            certificate.record.validation_challenges = challenges;
        });
    }

    /// Challenges show up starting with the `describe`-th describe call.
    pub fn reveal_challenges_after(
        &self,
        arn: &str,
        describe: u32,
        challenges: Vec<DnsValidationChallenge>,
    ) {
        self.with_certificate(arn, |certificate| {
            certificate.reveal_after = Some((describe, challenges));
        });
    }

    /// Status flips to ISSUED starting with the `describe`-th describe call.
    pub fn issue_after(&self, arn: &str, describe: u32) {
        self.with_certificate(arn, |certificate| {
            certificate.issue_after = Some(describe);
        });
    }

    /// Applies `issue_after` to every certificate requested from now on.
    pub fn auto_issue_after(&self, describe: u32) {
        self.state.lock().unwrap().auto_issue_after = Some(describe);
    }

    pub fn fail_describe_with(&self, message: &str) {
        self.state.lock().unwrap().describe_failure = Some(message.to_string());
    }

    pub fn requests(&self) -> Vec<CertificateRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn describe_count(&self) -> u32 {
        self.state.lock().unwrap().describe_count
    }

    pub fn list_count(&self) -> u32 {
        self.state.lock().unwrap().list_count
    }
}

impl CertificateAuthority for FakeAuthority {
    fn list_certificates(
        &self,
        statuses: &[CertificateStatus],
    ) -> Result<Vec<CertificateSummary>, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.list_count += 1;
        Ok(state
            .certificates
            .values()
            .filter(|certificate| statuses.contains(&certificate.record.status))
            .map(|certificate| CertificateSummary {
                arn: certificate.record.arn.clone(),
                domain: certificate.record.domain.clone(),
                status: Some(certificate.record.status.clone()),
            })
            .collect())
    }

    fn describe_certificate(&self, arn: &str) -> Result<CertificateRecord, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.describe_count += 1;
        if let Some(message) = &state.describe_failure {
            return Err(ServiceError::call("ACM", "DescribeCertificate", message.clone()));
        }
        let Some(certificate) = state.certificates.get_mut(arn) else {
            return Err(ServiceError::not_found(
                "ACM",
                "DescribeCertificate",
                format!("Could not find certificate {arn}"),
            ));
        };

        certificate.describes += 1;
        if certificate
            .issue_after
            .is_some_and(|after| certificate.describes >= after)
        {
            certificate.record.status = CertificateStatus::Issued;
        }
        if let Some((after, challenges)) = &certificate.reveal_after
            && certificate.describes >= *after
        {
            certificate.record.validation_challenges = challenges.clone();
        }
        Ok(certificate.record.clone())
    }

    fn request_certificate(&self, request: &CertificateRequest) -> Result<String, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        if let Some(arn) = state.tokens.get(&request.idempotency_token) {
            return Ok(arn.clone());
        }

        let arn = format!(
            "arn:aws:acm:us-east-1:123456789012:certificate/requested-{}",
            state.tokens.len() + 1
        );
        let mut validation_challenges =
            vec![challenge(&format!("_{}.{}.", &request.idempotency_token[..8], request.domain), ChallengeStatus::PendingValidation)];
        for san in &request.sans {
            validation_challenges.push(challenge(
                &format!("_{}.{}.", &request.idempotency_token[..8], san),
                ChallengeStatus::PendingValidation,
            ));
        }
        let record = CertificateRecord {
            arn: arn.clone(),
            domain: request.domain.clone(),
            sans: request.sans.clone(),
            status: CertificateStatus::PendingValidation,
            validation_challenges,
            created_at: None,
            issued_at: None,
        };
        let issue_after = state.auto_issue_after;
        state.certificates.insert(
            arn.clone(),
            FakeCertificate {
                record,
                describes: 0,
                issue_after,
                reveal_after: None,
            },
        );
        state
            .tokens
            .insert(request.idempotency_token.clone(), arn.clone());
        Ok(arn)
    }
}

/// Route 53 stand-in recording every change batch.
#[derive(Default)]
pub struct FakeZoneWriter {
    batches: Mutex<Vec<(String, String, Vec<RecordUpsert>)>>,
}

impl FakeZoneWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<(String, String, Vec<RecordUpsert>)> {
        self.batches.lock().unwrap().clone()
    }
}

impl DnsZoneWriter for FakeZoneWriter {
    fn upsert_records(
        &self,
        zone_id: &str,
        comment: &str,
        records: &[RecordUpsert],
    ) -> Result<(), ServiceError> {
        self.batches.lock().unwrap().push((
            zone_id.to_string(),
            comment.to_string(),
            records.to_vec(),
        ));
        Ok(())
    }
}

pub struct FakeClients {
    pub authority: Arc<FakeAuthority>,
    pub zone_writer: Arc<FakeZoneWriter>,
    regions: Mutex<Vec<String>>,
}

impl FakeClients {
    pub fn new() -> Self {
        Self {
            authority: Arc::new(FakeAuthority::new()),
            zone_writer: Arc::new(FakeZoneWriter::new()),
            regions: Mutex::new(Vec::new()),
        }
    }

    pub fn regions(&self) -> Vec<String> {
        self.regions.lock().unwrap().clone()
    }
}

impl ServiceClients for FakeClients {
    fn certificate_authority(
        &self,
        region: &str,
    ) -> Result<Arc<dyn CertificateAuthority>, ServiceError> {
        self.regions.lock().unwrap().push(region.to_string());
        Ok(self.authority.clone())
    }

    fn dns_zone_writer(&self) -> Result<Arc<dyn DnsZoneWriter>, ServiceError> {
        Ok(self.zone_writer.clone())
    }
}

/// Callback endpoint stand-in that records each PUT.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    calls: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    fail: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<u8>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CallbackTransport for RecordingTransport {
    fn put(&self, url: &str, body: Vec<u8>) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push((url.to_string(), body));
        if self.fail {
            return Err(anyhow!("connection reset by peer"));
        }
        Ok(())
    }
}
