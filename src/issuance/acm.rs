use std::sync::Arc;

use aws_sdk_acm::Client;
use aws_sdk_acm::error::DisplayErrorContext;
use aws_sdk_acm::primitives::DateTime as SmithyDateTime;
use aws_sdk_acm::types::{
    CertificateDetail, CertificateOptions, CertificateStatus as AcmStatus,
    CertificateTransparencyLoggingPreference, DomainStatus, ValidationMethod,
};
use chrono::{DateTime, Utc};
use log::debug;
use tokio::runtime::Runtime;

use crate::domain::{normalize_domain, normalize_sans};
use crate::error::ServiceError;

use super::authority::{CertificateAuthority, CertificateRequest};
use super::certificate::{
    CertificateRecord, CertificateStatus, CertificateSummary, ChallengeStatus,
    DnsValidationChallenge,
};

const SERVICE: &str = "ACM";

/// AWS Certificate Manager client bound to one region.
pub struct AcmCertificateAuthority {
    client: Client,
    runtime: Arc<Runtime>,
}

impl AcmCertificateAuthority {
    pub fn new(client: Client, runtime: Arc<Runtime>) -> Self {
        Self { client, runtime }
    }
}

impl CertificateAuthority for AcmCertificateAuthority {
    fn list_certificates(
        &self,
        statuses: &[CertificateStatus],
    ) -> Result<Vec<CertificateSummary>, ServiceError> {
        let filter: Vec<AcmStatus> = statuses
            .iter()
            .map(|status| AcmStatus::from(status.as_str()))
            .collect();

        self.runtime.block_on(async {
            let mut paginator = self
                .client
                .list_certificates()
                .set_certificate_statuses(Some(filter))
                .into_paginator()
                .send();

            let mut summaries = Vec::new();
            while let Some(page) = paginator.next().await {
                let page = page.map_err(|err| {
                    ServiceError::call(
                        SERVICE,
                        "ListCertificates",
                        DisplayErrorContext(&err).to_string(),
                    )
                })?;
                for summary in page.certificate_summary_list() {
                    let (Some(arn), Some(domain)) =
                        (summary.certificate_arn(), summary.domain_name())
                    else {
                        continue;
                    };
                    summaries.push(CertificateSummary {
                        arn: arn.to_string(),
                        domain: normalize_domain(domain),
                        status: summary
                            .status()
                            .map(|status| CertificateStatus::from(status.as_str())),
                    });
                }
            }
            debug!("[acm] listed {} certificate(s)", summaries.len());
            Ok(summaries)
        })
    }

    fn describe_certificate(&self, arn: &str) -> Result<CertificateRecord, ServiceError> {
        let output = self
            .runtime
            .block_on(
                self.client
                    .describe_certificate()
                    .certificate_arn(arn)
                    .send(),
            )
            .map_err(|err| {
                let message = DisplayErrorContext(&err).to_string();
                let missing = err
                    .as_service_error()
                    .is_some_and(|service_err| service_err.is_resource_not_found_exception());
                if missing {
                    ServiceError::not_found(SERVICE, "DescribeCertificate", message)
                } else {
                    ServiceError::call(SERVICE, "DescribeCertificate", message)
                }
            })?;

        let detail = output.certificate().ok_or_else(|| {
            ServiceError::call(
                SERVICE,
                "DescribeCertificate",
                format!("response for {arn} carried no certificate"),
            )
        })?;
        Ok(record_from_detail(arn, detail))
    }

    fn request_certificate(&self, request: &CertificateRequest) -> Result<String, ServiceError> {
        let mut call = self
            .client
            .request_certificate()
            .domain_name(&request.domain)
            .validation_method(ValidationMethod::Dns)
            .idempotency_token(&request.idempotency_token);
        if !request.sans.is_empty() {
            call = call.set_subject_alternative_names(Some(request.sans.iter().cloned().collect()));
        }
        if let Some(preference) = request.transparency {
            call = call.options(
                CertificateOptions::builder()
                    .certificate_transparency_logging_preference(
                        CertificateTransparencyLoggingPreference::from(preference.as_str()),
                    )
                    .build(),
            );
        }

        let output = self.runtime.block_on(call.send()).map_err(|err| {
            ServiceError::call(
                SERVICE,
                "RequestCertificate",
                DisplayErrorContext(&err).to_string(),
            )
        })?;
        output
            .certificate_arn()
            .map(str::to_string)
            .ok_or_else(|| {
                ServiceError::call(SERVICE, "RequestCertificate", "response carried no ARN")
            })
    }
}

fn record_from_detail(requested_arn: &str, detail: &CertificateDetail) -> CertificateRecord {
    let domain = normalize_domain(detail.domain_name().unwrap_or_default());
    let sans = normalize_sans(&domain, detail.subject_alternative_names());

    let validation_challenges = detail
        .domain_validation_options()
        .iter()
        .filter_map(|option| {
            let record = option.resource_record()?;
            let status = match option.validation_status()? {
                DomainStatus::PendingValidation => ChallengeStatus::PendingValidation,
                DomainStatus::Success => ChallengeStatus::Success,
                _ => ChallengeStatus::Failed,
            };
            Some(DnsValidationChallenge {
                record_name: record.name().to_string(),
                record_type: record.r#type().as_str().to_string(),
                record_value: record.value().to_string(),
                status,
            })
        })
        .collect();

    CertificateRecord {
        arn: detail
            .certificate_arn()
            .unwrap_or(requested_arn)
            .to_string(),
        domain,
        sans,
        status: detail
            .status()
            .map(|status| CertificateStatus::from(status.as_str()))
            .unwrap_or(CertificateStatus::PendingValidation),
        validation_challenges,
        created_at: detail.created_at().and_then(to_chrono),
        issued_at: detail.issued_at().and_then(to_chrono),
    }
}

fn to_chrono(value: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}
