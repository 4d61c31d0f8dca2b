use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, info};

use crate::error::RequestorResult;

use super::authority::CertificateAuthority;
use super::certificate::{CertificateRecord, CertificateStatus};

/// Finds a certificate that already covers exactly the desired names.
pub struct CertificateLocator {
    authority: Arc<dyn CertificateAuthority>,
}

impl CertificateLocator {
    pub fn new(authority: Arc<dyn CertificateAuthority>) -> Self {
        Self { authority }
    }

    /// Looks up the previously assigned certificate first, then scans the inventory.
    pub fn find(
        &self,
        assigned_arn: Option<&str>,
        domain: &str,
        sans: &BTreeSet<String>,
    ) -> RequestorResult<Option<CertificateRecord>> {
        if let Some(arn) = assigned_arn.filter(|arn| arn.starts_with("arn:")) {
            match self.authority.describe_certificate(arn) {
                Ok(certificate) if certificate.matches(domain, sans) => {
                    info!("[locator] Found existing certificate {arn} from PhysicalResourceId");
                    return Ok(Some(certificate));
                }
                Ok(_) => {
                    info!(
                        "[locator] Existing certificate {arn} does not match desired names; searching inventory"
                    );
                }
                Err(err) if err.is_not_found() => {
                    info!("[locator] Certificate {arn} no longer exists; searching inventory");
                }
                Err(err) => return Err(err.into()),
            }
        }

        let found = self.scan_inventory(domain, sans)?;
        if let Some(certificate) = &found {
            info!(
                "[locator] Reusing previously issued certificate {}",
                certificate.arn
            );
        }
        Ok(found)
    }

    fn scan_inventory(
        &self,
        domain: &str,
        sans: &BTreeSet<String>,
    ) -> RequestorResult<Option<CertificateRecord>> {
        let summaries = self
            .authority
            .list_certificates(&CertificateStatus::REUSABLE)?;
        for summary in summaries.iter().filter(|summary| summary.domain == domain) {
            let certificate = self.authority.describe_certificate(&summary.arn)?;
            if certificate.matches(domain, sans) {
                return Ok(Some(certificate));
            }
            debug!(
                "[locator] {} covers {:?}, wanted {:?}",
                summary.arn, certificate.sans, sans
            );
        }
        Ok(None)
    }
}
